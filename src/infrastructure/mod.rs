//! Infrastructure Layer
//!
//! Contains implementations for external services:
//! - Database connection pool (PostgreSQL)
//! - Repository implementations
//! - Prometheus metrics

pub mod database;
pub mod metrics;
pub mod repositories;
