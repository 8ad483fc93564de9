//! # Forum Server Library
//!
//! This crate provides a discussion forum backend with:
//! - RESTful HTTP API endpoints
//! - Members, posts, threaded comments, likes and moderation
//! - PostgreSQL for persistent storage
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Core records, repository traits and comment-tree assembly
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: Database, repositories and metrics
//! - **Presentation Layer**: HTTP handlers and middleware
//!
//! ## Module Structure
//!
//! ```text
//! forum_server/
//! +-- config/        Configuration management
//! +-- domain/        Domain entities, repository traits, comment trees
//! +-- application/   Application services and DTOs
//! +-- infrastructure/ Database, repositories, metrics
//! +-- presentation/  HTTP routes, handlers and middleware
//! +-- shared/        Common utilities (errors, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
