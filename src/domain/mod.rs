//! # Domain Layer
//!
//! The domain layer contains the core records of the forum and the rules
//! that operate on them. It is independent of the web framework and of the
//! concrete database.
//!
//! ## Structure
//!
//! - **entities**: Member and Post records plus their repository traits
//! - **services**: comment-tree assembly
//!
//! Repository traits define data access contracts; the infrastructure
//! layer implements them against PostgreSQL.

pub mod entities;
pub mod services;

// Re-export commonly used types
pub use entities::*;
pub use services::*;
