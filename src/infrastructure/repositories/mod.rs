//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! ## Available Repositories
//!
//! - **MemberRepository** - Member accounts and moderation state
//! - **PostRepository** - Posts, comments and likes
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{PgMemberRepository, PgPostRepository};
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let member_repo = PgMemberRepository::new(pool.clone());
//!     let post_repo = PgPostRepository::new(pool.clone());
//! }
//! ```

pub mod member_repository;
pub mod post_repository;

pub use member_repository::PgMemberRepository;
pub use post_repository::PgPostRepository;
