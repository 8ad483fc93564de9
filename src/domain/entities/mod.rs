//! # Domain Entities
//!
//! Core records of the forum. All entities map directly to their
//! corresponding database tables.
//!
//! - **Member**: registered account with profile and moderation state
//! - **Post**: a top-level post or a comment (a post with a parent)
//!
//! Each entity has an associated repository trait defining data access
//! operations. These traits are implemented in the infrastructure layer.

mod member;
mod post;

pub use member::{Member, MemberRepository, MemberSummary, NewMember};
pub use post::{Creator, DeleteOutcome, Post, PostRepository, DELETED_MARKER};
