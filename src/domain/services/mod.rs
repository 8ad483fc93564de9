//! # Domain Services
//!
//! Business rules that don't belong to a single entity.
//!
//! - **CommentTree**: guarded assembly of a post's descendant comments

mod comment_tree;

pub use comment_tree::*;
