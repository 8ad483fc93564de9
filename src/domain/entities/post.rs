//! Post entity and repository trait.
//!
//! Maps to the `post` and `user_likes` tables. Comments are posts with
//! `is_comment = true` and a `parent_id`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::member::{Member, MemberSummary};
use crate::shared::error::AppError;

/// Text written over the title and body of a logically deleted post.
pub const DELETED_MARKER: &str = "[deleted]";

/// The author attached to a post for display.
///
/// Resolved per call by the service layer, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Creator {
    /// Full member profile
    Member(Member),
    /// Redacted view (id, username, moderator flag)
    Summary(MemberSummary),
}

impl Creator {
    pub fn id(&self) -> i64 {
        match self {
            Creator::Member(m) => m.id,
            Creator::Summary(s) => s.id,
        }
    }

    pub fn username(&self) -> &str {
        match self {
            Creator::Member(m) => &m.username,
            Creator::Summary(s) => &s.username,
        }
    }
}

/// A top-level post or a comment.
///
/// Maps to the `post` table:
/// - post_id: BIGSERIAL PRIMARY KEY
/// - title: TEXT NULL (unset for comments)
/// - body: TEXT NOT NULL
/// - post_like: INTEGER NOT NULL DEFAULT 0
/// - creation_date: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - member_id: BIGINT NOT NULL REFERENCES member(member_id)
/// - parent_id: BIGINT NULL REFERENCES post(post_id)
/// - is_comment: BOOLEAN NOT NULL DEFAULT FALSE
/// - is_flagged: BOOLEAN NOT NULL DEFAULT FALSE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: i64,
    pub title: Option<String>,
    pub body: String,
    pub post_like: i32,
    pub creation_date: DateTime<Utc>,
    pub member_id: i64,
    pub parent_id: Option<i64>,
    pub is_comment: bool,
    pub is_flagged: bool,

    /// Author, attached by the service layer
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub creator: Option<Creator>,
}

impl Post {
    /// Whether the post has been logically deleted.
    pub fn is_deleted(&self) -> bool {
        self.body == DELETED_MARKER
    }

    /// Overwrite content with the deletion marker.
    ///
    /// Comments have no title, so only the body is replaced for them.
    pub fn mark_deleted(&mut self) {
        self.body = DELETED_MARKER.to_string();
        if !self.is_comment {
            self.title = Some(DELETED_MARKER.to_string());
        }
    }

    /// Attach a resolved author.
    pub fn with_creator(mut self, creator: Creator) -> Self {
        self.creator = Some(creator);
        self
    }

    /// A comment always points at a parent; a top-level post never does.
    pub fn has_consistent_parent(&self) -> bool {
        self.is_comment == self.parent_id.is_some()
    }
}

impl Default for Post {
    fn default() -> Self {
        Self {
            post_id: 0,
            title: None,
            body: String::new(),
            post_like: 0,
            creation_date: Utc::now(),
            member_id: 0,
            parent_id: None,
            is_comment: false,
            is_flagged: false,
            creator: None,
        }
    }
}

/// Result of an owner-scoped delete.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The post now carries the deletion marker.
    Deleted(Post),
    /// The caller does not own the post; nothing changed.
    NotOwner,
}

/// Repository trait for Post data access operations.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a top-level post.
    async fn create_post(&self, title: &str, body: &str, member_id: i64) -> Result<Post, AppError>;

    /// Insert a comment under `parent_id`.
    async fn create_comment(&self, body: &str, member_id: i64, parent_id: i64) -> Result<Post, AppError>;

    /// Find a post by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError>;

    /// All posts written by a member, most liked first.
    async fn find_by_member(&self, member_id: i64) -> Result<Vec<Post>, AppError>;

    /// Top-level, non-deleted posts, most liked first, capped at `limit`.
    async fn find_top_level(&self, limit: i64) -> Result<Vec<Post>, AppError>;

    /// Direct children of a post in insertion order.
    async fn find_children(&self, parent_id: i64) -> Result<Vec<Post>, AppError>;

    /// Overwrite title and body. The title is ignored for comments.
    async fn update_content(&self, id: i64, title: &str, body: &str) -> Result<Post, AppError>;

    /// Logical delete restricted to the owner. Returns the number of rows changed.
    async fn soft_delete_owned(&self, post_id: i64, member_id: i64, is_comment: bool) -> Result<u64, AppError>;

    /// Logical delete by a moderator. Also clears the flag on top-level posts.
    async fn soft_delete(&self, post_id: i64, is_comment: bool) -> Result<u64, AppError>;

    /// Record a like at most once per member.
    ///
    /// Returns `true` when a new like was recorded and the counter incremented.
    async fn like(&self, post_id: i64, member_id: i64) -> Result<bool, AppError>;

    /// Mark a post for moderator review.
    async fn flag(&self, id: i64) -> Result<(), AppError>;

    /// All posts marked for review.
    async fn find_flagged(&self) -> Result<Vec<Post>, AppError>;
}
