//! Forum Member entity and repository trait.
//!
//! Maps to the `member` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Represents a registered forum member.
///
/// Maps to the `member` table:
/// - member_id: BIGSERIAL PRIMARY KEY
/// - username: VARCHAR(32) NOT NULL UNIQUE
/// - email: VARCHAR(255) NOT NULL UNIQUE
/// - password_hash: VARCHAR(255) NOT NULL
/// - bio: TEXT NULL
/// - banner_url: TEXT NULL
/// - is_mod: BOOLEAN NOT NULL DEFAULT FALSE
/// - is_muted: BOOLEAN NOT NULL DEFAULT FALSE
/// - muted_until: TIMESTAMPTZ NULL
/// - is_flagged: BOOLEAN NOT NULL DEFAULT FALSE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Primary key
    pub id: i64,

    /// Username (unique)
    pub username: String,

    /// Email address
    pub email: String,

    /// Argon2 password hash
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Free-form profile text
    pub bio: Option<String>,

    /// Profile banner image URL
    pub banner_url: Option<String>,

    /// Moderator role flag
    pub is_mod: bool,

    /// Whether a mute has been applied
    pub is_muted: bool,

    /// When the current mute expires
    pub muted_until: Option<DateTime<Utc>>,

    /// Marked for moderator review
    pub is_flagged: bool,
}

impl Member {
    /// Whether the member is muted at the given instant.
    ///
    /// A mute without an expiry never lapses.
    pub fn is_muted_at(&self, now: DateTime<Utc>) -> bool {
        self.is_muted && self.muted_until.map_or(true, |until| until > now)
    }

    /// Project the member down to the public summary shown next to posts.
    pub fn summary(&self) -> MemberSummary {
        MemberSummary {
            id: self.id,
            username: self.username.clone(),
            is_mod: self.is_mod,
        }
    }
}

impl Default for Member {
    fn default() -> Self {
        Self {
            id: 0,
            username: String::new(),
            email: String::new(),
            password_hash: String::new(),
            bio: None,
            banner_url: None,
            is_mod: false,
            is_muted: false,
            muted_until: None,
            is_flagged: false,
        }
    }
}

/// Redacted member view: only what a visitor of someone's profile needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub id: i64,
    pub username: String,
    pub is_mod: bool,
}

/// Fields accepted when registering a member.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub banner_url: Option<String>,
}

/// Repository trait for Member data access operations.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Insert a member and return the stored row.
    ///
    /// A duplicate username or email yields `AppError::Conflict`.
    async fn create(&self, member: &NewMember) -> Result<Member, AppError>;

    /// Find a member by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Member>, AppError>;

    /// Find a member by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<Member>, AppError>;

    /// Fetch several members in one query. Missing ids are skipped.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Member>, AppError>;

    /// Overwrite username, bio and password hash of a member.
    async fn update_profile(
        &self,
        id: i64,
        username: &str,
        bio: Option<&str>,
        password_hash: &str,
    ) -> Result<Member, AppError>;

    /// Replace the email of the member with this username.
    async fn update_email(&self, username: &str, email: &str) -> Result<(), AppError>;

    /// Replace the password hash of the member with this username.
    async fn update_password(&self, username: &str, password_hash: &str) -> Result<(), AppError>;

    /// Mute a member until the given instant.
    async fn mute(&self, id: i64, until: DateTime<Utc>) -> Result<(), AppError>;

    /// Mute a member for a number of days counted from the store's current date.
    async fn mute_for_days(&self, username: &str, days: i32) -> Result<(), AppError>;

    /// Mark a member for moderator review.
    async fn flag(&self, username: &str) -> Result<(), AppError>;

    /// All members marked for review.
    async fn find_flagged(&self) -> Result<Vec<Member>, AppError>;
}
