//! Member Service
//!
//! Registration, credential checks, profile edits and member moderation.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

use crate::domain::{Member, MemberRepository, NewMember};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Member service trait
#[async_trait]
pub trait MemberService: Send + Sync {
    /// Register a member and return the generated id
    async fn create_member(&self, input: CreateMemberDto) -> Result<i64, MemberError>;

    /// Get member by ID
    async fn get_member_by_id(&self, id: i64) -> Result<Member, MemberError>;

    /// Get member by username
    async fn get_member_by_username(&self, username: &str) -> Result<Member, MemberError>;

    /// Check credentials. `None` covers both an unknown username and a wrong password.
    async fn auth_member(&self, username: &str, password: &str) -> Result<Option<Member>, MemberError>;

    /// Overwrite username, bio and password of a member
    async fn edit_member(&self, id: i64, edit: EditMemberDto) -> Result<Member, MemberError>;

    /// Replace the email of a member
    async fn update_email(&self, username: &str, email: &str) -> Result<(), MemberError>;

    /// Replace the password of a member
    async fn update_password(&self, username: &str, password: &str) -> Result<(), MemberError>;

    /// Mute a member until the given instant
    async fn mute_member(&self, member_id: i64, until: DateTime<Utc>) -> Result<(), MemberError>;

    /// Mute a member for the configured ban window
    async fn ban_user(&self, username: &str) -> Result<(), MemberError>;

    /// Mark a member for moderator review
    async fn flag_user(&self, username: &str) -> Result<(), MemberError>;

    /// All members marked for review
    async fn get_flagged_users(&self) -> Result<Vec<Member>, MemberError>;
}

/// Registration input
#[derive(Debug, Clone)]
pub struct CreateMemberDto {
    pub username: String,
    pub email: String,
    pub password: String,
    pub banner_url: Option<String>,
}

/// Profile overwrite
#[derive(Debug, Clone)]
pub struct EditMemberDto {
    pub username: String,
    pub bio: Option<String>,
    pub password: String,
}

/// Member service errors
#[derive(Debug, thiserror::Error)]
pub enum MemberError {
    #[error("Member not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AppError> for MemberError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::NotFound(_) => MemberError::NotFound,
            AppError::Conflict(msg) => MemberError::Conflict(msg),
            AppError::BadRequest(msg) | AppError::Validation(msg) => MemberError::InvalidInput(msg),
            e => MemberError::Internal(e.to_string()),
        }
    }
}

/// Hash a password using Argon2id
pub(crate) fn hash_password(password: &str) -> Result<String, MemberError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| MemberError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
pub(crate) fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

/// Hash verified when the username is unknown, so both failure paths pay for one Argon2 run.
static DUMMY_PASSWORD_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("forum-server unknown member placeholder").ok());

/// Verify `password` against the member's hash, or against the placeholder hash
/// when there is no member. Returns the member only on a match.
fn check_credentials(member: Option<Member>, password: &str) -> Option<Member> {
    match member {
        Some(member) => verify_password(password, &member.password_hash).then_some(member),
        None => {
            if let Some(hash) = DUMMY_PASSWORD_HASH.as_deref() {
                verify_password(password, hash);
            }
            None
        }
    }
}

/// MemberService implementation
pub struct MemberServiceImpl<M>
where
    M: MemberRepository,
{
    member_repo: Arc<M>,
    ban_days: i32,
}

impl<M> MemberServiceImpl<M>
where
    M: MemberRepository,
{
    pub fn new(member_repo: Arc<M>, ban_days: i32) -> Self {
        Self {
            member_repo,
            ban_days,
        }
    }
}

#[async_trait]
impl<M> MemberService for MemberServiceImpl<M>
where
    M: MemberRepository + 'static,
{
    #[tracing::instrument(skip(self, input), fields(username = %input.username))]
    async fn create_member(&self, input: CreateMemberDto) -> Result<i64, MemberError> {
        let password_hash = hash_password(&input.password)?;

        let member = self
            .member_repo
            .create(&NewMember {
                username: input.username,
                email: input.email,
                password_hash,
                banner_url: input.banner_url,
            })
            .await?;

        tracing::info!(member_id = member.id, "Member registered");
        Ok(member.id)
    }

    async fn get_member_by_id(&self, id: i64) -> Result<Member, MemberError> {
        self.member_repo
            .find_by_id(id)
            .await?
            .ok_or(MemberError::NotFound)
    }

    async fn get_member_by_username(&self, username: &str) -> Result<Member, MemberError> {
        self.member_repo
            .find_by_username(username)
            .await?
            .ok_or(MemberError::NotFound)
    }

    #[tracing::instrument(skip(self, password))]
    async fn auth_member(&self, username: &str, password: &str) -> Result<Option<Member>, MemberError> {
        let member = self.member_repo.find_by_username(username).await?;

        let matched = check_credentials(member, password);
        if matched.is_none() {
            tracing::debug!("Credentials rejected");
        }
        Ok(matched)
    }

    #[tracing::instrument(skip(self, edit))]
    async fn edit_member(&self, id: i64, edit: EditMemberDto) -> Result<Member, MemberError> {
        let password_hash = hash_password(&edit.password)?;

        let member = self
            .member_repo
            .update_profile(id, &edit.username, edit.bio.as_deref(), &password_hash)
            .await?;

        tracing::info!(member_id = id, "Member profile updated");
        Ok(member)
    }

    #[tracing::instrument(skip(self, email))]
    async fn update_email(&self, username: &str, email: &str) -> Result<(), MemberError> {
        self.member_repo.update_email(username, email).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, password))]
    async fn update_password(&self, username: &str, password: &str) -> Result<(), MemberError> {
        let password_hash = hash_password(password)?;
        self.member_repo.update_password(username, &password_hash).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn mute_member(&self, member_id: i64, until: DateTime<Utc>) -> Result<(), MemberError> {
        self.member_repo.mute(member_id, until).await?;
        metrics::record_moderation("mute");
        tracing::info!("Member muted");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn ban_user(&self, username: &str) -> Result<(), MemberError> {
        self.member_repo.mute_for_days(username, self.ban_days).await?;
        metrics::record_moderation("ban");
        tracing::info!(days = self.ban_days, "Member banned");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn flag_user(&self, username: &str) -> Result<(), MemberError> {
        self.member_repo.flag(username).await?;
        metrics::record_moderation("flag_member");
        Ok(())
    }

    async fn get_flagged_users(&self) -> Result<Vec<Member>, MemberError> {
        Ok(self.member_repo.find_flagged().await?)
    }
}
