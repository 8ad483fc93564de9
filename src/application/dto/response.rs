//! Response DTOs
//!
//! Data structures for API response bodies.

use chrono::Utc;
use serde::Serialize;

use crate::application::services::AuthTokens;
use crate::domain::{DeleteOutcome, Member};

/// Authentication tokens response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<AuthTokens> for TokenResponse {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

/// Registration and login response (member plus token)
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub member: MemberResponse,
    #[serde(flatten)]
    pub token: TokenResponse,
}

/// Member response
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub bio: Option<String>,
    pub banner_url: Option<String>,
    pub is_mod: bool,
    /// Whether a mute is in effect right now
    pub is_muted: bool,
    pub muted_until: Option<String>,
    pub is_flagged: bool,
}

impl MemberResponse {
    pub fn from_member(member: Member, include_email: bool) -> Self {
        Self {
            is_muted: member.is_muted_at(Utc::now()),
            id: member.id,
            username: member.username,
            email: if include_email { Some(member.email) } else { None },
            bio: member.bio,
            banner_url: member.banner_url,
            is_mod: member.is_mod,
            muted_until: member.muted_until.map(|t| t.to_rfc3339()),
            is_flagged: member.is_flagged,
        }
    }
}

/// Created resource id
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// Like outcome
#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub post_id: i64,
    pub liked: bool,
}

/// Owner delete outcome
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub post_id: i64,
    pub deleted: bool,
}

impl DeleteResponse {
    /// `None` when the caller was not the owner.
    pub fn from_outcome(outcome: &DeleteOutcome) -> Option<Self> {
        match outcome {
            DeleteOutcome::Deleted(post) => Some(Self {
                post_id: post.post_id,
                deleted: true,
            }),
            DeleteOutcome::NotOwner => None,
        }
    }
}
