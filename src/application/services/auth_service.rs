//! Authentication Service
//!
//! Registration, login and JWT access token handling.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::member_service::{CreateMemberDto, MemberError, MemberService, MemberServiceImpl};
use crate::config::JwtSettings;
use crate::domain::{Member, MemberRepository};

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new member and issue a token
    async fn register(&self, input: CreateMemberDto) -> Result<(Member, AuthTokens), AuthError>;

    /// Authenticate with username and password
    async fn authenticate(&self, username: &str, password: &str) -> Result<(Member, AuthTokens), AuthError>;

    /// Validate access token and extract member ID
    fn validate_token(&self, access_token: &str) -> Result<i64, AuthError>;
}

/// Authentication tokens response
#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (member ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// JWT ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<MemberError> for AuthError {
    fn from(e: MemberError) -> Self {
        match e {
            MemberError::Conflict(msg) => AuthError::Conflict(msg),
            MemberError::NotFound => AuthError::InvalidCredentials,
            e => AuthError::Internal(e.to_string()),
        }
    }
}

/// Sign an access token for a member
pub fn issue_access_token(member_id: i64, settings: &JwtSettings) -> Result<AuthTokens, AuthError> {
    let now = Utc::now();
    let expiry = now + Duration::minutes(settings.access_token_expiry_minutes);

    let claims = Claims {
        sub: member_id.to_string(),
        exp: expiry.timestamp(),
        iat: now.timestamp(),
        jti: Some(uuid::Uuid::new_v4().to_string()),
    };

    let access_token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))?;

    Ok(AuthTokens {
        access_token,
        expires_in: settings.access_token_expiry_minutes * 60,
        token_type: "Bearer".to_string(),
    })
}

/// Decode and validate an access token, returning the member id it was issued to
pub fn decode_access_token(token: &str, secret: &str) -> Result<i64, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    token_data
        .claims
        .sub
        .parse::<i64>()
        .map_err(|_| AuthError::InvalidToken)
}

/// AuthService implementation
pub struct AuthServiceImpl<M>
where
    M: MemberRepository,
{
    members: MemberServiceImpl<M>,
    jwt_settings: JwtSettings,
}

impl<M> AuthServiceImpl<M>
where
    M: MemberRepository,
{
    /// Create a new AuthServiceImpl
    pub fn new(member_repo: Arc<M>, jwt_settings: JwtSettings, ban_days: i32) -> Self {
        Self {
            members: MemberServiceImpl::new(member_repo, ban_days),
            jwt_settings,
        }
    }
}

#[async_trait]
impl<M> AuthService for AuthServiceImpl<M>
where
    M: MemberRepository + 'static,
{
    async fn register(&self, input: CreateMemberDto) -> Result<(Member, AuthTokens), AuthError> {
        let member_id = self.members.create_member(input).await?;
        let member = self.members.get_member_by_id(member_id).await?;
        let tokens = issue_access_token(member.id, &self.jwt_settings)?;

        Ok((member, tokens))
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<(Member, AuthTokens), AuthError> {
        let member = self
            .members
            .auth_member(username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let tokens = issue_access_token(member.id, &self.jwt_settings)?;
        tracing::info!(member_id = member.id, "Member logged in");

        Ok((member, tokens))
    }

    fn validate_token(&self, access_token: &str) -> Result<i64, AuthError> {
        decode_access_token(access_token, &self.jwt_settings.secret)
    }
}
