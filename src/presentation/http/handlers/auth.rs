//! Authentication Handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::application::dto::request::{LoginRequest, RegisterRequest};
use crate::application::dto::response::{AuthResponse, MemberResponse, TokenResponse};
use crate::application::services::{AuthError, AuthService, AuthServiceImpl, CreateMemberDto};
use crate::infrastructure::repositories::PgMemberRepository;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn auth_service(state: &AppState) -> AuthServiceImpl<PgMemberRepository> {
    let member_repo = Arc::new(PgMemberRepository::new(state.db.clone()));
    AuthServiceImpl::new(
        member_repo,
        state.settings.jwt.clone(),
        state.settings.forum.ban_days,
    )
}

fn auth_error(e: AuthError) -> AppError {
    match e {
        AuthError::InvalidCredentials => AppError::Unauthorized("Invalid username or password".into()),
        AuthError::TokenExpired | AuthError::InvalidToken => AppError::Unauthorized(e.to_string()),
        AuthError::Conflict(msg) => AppError::Conflict(msg),
        AuthError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Register a new member
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let (member, tokens) = auth_service(&state)
        .register(CreateMemberDto {
            username: body.username,
            email: body.email,
            password: body.password,
            banner_url: body.banner_url,
        })
        .await
        .map_err(auth_error)?;

    let response = AuthResponse {
        member: MemberResponse::from_member(member, true),
        token: TokenResponse::from(tokens),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with username and password
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let (member, tokens) = auth_service(&state)
        .authenticate(&body.username, &body.password)
        .await
        .map_err(auth_error)?;

    Ok(Json(AuthResponse {
        member: MemberResponse::from_member(member, true),
        token: TokenResponse::from(tokens),
    }))
}
