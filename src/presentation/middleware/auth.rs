//! Authentication Middleware
//!
//! JWT validation middleware for member routes and the moderator gate.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::application::services::{decode_access_token, AuthError, MemberError, MemberService};
use crate::presentation::http::handlers::member::{member_error, member_service};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Authenticated member extension
#[derive(Debug, Clone, Copy)]
pub struct AuthMember {
    pub member_id: i64,
}

fn bearer_token(request: &Request) -> Result<&str, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".into()))
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)?;

    let member_id = decode_access_token(token, &state.settings.jwt.secret).map_err(|e| match e {
        AuthError::TokenExpired => AppError::Unauthorized("Token expired".into()),
        _ => AppError::Unauthorized("Invalid token".into()),
    })?;

    // Insert authenticated member into request extensions
    request.extensions_mut().insert(AuthMember { member_id });

    Ok(next.run(request).await)
}

/// A token for a member that no longer exists is an auth failure; store errors pass through.
fn moderator_lookup_error(e: MemberError) -> AppError {
    match e {
        MemberError::NotFound => AppError::Unauthorized("Unknown member".into()),
        e => member_error(e),
    }
}

/// Rejects members without the moderator role. Runs after `auth_middleware`.
pub async fn require_moderator(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth = request
        .extensions()
        .get::<AuthMember>()
        .copied()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;

    let member = member_service(&state)
        .get_member_by_id(auth.member_id)
        .await
        .map_err(moderator_lookup_error)?;

    if !member.is_mod {
        tracing::warn!(member_id = member.id, "Moderator route refused");
        return Err(AppError::Forbidden("Moderator role required".into()));
    }

    Ok(next.run(request).await)
}
