//! Moderation Handlers
//!
//! Routes here sit behind `require_moderator`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::MuteRequest;
use crate::application::dto::response::MemberResponse;
use crate::application::services::{MemberService, PostService};
use crate::domain::Post;
use crate::shared::error::AppError;
use crate::shared::validation::parse_id;
use crate::startup::AppState;

use super::member::{member_error, member_service};
use super::post::{post_error, post_service};

/// Posts awaiting review
pub async fn flagged_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, AppError> {
    let posts = post_service(&state)
        .get_flagged()
        .await
        .map_err(post_error)?;

    Ok(Json(posts))
}

/// Members awaiting review
pub async fn flagged_members(
    State(state): State<AppState>,
) -> Result<Json<Vec<MemberResponse>>, AppError> {
    let members = member_service(&state)
        .get_flagged_users()
        .await
        .map_err(member_error)?;

    Ok(Json(
        members
            .into_iter()
            .map(|m| MemberResponse::from_member(m, false))
            .collect(),
    ))
}

/// Delete any post
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Post>, AppError> {
    let post_id = parse_id(&post_id, "post")?;

    let post = post_service(&state)
        .mod_delete_post(post_id)
        .await
        .map_err(post_error)?;

    Ok(Json(post))
}

/// Mute a member until a given time
pub async fn mute_member(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
    Json(body): Json<MuteRequest>,
) -> Result<StatusCode, AppError> {
    let member_id = parse_id(&member_id, "member")?;

    member_service(&state)
        .mute_member(member_id, body.until)
        .await
        .map_err(member_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Mute a member for the configured ban window
pub async fn ban_member(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<StatusCode, AppError> {
    member_service(&state)
        .ban_user(&username)
        .await
        .map_err(member_error)?;

    Ok(StatusCode::NO_CONTENT)
}
