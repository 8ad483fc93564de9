//! Member Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{EditMemberRequest, UpdateEmailRequest, UpdatePasswordRequest};
use crate::application::dto::response::MemberResponse;
use crate::application::services::{
    EditMemberDto, MemberError, MemberService, MemberServiceImpl, PostService,
};
use crate::domain::Post;
use crate::infrastructure::repositories::PgMemberRepository;
use crate::presentation::middleware::AuthMember;
use crate::shared::error::AppError;
use crate::shared::validation::{parse_id, validation_error};
use crate::startup::AppState;

use super::post::{post_error, post_service};

pub(crate) fn member_service(state: &AppState) -> MemberServiceImpl<PgMemberRepository> {
    let member_repo = Arc::new(PgMemberRepository::new(state.db.clone()));
    MemberServiceImpl::new(member_repo, state.settings.forum.ban_days)
}

pub(crate) fn member_error(e: MemberError) -> AppError {
    match e {
        MemberError::NotFound => AppError::NotFound("Member not found".into()),
        MemberError::Conflict(msg) => AppError::Conflict(msg),
        MemberError::InvalidInput(msg) => AppError::BadRequest(msg),
        MemberError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Get member by ID
pub async fn get_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthMember>,
    Path(member_id): Path<String>,
) -> Result<Json<MemberResponse>, AppError> {
    let member_id = parse_id(&member_id, "member")?;

    let member = member_service(&state)
        .get_member_by_id(member_id)
        .await
        .map_err(member_error)?;

    // Email is only shown to its owner
    let own = member.id == auth.member_id;
    Ok(Json(MemberResponse::from_member(member, own)))
}

/// Get member by username
pub async fn get_member_by_username(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthMember>,
    Path(username): Path<String>,
) -> Result<Json<MemberResponse>, AppError> {
    let member = member_service(&state)
        .get_member_by_username(&username)
        .await
        .map_err(member_error)?;

    let own = member.id == auth.member_id;
    Ok(Json(MemberResponse::from_member(member, own)))
}

/// A member's posts, most liked first
pub async fn get_member_posts(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Post>>, AppError> {
    let member = member_service(&state)
        .get_member_by_username(&username)
        .await
        .map_err(member_error)?;

    let posts = post_service(&state)
        .get_top_posts(&member)
        .await
        .map_err(post_error)?;

    Ok(Json(posts))
}

/// Overwrite the current member's username, bio and password
pub async fn edit_current_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthMember>,
    Json(body): Json<EditMemberRequest>,
) -> Result<Json<MemberResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let member = member_service(&state)
        .edit_member(
            auth.member_id,
            EditMemberDto {
                username: body.username,
                bio: body.bio,
                password: body.password,
            },
        )
        .await
        .map_err(member_error)?;

    Ok(Json(MemberResponse::from_member(member, true)))
}

/// Change the current member's email
pub async fn update_email(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthMember>,
    Json(body): Json<UpdateEmailRequest>,
) -> Result<StatusCode, AppError> {
    body.validate().map_err(validation_error)?;

    let service = member_service(&state);
    let member = service
        .get_member_by_id(auth.member_id)
        .await
        .map_err(member_error)?;

    service
        .update_email(&member.username, &body.email)
        .await
        .map_err(member_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Change the current member's password
pub async fn update_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthMember>,
    Json(body): Json<UpdatePasswordRequest>,
) -> Result<StatusCode, AppError> {
    body.validate().map_err(validation_error)?;

    let service = member_service(&state);
    let member = service
        .get_member_by_id(auth.member_id)
        .await
        .map_err(member_error)?;

    service
        .update_password(&member.username, &body.password)
        .await
        .map_err(member_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Report a member to the moderators
pub async fn flag_member(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<StatusCode, AppError> {
    member_service(&state)
        .flag_user(&username)
        .await
        .map_err(member_error)?;

    Ok(StatusCode::NO_CONTENT)
}
