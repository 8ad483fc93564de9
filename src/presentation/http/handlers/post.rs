//! Post Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{
    CreateCommentRequest, CreatePostRequest, EditPostRequest, PostListQuery,
};
use crate::application::dto::response::{DeleteResponse, LikeResponse};
use crate::application::services::{MemberService, NewPostDto, PostError, PostService, PostServiceImpl};
use crate::domain::{CommentNode, Creator, Post};
use crate::infrastructure::repositories::{PgMemberRepository, PgPostRepository};
use crate::presentation::middleware::AuthMember;
use crate::shared::error::AppError;
use crate::shared::validation::{parse_id, validation_error};
use crate::startup::AppState;

use super::member::{member_error, member_service};

pub(crate) fn post_service(state: &AppState) -> PostServiceImpl<PgPostRepository, PgMemberRepository> {
    PostServiceImpl::new(
        Arc::new(PgPostRepository::new(state.db.clone())),
        Arc::new(PgMemberRepository::new(state.db.clone())),
        state.settings.forum.max_comment_depth,
    )
}

pub(crate) fn post_error(e: PostError) -> AppError {
    match e {
        PostError::NotFound => AppError::NotFound("Post not found".into()),
        PostError::CreatorNotFound(id) => AppError::NotFound(format!("Member {} not found", id)),
        PostError::InvalidInput(msg) => AppError::BadRequest(msg),
        PostError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Resolve the caller as the author of new content.
async fn author(state: &AppState, auth: AuthMember) -> Result<Creator, AppError> {
    let member = member_service(state)
        .get_member_by_id(auth.member_id)
        .await
        .map_err(member_error)?;
    Ok(Creator::Member(member))
}

/// Most liked top-level posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<Vec<Post>>, AppError> {
    let limit = state.settings.forum.page_size(query.limit);

    let posts = post_service(&state)
        .get_all_posts(limit)
        .await
        .map_err(post_error)?;

    Ok(Json(posts))
}

/// Create a top-level post
pub async fn create_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthMember>,
    Json(body): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    body.validate().map_err(validation_error)?;

    let creator = author(&state, auth).await?;
    let post = post_service(&state)
        .create_post(NewPostDto {
            title: Some(body.title),
            body: body.body,
            creator: Some(creator),
        })
        .await
        .map_err(post_error)?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// Get a post with its author
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Post>, AppError> {
    let post_id = parse_id(&post_id, "post")?;

    let post = post_service(&state)
        .get_post_by_id(post_id)
        .await
        .map_err(post_error)?;

    Ok(Json(post))
}

/// Edit title and body. Only the author may edit.
pub async fn edit_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthMember>,
    Path(post_id): Path<String>,
    Json(body): Json<EditPostRequest>,
) -> Result<Json<Post>, AppError> {
    body.validate().map_err(validation_error)?;

    let service = post_service(&state);
    let existing = service
        .get_post_by_id(parse_id(&post_id, "post")?)
        .await
        .map_err(post_error)?;

    if existing.member_id != auth.member_id {
        return Err(AppError::Forbidden("Only the author can edit this post".into()));
    }

    let post = service
        .edit_post(&body.title, &body.body, &post_id)
        .await
        .map_err(post_error)?;

    Ok(Json(post))
}

/// Logical delete by the author
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthMember>,
    Path(post_id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let post_id = parse_id(&post_id, "post")?;

    let outcome = post_service(&state)
        .delete_post(post_id, auth.member_id)
        .await
        .map_err(post_error)?;

    DeleteResponse::from_outcome(&outcome)
        .map(Json)
        .ok_or_else(|| AppError::Forbidden("Only the author can delete this post".into()))
}

/// Like a post once
pub async fn like_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthMember>,
    Path(post_id): Path<String>,
) -> Result<Json<LikeResponse>, AppError> {
    let post_id = parse_id(&post_id, "post")?;

    let liked = post_service(&state)
        .like_post(post_id, auth.member_id)
        .await
        .map_err(post_error)?;

    Ok(Json(LikeResponse { post_id, liked }))
}

/// Reply to a post or comment
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthMember>,
    Path(parent_id): Path<String>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    body.validate().map_err(validation_error)?;
    let parent_id = parse_id(&parent_id, "post")?;

    let creator = author(&state, auth).await?;
    let comment = post_service(&state)
        .create_comment(
            NewPostDto {
                title: None,
                body: body.body,
                creator: Some(creator),
            },
            parent_id,
        )
        .await
        .map_err(post_error)?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Direct replies of a post
pub async fn get_children(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<Post>>, AppError> {
    let post_id = parse_id(&post_id, "post")?;

    let children = post_service(&state)
        .get_children(post_id)
        .await
        .map_err(post_error)?;

    Ok(Json(children))
}

/// The full reply tree of a post
pub async fn get_thread(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<CommentNode>, AppError> {
    let post_id = parse_id(&post_id, "post")?;

    let thread = post_service(&state)
        .get_all_comments(post_id)
        .await
        .map_err(post_error)?;

    Ok(Json(thread))
}

/// Report a post to the moderators
pub async fn flag_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let post_id = parse_id(&post_id, "post")?;

    post_service(&state)
        .flag_post(post_id)
        .await
        .map_err(post_error)?;

    Ok(StatusCode::NO_CONTENT)
}
