//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{auth_middleware, require_moderator, track_metrics};
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public routes
        .nest("/auth", auth_routes())
        // Protected routes (require authentication)
        .nest("/members", member_routes(state.clone()))
        .nest("/posts", post_routes(state.clone()))
        .nest("/mod", moderation_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
}

/// Member routes (protected)
fn member_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/@me", patch(handlers::member::edit_current_member))
        .route("/@me/email", put(handlers::member::update_email))
        .route("/@me/password", put(handlers::member::update_password))
        .route("/{member_id}", get(handlers::member::get_member))
        .route(
            "/by-username/{username}",
            get(handlers::member::get_member_by_username),
        )
        .route(
            "/by-username/{username}/posts",
            get(handlers::member::get_member_posts),
        )
        .route(
            "/by-username/{username}/flag",
            post(handlers::member::flag_member),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Post routes (protected)
fn post_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::post::list_posts).post(handlers::post::create_post),
        )
        .route(
            "/{post_id}",
            get(handlers::post::get_post)
                .patch(handlers::post::edit_post)
                .delete(handlers::post::delete_post),
        )
        .route("/{post_id}/like", post(handlers::post::like_post))
        .route("/{post_id}/comments", post(handlers::post::create_comment))
        .route("/{post_id}/children", get(handlers::post::get_children))
        .route("/{post_id}/thread", get(handlers::post::get_thread))
        .route("/{post_id}/flag", post(handlers::post::flag_post))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Moderator routes (protected, moderator role)
fn moderation_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/posts/flagged", get(handlers::moderation::flagged_posts))
        .route("/members/flagged", get(handlers::moderation::flagged_members))
        .route(
            "/posts/{post_id}",
            delete(handlers::moderation::delete_post),
        )
        .route(
            "/members/{member_id}/mute",
            post(handlers::moderation::mute_member),
        )
        .route(
            "/members/by-username/{username}/ban",
            post(handlers::moderation::ban_member),
        )
        // Layers run bottom-up: authentication first, then the role check
        .route_layer(middleware::from_fn_with_state(state.clone(), require_moderator))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
