//! Axum routes for the community endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    add_comment, create_post, get_post, list_comments, list_posts, toggle_like,
    CommunityAppState,
};
use super::websocket::comments_ws;

/// Routes mounted at `/api/posts`. Every route requires a completed
/// onboarding.
pub fn community_router() -> Router<CommunityAppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/:post_id", get(get_post))
        .route("/posts/:post_id/like", post(toggle_like))
        .route(
            "/posts/:post_id/comments",
            get(list_comments).post(add_comment),
        )
        .route("/posts/:post_id/comments/live", get(comments_ws))
}
