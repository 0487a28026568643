//! HTTP handlers for posts, likes and comments.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::community::{
    AddCommentCommand, AddCommentHandler, CommunityAccess, CreatePostCommand, CreatePostHandler,
    GetPostHandler, ListCommentsHandler, ListPostsHandler, ToggleLikeHandler,
    WatchCommentsHandler,
};
use crate::domain::foundation::PostId;
use crate::ports::{PostRepository, ProfileRepository, RealtimeChannel, SessionValidator};

use super::super::error::ApiError;
use super::super::middleware::RequireAuth;
use super::dto::{
    CommentResponse, CreateCommentRequest, CreatePostRequest, ListPostsQuery, PostPageResponse,
    PostResponse,
};

/// Dependencies of the community endpoints.
#[derive(Clone)]
pub struct CommunityAppState {
    pub access: Arc<CommunityAccess>,
    pub posts: Arc<dyn PostRepository>,
    pub realtime: Arc<dyn RealtimeChannel>,
    /// Validates tokens passed on the websocket query string.
    pub validator: Arc<dyn SessionValidator>,
}

impl CommunityAppState {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        posts: Arc<dyn PostRepository>,
        realtime: Arc<dyn RealtimeChannel>,
        validator: Arc<dyn SessionValidator>,
    ) -> Self {
        Self {
            access: Arc::new(CommunityAccess::new(profiles)),
            posts,
            realtime,
            validator,
        }
    }

    pub fn list_posts_handler(&self) -> ListPostsHandler {
        ListPostsHandler::new(self.access.clone(), self.posts.clone())
    }

    pub fn get_post_handler(&self) -> GetPostHandler {
        GetPostHandler::new(self.access.clone(), self.posts.clone())
    }

    pub fn create_post_handler(&self) -> CreatePostHandler {
        CreatePostHandler::new(self.access.clone(), self.posts.clone())
    }

    pub fn toggle_like_handler(&self) -> ToggleLikeHandler {
        ToggleLikeHandler::new(self.access.clone(), self.posts.clone())
    }

    pub fn add_comment_handler(&self) -> AddCommentHandler {
        AddCommentHandler::new(
            self.access.clone(),
            self.posts.clone(),
            self.realtime.clone(),
        )
    }

    pub fn list_comments_handler(&self) -> ListCommentsHandler {
        ListCommentsHandler::new(self.access.clone(), self.posts.clone())
    }

    pub fn watch_comments_handler(&self) -> WatchCommentsHandler {
        WatchCommentsHandler::new(
            self.access.clone(),
            self.posts.clone(),
            self.realtime.clone(),
        )
    }
}

/// GET /api/posts?page=0
pub async fn list_posts(
    State(state): State<CommunityAppState>,
    RequireAuth(identity): RequireAuth,
    Query(query): Query<ListPostsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .list_posts_handler()
        .handle(&identity, query.page)
        .await?;
    Ok(Json(PostPageResponse::from(page)))
}

/// POST /api/posts
pub async fn create_post(
    State(state): State<CommunityAppState>,
    RequireAuth(identity): RequireAuth,
    Json(request): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = CreatePostCommand {
        title: request.title,
        content: request.content,
        image_url: request.image_url,
        is_anonymous: request.is_anonymous,
    };
    let post = state.create_post_handler().handle(&identity, cmd).await?;
    Ok((StatusCode::CREATED, Json(PostResponse::new(&post, false))))
}

/// GET /api/posts/:post_id
pub async fn get_post(
    State(state): State<CommunityAppState>,
    RequireAuth(identity): RequireAuth,
    Path(post_id): Path<PostId>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.get_post_handler().handle(&identity, post_id).await?;
    Ok(Json(PostResponse::from(view)))
}

/// POST /api/posts/:post_id/like - toggles the caller's like.
pub async fn toggle_like(
    State(state): State<CommunityAppState>,
    RequireAuth(identity): RequireAuth,
    Path(post_id): Path<PostId>,
) -> Result<impl IntoResponse, ApiError> {
    let like = state
        .toggle_like_handler()
        .handle(&identity, post_id)
        .await?;
    Ok(Json(like))
}

/// GET /api/posts/:post_id/comments
pub async fn list_comments(
    State(state): State<CommunityAppState>,
    RequireAuth(identity): RequireAuth,
    Path(post_id): Path<PostId>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = state
        .list_comments_handler()
        .handle(&identity, post_id)
        .await?;
    Ok(Json(
        comments
            .iter()
            .map(CommentResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// POST /api/posts/:post_id/comments
pub async fn add_comment(
    State(state): State<CommunityAppState>,
    RequireAuth(identity): RequireAuth,
    Path(post_id): Path<PostId>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = AddCommentCommand {
        post_id,
        content: request.content,
        is_anonymous: request.is_anonymous,
    };
    let comment = state.add_comment_handler().handle(&identity, cmd).await?;
    Ok((StatusCode::CREATED, Json(CommentResponse::from(&comment))))
}
