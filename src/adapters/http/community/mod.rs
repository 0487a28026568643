//! HTTP adapter for the community feed.
//!
//! - `GET /api/posts?page=N` - one page of the feed, newest first
//! - `POST /api/posts` - create a post
//! - `GET /api/posts/:post_id` - one post with the caller's like state
//! - `POST /api/posts/:post_id/like` - toggle the caller's like
//! - `GET|POST /api/posts/:post_id/comments` - list or add comments
//! - `GET /api/posts/:post_id/comments/live` - websocket of new comments

pub mod dto;
pub mod handlers;
pub mod routes;
pub mod websocket;

pub use handlers::CommunityAppState;
pub use routes::community_router;
