//! Community application handlers.
//!
//! Every handler admits the caller through `CommunityAccess` first, so the
//! feed is only reachable once onboarding resolves to it.

mod access;
mod comments;
mod likes;
mod posts;

pub use access::CommunityAccess;
pub use comments::{
    AddCommentCommand, AddCommentHandler, ListCommentsHandler, WatchCommentsHandler,
};
pub use likes::{LikeState, ToggleLikeHandler};
pub use posts::{CreatePostCommand, CreatePostHandler, GetPostHandler, ListPostsHandler, PostView};
