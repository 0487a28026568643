//! ToggleLikeHandler - like or unlike a post.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, Identity, PostId};
use crate::ports::PostRepository;

use super::posts::post_not_found;
use super::CommunityAccess;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub like_count: u64,
}

pub struct ToggleLikeHandler {
    access: Arc<CommunityAccess>,
    posts: Arc<dyn PostRepository>,
}

impl ToggleLikeHandler {
    pub fn new(access: Arc<CommunityAccess>, posts: Arc<dyn PostRepository>) -> Self {
        Self { access, posts }
    }

    /// Likes the post if the caller has not liked it yet, otherwise removes
    /// the like. Returns the state after the change.
    pub async fn handle(&self, identity: &Identity, post_id: PostId) -> Result<LikeState, DomainError> {
        self.access.ensure(identity).await?;
        if self.posts.find_by_id(&post_id).await?.is_none() {
            return Err(post_not_found(post_id));
        }

        let liked = if self.posts.has_liked(&post_id, &identity.user_id).await? {
            self.posts.unlike(&post_id, &identity.user_id).await?;
            false
        } else {
            self.posts.like(&post_id, &identity.user_id).await?;
            true
        };
        let like_count = self.posts.like_count(&post_id).await?;
        tracing::debug!(post_id = %post_id, liked, like_count, "Like toggled");
        Ok(LikeState { liked, like_count })
    }
}
