//! PostRepository port for posts, likes and comments.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::domain::{
    community::{Comment, NewComment, NewPost, Post},
    foundation::{DomainError, PostId, UserId},
};

/// Persistence of the community feed.
///
/// Pages are zero-based and ordered newest first.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn list_page(&self, page: u32, per_page: usize) -> Result<Vec<Post>, DomainError>;

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, DomainError>;

    async fn create(&self, post: &NewPost) -> Result<Post, DomainError>;

    /// Ids of every post the user has liked.
    async fn liked_post_ids(&self, user_id: &UserId) -> Result<HashSet<PostId>, DomainError>;

    async fn has_liked(&self, post_id: &PostId, user_id: &UserId) -> Result<bool, DomainError>;

    async fn like(&self, post_id: &PostId, user_id: &UserId) -> Result<(), DomainError>;

    async fn unlike(&self, post_id: &PostId, user_id: &UserId) -> Result<(), DomainError>;

    async fn like_count(&self, post_id: &PostId) -> Result<u64, DomainError>;

    /// Comments of a post, oldest first.
    async fn list_comments(&self, post_id: &PostId) -> Result<Vec<Comment>, DomainError>;

    async fn add_comment(&self, comment: &NewComment) -> Result<Comment, DomainError>;
}
