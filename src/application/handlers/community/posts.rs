//! Feed handlers: list, get and create posts.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::community::{NewPost, Post, PostPage, POSTS_PER_PAGE};
use crate::domain::foundation::{DomainError, ErrorCode, Identity, PostId};
use crate::ports::PostRepository;

use super::CommunityAccess;

pub struct ListPostsHandler {
    access: Arc<CommunityAccess>,
    posts: Arc<dyn PostRepository>,
}

impl ListPostsHandler {
    pub fn new(access: Arc<CommunityAccess>, posts: Arc<dyn PostRepository>) -> Self {
        Self { access, posts }
    }

    /// Zero-based page of the feed, newest first.
    pub async fn handle(&self, identity: &Identity, page: u32) -> Result<PostPage, DomainError> {
        self.access.ensure(identity).await?;
        let posts = self.posts.list_page(page, POSTS_PER_PAGE).await?;
        let liked = self.posts.liked_post_ids(&identity.user_id).await?;
        Ok(PostPage::new(page, posts, liked))
    }
}

/// A post with the caller's like state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostView {
    pub post: Post,
    pub like_count: u64,
    pub liked_by_me: bool,
}

pub struct GetPostHandler {
    access: Arc<CommunityAccess>,
    posts: Arc<dyn PostRepository>,
}

impl GetPostHandler {
    pub fn new(access: Arc<CommunityAccess>, posts: Arc<dyn PostRepository>) -> Self {
        Self { access, posts }
    }

    pub async fn handle(&self, identity: &Identity, id: PostId) -> Result<PostView, DomainError> {
        self.access.ensure(identity).await?;
        let post = self
            .posts
            .find_by_id(&id)
            .await?
            .ok_or_else(|| post_not_found(id))?;
        let like_count = self.posts.like_count(&id).await?;
        let liked_by_me = self.posts.has_liked(&id, &identity.user_id).await?;
        Ok(PostView {
            post,
            like_count,
            liked_by_me,
        })
    }
}

pub(super) fn post_not_found(id: PostId) -> DomainError {
    DomainError::new(ErrorCode::PostNotFound, "Post not found").with_detail("id", id.to_string())
}

#[derive(Debug, Clone)]
pub struct CreatePostCommand {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub is_anonymous: bool,
}

pub struct CreatePostHandler {
    access: Arc<CommunityAccess>,
    posts: Arc<dyn PostRepository>,
}

impl CreatePostHandler {
    pub fn new(access: Arc<CommunityAccess>, posts: Arc<dyn PostRepository>) -> Self {
        Self { access, posts }
    }

    pub async fn handle(
        &self,
        identity: &Identity,
        cmd: CreatePostCommand,
    ) -> Result<Post, DomainError> {
        self.access.ensure(identity).await?;
        let new = NewPost::new(
            identity.user_id.clone(),
            &cmd.title,
            &cmd.content,
            cmd.image_url,
            cmd.is_anonymous,
        )?;
        let post = self.posts.create(&new).await?;
        tracing::info!(post_id = %post.id, anonymous = post.is_anonymous, "Post created");
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryPostRepository, InMemoryProfileRepository};
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::domain::user::{Gender, NewProfile, Profile};

    fn identity(id: &str) -> Identity {
        Identity::new(UserId::new(id).unwrap())
    }

    async fn setup() -> (Arc<CommunityAccess>, Arc<InMemoryPostRepository>) {
        let mut profiles = InMemoryProfileRepository::new();
        for (id, gender) in [("member", Gender::Male), ("pending", Gender::Female)] {
            let new = NewProfile::for_identity(&identity(id), None).with_gender(gender);
            profiles = profiles
                .with_profile(Profile::from_new(new, Timestamp::now()))
                .await;
        }
        let profiles = Arc::new(profiles);
        let access = Arc::new(CommunityAccess::new(profiles.clone()));
        let posts = Arc::new(InMemoryPostRepository::with_profiles(profiles));
        (access, posts)
    }

    fn command(title: &str) -> CreatePostCommand {
        CreatePostCommand {
            title: title.to_string(),
            content: "content".to_string(),
            image_url: None,
            is_anonymous: false,
        }
    }

    #[tokio::test]
    async fn list_reports_more_when_page_is_full() {
        let (access, posts) = setup().await;
        let create = CreatePostHandler::new(access.clone(), posts.clone());
        for i in 0..11 {
            create
                .handle(&identity("member"), command(&format!("Post {}", i)))
                .await
                .unwrap();
        }
        let list = ListPostsHandler::new(access, posts);

        let first = list.handle(&identity("member"), 0).await.unwrap();
        let second = list.handle(&identity("member"), 1).await.unwrap();

        assert_eq!(first.posts.len(), POSTS_PER_PAGE);
        assert!(first.has_more);
        assert_eq!(second.posts.len(), 1);
        assert!(!second.has_more);
    }

    #[tokio::test]
    async fn pending_survey_cannot_post() {
        let (access, posts) = setup().await;
        let create = CreatePostHandler::new(access, posts.clone());

        let err = create
            .handle(&identity("pending"), command("Hello"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Forbidden);
        assert!(posts.list_page(0, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_unknown_post_is_not_found() {
        let (access, posts) = setup().await;

        let err = GetPostHandler::new(access, posts)
            .handle(&identity("member"), PostId::new())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::PostNotFound);
    }

    #[tokio::test]
    async fn created_post_carries_author_name() {
        let (access, posts) = setup().await;

        let post = CreatePostHandler::new(access.clone(), posts.clone())
            .handle(&identity("member"), command("Hello"))
            .await
            .unwrap();
        let view = GetPostHandler::new(access, posts)
            .handle(&identity("member"), post.id)
            .await
            .unwrap();

        assert_eq!(view.post.title, "Hello");
        assert_eq!(view.like_count, 0);
        assert!(!view.liked_by_me);
    }
}
