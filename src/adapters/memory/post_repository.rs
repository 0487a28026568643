//! In-memory post, like and comment storage.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::community::{AuthorDisplay, Comment, NewComment, NewPost, Post};
use crate::domain::foundation::{CommentId, DomainError, PostId, Timestamp, UserId};
use crate::ports::{PostRepository, ProfileRepository};

#[derive(Default)]
struct Feed {
    /// Insertion order; newest last.
    posts: Vec<Post>,
    likes: HashSet<(PostId, UserId)>,
    comments: Vec<Comment>,
}

impl Feed {
    fn with_counts(&self, post: &Post) -> Post {
        let mut post = post.clone();
        post.likes_count = self.likes.iter().filter(|(id, _)| *id == post.id).count() as u64;
        post.comments_count = self
            .comments
            .iter()
            .filter(|c| c.post_id == post.id)
            .count() as u64;
        post
    }
}

/// Feed storage. Author names are looked up in a profile repository when
/// one is attached.
#[derive(Default)]
pub struct InMemoryPostRepository {
    feed: RwLock<Feed>,
    profiles: Option<Arc<dyn ProfileRepository>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self {
            feed: RwLock::new(Feed::default()),
            profiles: Some(profiles),
        }
    }

    async fn author(&self, user_id: &UserId, is_anonymous: bool) -> AuthorDisplay {
        if is_anonymous {
            return AuthorDisplay::Anonymous;
        }
        let names = match &self.profiles {
            Some(profiles) => match profiles.find_by_id(user_id).await {
                Ok(Some(profile)) => Some((profile.first_name, profile.last_name)),
                _ => None,
            },
            None => None,
        };
        AuthorDisplay::for_record(false, names)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list_page(&self, page: u32, per_page: usize) -> Result<Vec<Post>, DomainError> {
        let feed = self.feed.read().await;
        Ok(feed
            .posts
            .iter()
            .rev()
            .skip(page as usize * per_page)
            .take(per_page)
            .map(|post| feed.with_counts(post))
            .collect())
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, DomainError> {
        let feed = self.feed.read().await;
        Ok(feed
            .posts
            .iter()
            .find(|post| post.id == *id)
            .map(|post| feed.with_counts(post)))
    }

    async fn create(&self, post: &NewPost) -> Result<Post, DomainError> {
        let author = self.author(&post.user_id, post.is_anonymous).await;
        let stored = Post {
            id: PostId::new(),
            user_id: post.user_id.clone(),
            title: post.title.clone(),
            content: post.content.clone(),
            image_url: post.image_url.clone(),
            is_anonymous: post.is_anonymous,
            likes_count: 0,
            comments_count: 0,
            created_at: Timestamp::now(),
            author,
        };
        self.feed.write().await.posts.push(stored.clone());
        Ok(stored)
    }

    async fn liked_post_ids(&self, user_id: &UserId) -> Result<HashSet<PostId>, DomainError> {
        Ok(self
            .feed
            .read()
            .await
            .likes
            .iter()
            .filter(|(_, liker)| liker == user_id)
            .map(|(post_id, _)| *post_id)
            .collect())
    }

    async fn has_liked(&self, post_id: &PostId, user_id: &UserId) -> Result<bool, DomainError> {
        Ok(self
            .feed
            .read()
            .await
            .likes
            .contains(&(*post_id, user_id.clone())))
    }

    async fn like(&self, post_id: &PostId, user_id: &UserId) -> Result<(), DomainError> {
        self.feed
            .write()
            .await
            .likes
            .insert((*post_id, user_id.clone()));
        Ok(())
    }

    async fn unlike(&self, post_id: &PostId, user_id: &UserId) -> Result<(), DomainError> {
        self.feed
            .write()
            .await
            .likes
            .remove(&(*post_id, user_id.clone()));
        Ok(())
    }

    async fn like_count(&self, post_id: &PostId) -> Result<u64, DomainError> {
        Ok(self
            .feed
            .read()
            .await
            .likes
            .iter()
            .filter(|(id, _)| id == post_id)
            .count() as u64)
    }

    async fn list_comments(&self, post_id: &PostId) -> Result<Vec<Comment>, DomainError> {
        Ok(self
            .feed
            .read()
            .await
            .comments
            .iter()
            .filter(|c| c.post_id == *post_id)
            .cloned()
            .collect())
    }

    async fn add_comment(&self, comment: &NewComment) -> Result<Comment, DomainError> {
        let author = self.author(&comment.user_id, comment.is_anonymous).await;
        let stored = Comment {
            id: CommentId::new(),
            post_id: comment.post_id,
            user_id: comment.user_id.clone(),
            content: comment.content.clone(),
            is_anonymous: comment.is_anonymous,
            created_at: Timestamp::now(),
            author,
        };
        self.feed.write().await.comments.push(stored.clone());
        Ok(stored)
    }
}
