//! Comment handlers: add, list and watch a post's comments.

use std::sync::Arc;

use crate::domain::community::{comments_topic, Comment, CommentEvent, NewComment};
use crate::domain::foundation::{DomainError, Identity, PostId};
use crate::ports::{CommentEventHandler, PostRepository, RealtimeChannel, Subscription};

use super::posts::post_not_found;
use super::CommunityAccess;

#[derive(Debug, Clone)]
pub struct AddCommentCommand {
    pub post_id: PostId,
    pub content: String,
    pub is_anonymous: bool,
}

pub struct AddCommentHandler {
    access: Arc<CommunityAccess>,
    posts: Arc<dyn PostRepository>,
    realtime: Arc<dyn RealtimeChannel>,
}

impl AddCommentHandler {
    pub fn new(
        access: Arc<CommunityAccess>,
        posts: Arc<dyn PostRepository>,
        realtime: Arc<dyn RealtimeChannel>,
    ) -> Self {
        Self {
            access,
            posts,
            realtime,
        }
    }

    /// Stores the comment and pushes it to the post's subscribers. A failed
    /// push does not fail the request.
    pub async fn handle(
        &self,
        identity: &Identity,
        cmd: AddCommentCommand,
    ) -> Result<Comment, DomainError> {
        self.access.ensure(identity).await?;
        if self.posts.find_by_id(&cmd.post_id).await?.is_none() {
            return Err(post_not_found(cmd.post_id));
        }

        let new = NewComment::new(
            cmd.post_id,
            identity.user_id.clone(),
            &cmd.content,
            cmd.is_anonymous,
        )?;
        let comment = self.posts.add_comment(&new).await?;

        let topic = comments_topic(comment.post_id);
        if let Err(err) = self
            .realtime
            .publish(&topic, CommentEvent::Inserted(comment.clone()))
            .await
        {
            tracing::warn!(topic = %topic, error = %err, "Comment push failed");
        }
        Ok(comment)
    }
}

pub struct ListCommentsHandler {
    access: Arc<CommunityAccess>,
    posts: Arc<dyn PostRepository>,
}

impl ListCommentsHandler {
    pub fn new(access: Arc<CommunityAccess>, posts: Arc<dyn PostRepository>) -> Self {
        Self { access, posts }
    }

    pub async fn handle(
        &self,
        identity: &Identity,
        post_id: PostId,
    ) -> Result<Vec<Comment>, DomainError> {
        self.access.ensure(identity).await?;
        self.posts.list_comments(&post_id).await
    }
}

pub struct WatchCommentsHandler {
    access: Arc<CommunityAccess>,
    posts: Arc<dyn PostRepository>,
    realtime: Arc<dyn RealtimeChannel>,
}

impl WatchCommentsHandler {
    pub fn new(
        access: Arc<CommunityAccess>,
        posts: Arc<dyn PostRepository>,
        realtime: Arc<dyn RealtimeChannel>,
    ) -> Self {
        Self {
            access,
            posts,
            realtime,
        }
    }

    /// Subscribes `handler` to new comments on `post_id`. Drop the returned
    /// subscription to stop.
    pub async fn handle(
        &self,
        identity: &Identity,
        post_id: PostId,
        handler: Arc<dyn CommentEventHandler>,
    ) -> Result<Subscription, DomainError> {
        self.access.ensure(identity).await?;
        if self.posts.find_by_id(&post_id).await?.is_none() {
            return Err(post_not_found(post_id));
        }
        let topic = comments_topic(post_id);
        tracing::debug!(topic = %topic, handler = handler.name(), "Watching comments");
        Ok(self.realtime.subscribe(&topic, handler))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryPostRepository, InMemoryProfileRepository, InMemoryRealtime,
    };
    use crate::domain::community::{AuthorDisplay, NewPost};
    use crate::domain::foundation::{ErrorCode, Timestamp, UserId};
    use crate::domain::user::{Gender, NewProfile, Profile};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Collecting(Mutex<Vec<CommentEvent>>);

    #[async_trait]
    impl CommentEventHandler for Collecting {
        async fn handle(&self, event: CommentEvent) {
            self.0.lock().unwrap().push(event);
        }

        fn name(&self) -> &'static str {
            "Collecting"
        }
    }

    struct Setup {
        access: Arc<CommunityAccess>,
        posts: Arc<InMemoryPostRepository>,
        realtime: Arc<InMemoryRealtime>,
        identity: Identity,
        post_id: PostId,
    }

    async fn setup() -> Setup {
        let identity = Identity::new(UserId::new("u1").unwrap());
        let new = NewProfile::for_identity(&identity, None).with_gender(Gender::Male);
        let profiles = Arc::new(
            InMemoryProfileRepository::new()
                .with_profile(Profile::from_new(new, Timestamp::now()))
                .await,
        );
        let posts = Arc::new(InMemoryPostRepository::with_profiles(profiles.clone()));
        let post = posts
            .create(&NewPost::new(identity.user_id.clone(), "T", "C", None, false).unwrap())
            .await
            .unwrap();
        Setup {
            access: Arc::new(CommunityAccess::new(profiles)),
            posts,
            realtime: Arc::new(InMemoryRealtime::new()),
            identity,
            post_id: post.id,
        }
    }

    #[tokio::test]
    async fn watcher_receives_new_comments_until_dropped() {
        let s = setup().await;
        let collector = Arc::new(Collecting(Mutex::new(Vec::new())));
        let watch = WatchCommentsHandler::new(s.access.clone(), s.posts.clone(), s.realtime.clone());
        let add = AddCommentHandler::new(s.access.clone(), s.posts.clone(), s.realtime.clone());

        let subscription = watch
            .handle(&s.identity, s.post_id, collector.clone())
            .await
            .unwrap();
        add.handle(
            &s.identity,
            AddCommentCommand {
                post_id: s.post_id,
                content: "first".to_string(),
                is_anonymous: true,
            },
        )
        .await
        .unwrap();

        {
            let seen = collector.0.lock().unwrap();
            assert_eq!(seen.len(), 1);
            let CommentEvent::Inserted(comment) = &seen[0];
            assert_eq!(comment.author, AuthorDisplay::Anonymous);
        }

        drop(subscription);
        add.handle(
            &s.identity,
            AddCommentCommand {
                post_id: s.post_id,
                content: "second".to_string(),
                is_anonymous: false,
            },
        )
        .await
        .unwrap();
        assert_eq!(collector.0.lock().unwrap().len(), 1);

        let all = ListCommentsHandler::new(s.access, s.posts)
            .handle(&s.identity, s.post_id)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn blank_comment_is_rejected() {
        let s = setup().await;
        let add = AddCommentHandler::new(s.access, s.posts, s.realtime);

        let err = add
            .handle(
                &s.identity,
                AddCommentCommand {
                    post_id: s.post_id,
                    content: "   ".to_string(),
                    is_anonymous: false,
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn watching_unknown_post_fails() {
        let s = setup().await;
        let watch = WatchCommentsHandler::new(s.access, s.posts, s.realtime.clone());

        let err = watch
            .handle(
                &s.identity,
                PostId::new(),
                Arc::new(Collecting(Mutex::new(Vec::new()))),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::PostNotFound);
    }
}
