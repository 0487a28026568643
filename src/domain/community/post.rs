//! Posts, comments and how their authors are displayed.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::foundation::{CommentId, PostId, Timestamp, UserId, ValidationError};

/// Number of posts per page in the feed.
pub const POSTS_PER_PAGE: usize = 10;

/// How a post or comment author is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthorDisplay {
    Anonymous,
    Named { first_name: String, last_name: String },
}

impl AuthorDisplay {
    /// Anonymity always wins over the author's names.
    pub fn for_record(is_anonymous: bool, names: Option<(String, String)>) -> Self {
        match (is_anonymous, names) {
            (true, _) | (false, None) => AuthorDisplay::Anonymous,
            (false, Some((first_name, last_name))) => AuthorDisplay::Named {
                first_name,
                last_name,
            },
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            AuthorDisplay::Anonymous => "Anonymous".to_string(),
            AuthorDisplay::Named {
                first_name,
                last_name,
            } => format!("{} {}", first_name, last_name).trim().to_string(),
        }
    }

    /// Avatar initials.
    pub fn initials(&self) -> String {
        match self {
            AuthorDisplay::Anonymous => "A".to_string(),
            AuthorDisplay::Named {
                first_name,
                last_name,
            } => first_name
                .chars()
                .take(1)
                .chain(last_name.chars().take(1))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub is_anonymous: bool,
    pub likes_count: u64,
    pub comments_count: u64,
    pub created_at: Timestamp,
    pub author: AuthorDisplay,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub content: String,
    pub is_anonymous: bool,
    pub created_at: Timestamp,
    pub author: AuthorDisplay,
}

fn required(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    Ok(trimmed.to_string())
}

/// Insert model for a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub is_anonymous: bool,
}

impl NewPost {
    pub fn new(
        user_id: UserId,
        title: &str,
        content: &str,
        image_url: Option<String>,
        is_anonymous: bool,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            user_id,
            title: required("title", title)?,
            content: required("content", content)?,
            image_url: image_url.filter(|url| !url.trim().is_empty()),
            is_anonymous,
        })
    }
}

/// Insert model for a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewComment {
    pub post_id: PostId,
    pub user_id: UserId,
    pub content: String,
    pub is_anonymous: bool,
}

impl NewComment {
    pub fn new(
        post_id: PostId,
        user_id: UserId,
        content: &str,
        is_anonymous: bool,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            post_id,
            user_id,
            content: required("content", content)?,
            is_anonymous,
        })
    }
}

/// Change pushed to subscribers of a post's comment feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "record", rename_all = "snake_case")]
pub enum CommentEvent {
    Inserted(Comment),
}

impl CommentEvent {
    pub fn post_id(&self) -> PostId {
        match self {
            CommentEvent::Inserted(comment) => comment.post_id,
        }
    }
}

/// Realtime topic carrying comment events for one post.
pub fn comments_topic(post_id: PostId) -> String {
    format!("post_comments:{}", post_id)
}

/// One page of the feed, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostPage {
    pub page: u32,
    pub posts: Vec<Post>,
    pub has_more: bool,
    /// Ids of posts the caller has liked.
    pub liked_post_ids: HashSet<PostId>,
}

impl PostPage {
    pub fn new(page: u32, posts: Vec<Post>, liked_post_ids: HashSet<PostId>) -> Self {
        let has_more = posts.len() == POSTS_PER_PAGE;
        Self {
            page,
            posts,
            has_more,
            liked_post_ids,
        }
    }

    pub fn is_liked(&self, post_id: &PostId) -> bool {
        self.liked_post_ids.contains(post_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("user-3").unwrap()
    }

    #[test]
    fn anonymous_hides_author_names() {
        let author =
            AuthorDisplay::for_record(true, Some(("Rana".to_string(), "Aziz".to_string())));
        assert_eq!(author, AuthorDisplay::Anonymous);
        assert_eq!(author.display_name(), "Anonymous");
        assert_eq!(author.initials(), "A");
    }

    #[test]
    fn named_author_renders_initials() {
        let author =
            AuthorDisplay::for_record(false, Some(("Rana".to_string(), "Aziz".to_string())));
        assert_eq!(author.display_name(), "Rana Aziz");
        assert_eq!(author.initials(), "RA");
    }

    #[test]
    fn new_post_requires_title_and_content() {
        assert!(NewPost::new(user(), "  ", "body", None, false).is_err());
        assert!(NewPost::new(user(), "Title", "", None, false).is_err());

        let post = NewPost::new(user(), " Title ", "body", Some(" ".to_string()), true).unwrap();
        assert_eq!(post.title, "Title");
        assert_eq!(post.image_url, None);
    }

    #[test]
    fn new_comment_rejects_blank_content() {
        let err = NewComment::new(PostId::new(), user(), "   ", false).unwrap_err();
        assert_eq!(err.field(), "content");
    }

    #[test]
    fn full_page_signals_more() {
        let page = PostPage::new(0, Vec::new(), HashSet::new());
        assert!(!page.has_more);
    }

    #[test]
    fn topic_is_scoped_to_post() {
        let id = PostId::new();
        assert_eq!(comments_topic(id), format!("post_comments:{}", id));
    }
}
