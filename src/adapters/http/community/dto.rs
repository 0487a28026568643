//! Request and response bodies for the community endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::community::PostView;
use crate::domain::community::{AuthorDisplay, Comment, Post, PostPage};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPostsQuery {
    /// Zero-based page number.
    #[serde(default)]
    pub page: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

/// Query of the live comments socket. Browsers cannot set headers on a
/// websocket upgrade, so the token may come here instead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiveQuery {
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorResponse {
    pub display_name: String,
    pub initials: String,
    pub anonymous: bool,
}

impl From<&AuthorDisplay> for AuthorResponse {
    fn from(author: &AuthorDisplay) -> Self {
        Self {
            display_name: author.display_name(),
            initials: author.initials(),
            anonymous: matches!(author, AuthorDisplay::Anonymous),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub author: AuthorResponse,
    pub likes_count: u64,
    pub comments_count: u64,
    pub liked_by_me: bool,
    pub created_at: String,
}

impl PostResponse {
    pub fn new(post: &Post, liked_by_me: bool) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title.clone(),
            content: post.content.clone(),
            image_url: post.image_url.clone(),
            author: AuthorResponse::from(&post.author),
            likes_count: post.likes_count,
            comments_count: post.comments_count,
            liked_by_me,
            created_at: post.created_at.as_datetime().to_rfc3339(),
        }
    }
}

impl From<PostView> for PostResponse {
    fn from(view: PostView) -> Self {
        let mut response = PostResponse::new(&view.post, view.liked_by_me);
        response.likes_count = view.like_count;
        response
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPageResponse {
    pub page: u32,
    pub posts: Vec<PostResponse>,
    pub has_more: bool,
}

impl From<PostPage> for PostPageResponse {
    fn from(page: PostPage) -> Self {
        Self {
            posts: page
                .posts
                .iter()
                .map(|post| PostResponse::new(post, page.is_liked(&post.id)))
                .collect(),
            page: page.page,
            has_more: page.has_more,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub content: String,
    pub author: AuthorResponse,
    pub created_at: String,
}

impl From<&Comment> for CommentResponse {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.to_string(),
            post_id: comment.post_id.to_string(),
            content: comment.content.clone(),
            author: AuthorResponse::from(&comment.author),
            created_at: comment.created_at.as_datetime().to_rfc3339(),
        }
    }
}
