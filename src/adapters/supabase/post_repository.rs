//! PostgREST implementation of PostRepository over `posts`, `post_likes` and
//! `post_comments`.
//!
//! Author names come from an embedded `user_profiles` select; like and
//! comment totals from embedded `count` aggregates.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::community::{AuthorDisplay, Comment, NewComment, NewPost, Post};
use crate::domain::foundation::{CommentId, DomainError, PostId, Timestamp, UserId};
use crate::ports::PostRepository;

use super::client::{content_range_total, SupabaseClient, SupabaseError};
use super::profile_repository::{eq, SINGLE_OBJECT};

const POSTS: &str = "posts";
const LIKES: &str = "post_likes";
const COMMENTS: &str = "post_comments";

const POST_SELECT: &str =
    "*,user_profiles(first_name,last_name),post_likes(count),post_comments(count)";
const COMMENT_SELECT: &str = "*,user_profiles(first_name,last_name)";

#[derive(Debug, Deserialize)]
struct AuthorRow {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

impl AuthorRow {
    fn names(self) -> (String, String) {
        (
            self.first_name.unwrap_or_default(),
            self.last_name.unwrap_or_default(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: u64,
}

fn total(rows: &[CountRow]) -> u64 {
    rows.first().map(|row| row.count).unwrap_or(0)
}

#[derive(Debug, Deserialize)]
struct PostRow {
    id: PostId,
    user_id: UserId,
    title: String,
    content: String,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    is_anonymous: bool,
    created_at: Timestamp,
    #[serde(default)]
    user_profiles: Option<AuthorRow>,
    #[serde(default)]
    post_likes: Vec<CountRow>,
    #[serde(default)]
    post_comments: Vec<CountRow>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            likes_count: total(&row.post_likes),
            comments_count: total(&row.post_comments),
            author: AuthorDisplay::for_record(
                row.is_anonymous,
                row.user_profiles.map(AuthorRow::names),
            ),
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            content: row.content,
            image_url: row.image_url,
            is_anonymous: row.is_anonymous,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommentRow {
    id: CommentId,
    post_id: PostId,
    user_id: UserId,
    content: String,
    #[serde(default)]
    is_anonymous: bool,
    created_at: Timestamp,
    #[serde(default)]
    user_profiles: Option<AuthorRow>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            author: AuthorDisplay::for_record(
                row.is_anonymous,
                row.user_profiles.map(AuthorRow::names),
            ),
            id: row.id,
            post_id: row.post_id,
            user_id: row.user_id,
            content: row.content,
            is_anonymous: row.is_anonymous,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LikeRow {
    post_id: PostId,
}

/// `offset` and `limit` for a zero-based page.
fn page_window(page: u32, per_page: usize) -> (usize, usize) {
    (page as usize * per_page, per_page)
}

pub struct SupabasePostRepository {
    client: Arc<SupabaseClient>,
}

impl SupabasePostRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PostRepository for SupabasePostRepository {
    async fn list_page(&self, page: u32, per_page: usize) -> Result<Vec<Post>, DomainError> {
        let (offset, limit) = page_window(page, per_page);
        let request = self.client.rest(Method::GET, POSTS)?.query(&[
            ("select", POST_SELECT.to_string()),
            ("order", "created_at.desc".to_string()),
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
        ]);

        let rows: Vec<PostRow> = self.client.send_json(request).await?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, DomainError> {
        let request = self
            .client
            .rest(Method::GET, POSTS)?
            .query(&[("select", POST_SELECT.to_string()), ("id", eq(id))])
            .header("Accept", SINGLE_OBJECT);

        match self.client.send_json::<PostRow>(request).await {
            Ok(row) => Ok(Some(row.into())),
            Err(err) if err.is_no_rows() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn create(&self, post: &NewPost) -> Result<Post, DomainError> {
        let request = self
            .client
            .rest(Method::POST, POSTS)?
            .query(&[("select", POST_SELECT)])
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .json(post);

        let row: PostRow = self.client.send_json(request).await?;
        tracing::info!(post_id = %row.id, "Post created");
        Ok(row.into())
    }

    async fn liked_post_ids(&self, user_id: &UserId) -> Result<HashSet<PostId>, DomainError> {
        let request = self
            .client
            .rest(Method::GET, LIKES)?
            .query(&[("select", "post_id".to_string()), ("user_id", eq(user_id))]);

        let rows: Vec<LikeRow> = self.client.send_json(request).await?;
        Ok(rows.into_iter().map(|row| row.post_id).collect())
    }

    async fn has_liked(&self, post_id: &PostId, user_id: &UserId) -> Result<bool, DomainError> {
        let request = self.client.rest(Method::GET, LIKES)?.query(&[
            ("select", "post_id".to_string()),
            ("post_id", eq(post_id)),
            ("user_id", eq(user_id)),
            ("limit", "1".to_string()),
        ]);

        let rows: Vec<LikeRow> = self.client.send_json(request).await?;
        Ok(!rows.is_empty())
    }

    async fn like(&self, post_id: &PostId, user_id: &UserId) -> Result<(), DomainError> {
        let request = self
            .client
            .rest(Method::POST, LIKES)?
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ "post_id": post_id, "user_id": user_id }));

        match self.client.send(request).await {
            Ok(_) => Ok(()),
            // Already liked.
            Err(err) if err.is_unique_violation() => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn unlike(&self, post_id: &PostId, user_id: &UserId) -> Result<(), DomainError> {
        let request = self
            .client
            .rest(Method::DELETE, LIKES)?
            .query(&[("post_id", eq(post_id)), ("user_id", eq(user_id))]);

        self.client.send(request).await?;
        Ok(())
    }

    async fn like_count(&self, post_id: &PostId) -> Result<u64, DomainError> {
        let request = self
            .client
            .rest(Method::HEAD, LIKES)?
            .query(&[("post_id", eq(post_id))])
            .header("Prefer", "count=exact");

        let response = self.client.send(request).await?;
        let total = response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .and_then(content_range_total)
            .ok_or_else(|| SupabaseError::Decode("missing Content-Range total".to_string()))?;
        Ok(total)
    }

    async fn list_comments(&self, post_id: &PostId) -> Result<Vec<Comment>, DomainError> {
        let request = self.client.rest(Method::GET, COMMENTS)?.query(&[
            ("select", COMMENT_SELECT.to_string()),
            ("post_id", eq(post_id)),
            ("order", "created_at.asc".to_string()),
        ]);

        let rows: Vec<CommentRow> = self.client.send_json(request).await?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn add_comment(&self, comment: &NewComment) -> Result<Comment, DomainError> {
        let request = self
            .client
            .rest(Method::POST, COMMENTS)?
            .query(&[("select", COMMENT_SELECT)])
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .json(comment);

        let row: CommentRow = self.client.send_json(request).await?;
        Ok(row.into())
    }
}
