//! Community module - posts, comments and likes behind the onboarding gate.

mod post;

pub use post::{
    comments_topic, AuthorDisplay, Comment, CommentEvent, NewComment, NewPost, Post, PostPage,
    POSTS_PER_PAGE,
};
