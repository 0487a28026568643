//! Live comment feed over a websocket.
//!
//! Route: `GET /api/posts/:post_id/comments/live`
//!
//! The caller is authenticated and admitted before the upgrade. After that the
//! socket receives one JSON `CommentMessage` per new comment until either side
//! closes. Dropping the subscription on disconnect unsubscribes.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::domain::community::CommentEvent;
use crate::domain::foundation::{DomainError, Identity, PostId};
use crate::ports::{CommentEventHandler, Subscription};

use super::super::error::ApiError;
use super::super::middleware::{AuthRejection, OptionalAuth};
use super::dto::{CommentResponse, LiveQuery};
use super::handlers::CommunityAppState;

/// Message pushed to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommentMessage {
    CommentAdded { comment: CommentResponse },
}

impl From<&CommentEvent> for CommentMessage {
    fn from(event: &CommentEvent) -> Self {
        match event {
            CommentEvent::Inserted(comment) => CommentMessage::CommentAdded {
                comment: CommentResponse::from(comment),
            },
        }
    }
}

/// Forwards realtime events into the socket's send task.
struct SocketForwarder {
    tx: mpsc::UnboundedSender<CommentEvent>,
}

#[async_trait]
impl CommentEventHandler for SocketForwarder {
    async fn handle(&self, event: CommentEvent) {
        // Closed receiver means the socket is gone; the subscription is
        // dropped right after.
        let _ = self.tx.send(event);
    }

    fn name(&self) -> &'static str {
        "SocketForwarder"
    }
}

async fn authenticate(
    state: &CommunityAppState,
    header_identity: Option<Identity>,
    query: LiveQuery,
) -> Result<Identity, Response> {
    if let Some(identity) = header_identity {
        return Ok(identity);
    }
    let Some(token) = query.access_token else {
        return Err(AuthRejection::Unauthenticated.into_response());
    };
    state
        .validator
        .validate(&token)
        .await
        .map_err(|err| ApiError(DomainError::from(err)).into_response())
}

pub async fn comments_ws(
    ws: WebSocketUpgrade,
    State(state): State<CommunityAppState>,
    OptionalAuth(identity): OptionalAuth,
    Path(post_id): Path<PostId>,
    Query(query): Query<LiveQuery>,
) -> Response {
    let identity = match authenticate(&state, identity, query).await {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let subscription = match state
        .watch_comments_handler()
        .handle(&identity, post_id, Arc::new(SocketForwarder { tx }))
        .await
    {
        Ok(subscription) => subscription,
        Err(err) => return ApiError(err).into_response(),
    };

    tracing::debug!(user_id = %identity.user_id, post_id = %post_id, "Live comments opened");
    ws.on_upgrade(move |socket| handle_socket(socket, subscription, rx))
}

async fn handle_socket(
    socket: WebSocket,
    subscription: Subscription,
    mut events: mpsc::UnboundedReceiver<CommentEvent>,
) {
    let (mut sender, mut receiver) = socket.split();
    let topic = subscription.topic().to_string();

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let text = match serde_json::to_string(&CommentMessage::from(&event)) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Failed to encode comment event: {}", e);
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(text)).await {
                tracing::debug!("Send error, closing connection: {}", e);
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("Receive error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    drop(subscription);
    tracing::debug!(topic = %topic, "Live comments closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::community::{AuthorDisplay, Comment};
    use crate::domain::foundation::{CommentId, Timestamp, UserId};

    #[test]
    fn comment_message_is_tagged() {
        let event = CommentEvent::Inserted(Comment {
            id: CommentId::new(),
            post_id: PostId::new(),
            user_id: UserId::new("u1").unwrap(),
            content: "hi".to_string(),
            is_anonymous: true,
            created_at: Timestamp::now(),
            author: AuthorDisplay::Anonymous,
        });

        let json = serde_json::to_value(CommentMessage::from(&event)).unwrap();

        assert_eq!(json["type"], "comment_added");
        assert_eq!(json["comment"]["content"], "hi");
        assert_eq!(json["comment"]["author"]["display_name"], "Anonymous");
    }

    #[tokio::test]
    async fn forwarder_pushes_into_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let forwarder = SocketForwarder { tx };
        let event = CommentEvent::Inserted(Comment {
            id: CommentId::new(),
            post_id: PostId::new(),
            user_id: UserId::new("u1").unwrap(),
            content: "hi".to_string(),
            is_anonymous: false,
            created_at: Timestamp::now(),
            author: AuthorDisplay::Anonymous,
        });

        forwarder.handle(event.clone()).await;

        assert_eq!(rx.recv().await, Some(event));
    }
}
