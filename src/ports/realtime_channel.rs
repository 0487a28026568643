//! RealtimeChannel port - topic based push of comment events.
//!
//! Subscribers register a handler for a topic and receive every event
//! published to it until their `Subscription` is dropped.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::domain::{community::CommentEvent, foundation::DomainError};

/// Receives events for a subscribed topic.
#[async_trait]
pub trait CommentEventHandler: Send + Sync {
    async fn handle(&self, event: CommentEvent);

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

#[async_trait]
pub trait RealtimeChannel: Send + Sync {
    /// Registers `handler` for `topic`. Dropping the returned subscription
    /// unregisters it.
    fn subscribe(&self, topic: &str, handler: Arc<dyn CommentEventHandler>) -> Subscription;

    /// Delivers `event` to every current subscriber of `topic`.
    async fn publish(&self, topic: &str, event: CommentEvent) -> Result<(), DomainError>;
}

/// Live registration on a topic. Unsubscribes on drop.
pub struct Subscription {
    topic: String,
    on_drop: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(topic: impl Into<String>, on_drop: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            topic: topic.into(),
            on_drop: Some(Box::new(on_drop)),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.on_drop.take() {
            unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn dropping_subscription_runs_unsubscribe() {
        let released = Arc::new(AtomicBool::new(false));
        let flag = released.clone();

        let subscription = Subscription::new("post_comments:1", move || {
            flag.store(true, Ordering::SeqCst);
        });
        assert_eq!(subscription.topic(), "post_comments:1");
        assert!(!released.load(Ordering::SeqCst));

        drop(subscription);
        assert!(released.load(Ordering::SeqCst));
    }
}
