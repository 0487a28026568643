//! In-process realtime hub.
//!
//! Fans comment events out to the handlers subscribed to a topic. Used in
//! tests and by the server to push comments to connected websockets.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::community::CommentEvent;
use crate::domain::foundation::DomainError;
use crate::ports::{CommentEventHandler, RealtimeChannel, Subscription};

use super::lock;

type Registry = HashMap<String, Vec<(u64, Arc<dyn CommentEventHandler>)>>;

#[derive(Default)]
pub struct InMemoryRealtime {
    topics: Arc<Mutex<Registry>>,
    next_id: AtomicU64,
}

impl InMemoryRealtime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriptions on `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        lock(&self.topics).get(topic).map_or(0, Vec::len)
    }
}

#[async_trait]
impl RealtimeChannel for InMemoryRealtime {
    fn subscribe(&self, topic: &str, handler: Arc<dyn CommentEventHandler>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        lock(&self.topics)
            .entry(topic.to_string())
            .or_default()
            .push((id, handler));
        tracing::debug!(topic, subscription = id, "Realtime subscription added");

        let topics = Arc::downgrade(&self.topics);
        let key = topic.to_string();
        Subscription::new(topic, move || {
            let Some(topics) = topics.upgrade() else {
                return;
            };
            let mut registry = lock(&topics);
            if let Some(handlers) = registry.get_mut(&key) {
                handlers.retain(|(existing, _)| *existing != id);
                if handlers.is_empty() {
                    registry.remove(&key);
                }
            }
            tracing::debug!(topic = %key, subscription = id, "Realtime subscription removed");
        })
    }

    async fn publish(&self, topic: &str, event: CommentEvent) -> Result<(), DomainError> {
        let handlers: Vec<Arc<dyn CommentEventHandler>> = lock(&self.topics)
            .get(topic)
            .map(|handlers| handlers.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default();

        for handler in handlers {
            tracing::trace!(topic, handler = handler.name(), "Delivering comment event");
            handler.handle(event.clone()).await;
        }
        Ok(())
    }
}
