//! In-memory event bus for tests and development, mirroring the fanout
//! semantics of the RabbitMQ implementation: every subscriber receives every
//! published message, and published envelopes are retained for inspection.

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

use crate::error::Result;
use crate::messaging::bus::{EventBus, MessageStream};
use crate::messaging::envelope::LockMessage;

/// In-memory fanout bus
#[derive(Debug, Default)]
pub struct InMemoryEventBus {
    /// Live subscriber channels
    subscribers: RwLock<Vec<mpsc::UnboundedSender<Vec<u8>>>>,
    /// Every envelope published through this bus, in order
    published: RwLock<Vec<LockMessage>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver raw bytes to subscribers without going through the envelope
    /// encoder; lets tests inject malformed payloads
    pub async fn publish_raw(&self, payload: Vec<u8>) {
        let mut subscribers = self.subscribers.write().await;
        subscribers.retain(|tx| tx.send(payload.clone()).is_ok());
    }

    /// Envelopes published so far, in publish order
    pub async fn published_messages(&self) -> Vec<LockMessage> {
        self.published.read().await.clone()
    }

    /// Number of envelopes published so far
    pub async fn published_count(&self) -> usize {
        self.published.read().await.len()
    }

    /// Clear the published log
    pub async fn clear_published(&self) {
        self.published.write().await.clear();
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, message: &LockMessage) -> Result<()> {
        let bytes = message.to_bytes()?;

        self.published.write().await.push(message.clone());
        self.publish_raw(bytes).await;

        debug!(
            message_type = %message.message_type,
            schedule_hash = %message.schedule_hash,
            "Published lock message to in-memory bus"
        );

        Ok(())
    }

    async fn subscribe(&self) -> Result<MessageStream> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.write().await.push(tx);

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|payload| (payload, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn health_check(&self) -> Result<bool> {
        // In-memory bus is always healthy
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "in_memory"
    }
}
