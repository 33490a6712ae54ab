use std::pin::Pin;

use async_trait::async_trait;
use tokio_stream::Stream;

/// Raw payloads in arrival order. Messages are already acknowledged at the
/// transport when they show up here.
pub type PayloadStream = Pin<Box<dyn Stream<Item = Vec<u8>> + Send>>;

#[async_trait]
pub trait MessageQueue: Send + Sync {
    async fn subscribe(&self, queue: &str) -> anyhow::Result<PayloadStream>;

    /// Releases the subscription and transport resources. Safe to call after a
    /// failed `subscribe`.
    async fn close(&self);
}
