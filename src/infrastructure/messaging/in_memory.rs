use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::application::services::queue::{MessageQueue, PayloadStream};

/// Single-subscriber queue held in process memory. Used for local runs and
/// tests in place of the NATS transport.
pub struct InMemoryQueue {
    sender: mpsc::UnboundedSender<Vec<u8>>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<Vec<u8>>>>,
    closed: AtomicBool,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(Some(receiver)),
            closed: AtomicBool::new(false),
        }
    }

    /// A queue whose `subscribe` always fails.
    pub fn unavailable() -> Self {
        let (sender, _) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    pub fn publish(&self, payload: impl Into<Vec<u8>>) -> anyhow::Result<()> {
        self.sender
            .send(payload.into())
            .map_err(|_| anyhow::anyhow!("in-memory queue has no subscriber"))
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageQueue for InMemoryQueue {
    async fn subscribe(&self, queue: &str) -> anyhow::Result<PayloadStream> {
        let receiver = self
            .receiver
            .lock()
            .await
            .take()
            .ok_or_else(|| anyhow::anyhow!("queue {queue} is not available for subscription"))?;
        Ok(Box::pin(UnboundedReceiverStream::new(receiver)))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
