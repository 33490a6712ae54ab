use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

use crate::application::{
    handlers::command_router::CommandRouter,
    services::queue::{MessageQueue, PayloadStream},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Starting,
    Subscribed,
    SubscriptionFailed,
    Stopped,
}

/// Resolves once `shutdown` flips to `true` or its sender is dropped.
pub async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// Owns the inbound queue subscription for the life of the process.
pub struct QueueListener {
    queue: Arc<dyn MessageQueue>,
    router: Arc<CommandRouter>,
    queue_name: String,
    state: watch::Sender<ListenerState>,
}

impl QueueListener {
    pub fn new(
        queue: Arc<dyn MessageQueue>,
        router: Arc<CommandRouter>,
        queue_name: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(ListenerState::Starting);
        Self {
            queue,
            router,
            queue_name: queue_name.into(),
            state,
        }
    }

    pub fn state(&self) -> watch::Receiver<ListenerState> {
        self.state.subscribe()
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Subscribes and routes payloads until shutdown. A failed subscription is
    /// logged and the listener idles until shutdown instead of exiting. The
    /// queue is closed on every path out.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        match self.queue.subscribe(&self.queue_name).await {
            Ok(stream) => {
                self.state.send_replace(ListenerState::Subscribed);
                info!(queue = %self.queue_name, "subscribed to the message queue");
                self.consume(stream, &mut shutdown).await;
            }
            Err(err) => {
                self.state.send_replace(ListenerState::SubscriptionFailed);
                error!(
                    queue = %self.queue_name,
                    error = %err,
                    "can not listen to the message queue"
                );
                wait_for_shutdown(&mut shutdown).await;
            }
        }

        self.queue.close().await;
        self.state.send_replace(ListenerState::Stopped);
        info!(queue = %self.queue_name, "queue listener stopped");
    }

    async fn consume(&self, mut stream: PayloadStream, shutdown: &mut watch::Receiver<bool>) {
        loop {
            tokio::select! {
                biased;

                _ = wait_for_shutdown(shutdown) => {
                    info!("queue listener shutting down");
                    break;
                }

                payload = stream.next() => match payload {
                    Some(payload) => {
                        let outcome = self.router.route(&payload);
                        debug!(?outcome, "payload routed");
                    }
                    None => {
                        warn!(queue = %self.queue_name, "inbound queue closed");
                        break;
                    }
                },
            }
        }
    }
}
