use std::time::Duration;

use async_nats::jetstream::{
    self,
    consumer::{AckPolicy, PullConsumer, pull},
};
use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_stream::{StreamExt, wrappers::ReceiverStream};
use tracing::{error, info, warn};

use crate::{
    application::services::{
        event_bus::EventBus,
        queue::{MessageQueue, PayloadStream},
    },
    domain::events::SmsSentEvent,
};

const BATCH_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JetstreamConfig {
    pub url: String,
    pub stream: String,
    pub subject: String,
    pub durable: String,
    pub pull_batch: usize,
    pub ack_wait_seconds: u64,
}

/// Inbound command queue backed by a durable JetStream pull consumer.
pub struct JetstreamQueue {
    client: async_nats::Client,
    context: jetstream::Context,
    config: JetstreamConfig,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl JetstreamQueue {
    pub async fn connect(config: &JetstreamConfig) -> anyhow::Result<Self> {
        let client = async_nats::connect(&config.url).await?;
        let context = jetstream::new(client.clone());
        info!(url = %config.url, "connected to NATS");

        Ok(Self {
            client,
            context,
            config: config.clone(),
            pump: Mutex::new(None),
        })
    }

    pub fn client(&self) -> async_nats::Client {
        self.client.clone()
    }
}

#[async_trait]
impl MessageQueue for JetstreamQueue {
    async fn subscribe(&self, queue: &str) -> anyhow::Result<PayloadStream> {
        let stream = self
            .context
            .get_or_create_stream(jetstream::stream::Config {
                name: self.config.stream.clone(),
                subjects: vec![queue.to_string()],
                ..Default::default()
            })
            .await?;

        let consumer = stream
            .get_or_create_consumer(
                &self.config.durable,
                pull::Config {
                    durable_name: Some(self.config.durable.clone()),
                    ack_policy: AckPolicy::Explicit,
                    ack_wait: Duration::from_secs(self.config.ack_wait_seconds),
                    ..Default::default()
                },
            )
            .await?;

        let pull_batch = self.config.pull_batch.max(1);
        let (tx, rx) = mpsc::channel(pull_batch);
        let pump = tokio::spawn(pump(consumer, pull_batch, tx));
        if let Some(previous) = self.pump.lock().await.replace(pump) {
            previous.abort();
        }

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    async fn close(&self) {
        if let Some(pump) = self.pump.lock().await.take() {
            pump.abort();
        }
        if let Err(err) = self.client.flush().await {
            warn!(error = %err, "failed to flush NATS connection on close");
        }
        info!("NATS subscription released");
    }
}

/// Pulls batches and forwards payloads until the receiving side goes away.
/// Messages are acked before they are handed on, so a payload that later
/// fails to route is never redelivered.
async fn pump(consumer: PullConsumer, pull_batch: usize, tx: mpsc::Sender<Vec<u8>>) {
    while !tx.is_closed() {
        let mut batch = match consumer.batch().max_messages(pull_batch).messages().await {
            Ok(batch) => batch,
            Err(err) => {
                error!(error = %err, "failed to pull jetstream batch");
                tokio::time::sleep(BATCH_RETRY_DELAY).await;
                continue;
            }
        };

        while let Some(message) = batch.next().await {
            match message {
                Ok(msg) => {
                    if let Err(err) = msg.ack().await {
                        warn!(error = %err, "failed to ack command message");
                    }
                    if tx.send(msg.payload.to_vec()).await.is_err() {
                        return;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "jetstream batch error");
                }
            }
        }
    }
}

/// Publishes `SmsSent` events on a plain NATS subject. No ack is awaited.
pub struct NatsEventBus {
    client: async_nats::Client,
    subject: String,
}

impl NatsEventBus {
    pub fn new(client: async_nats::Client, subject: impl Into<String>) -> Self {
        Self {
            client,
            subject: subject.into(),
        }
    }
}

#[async_trait]
impl EventBus for NatsEventBus {
    async fn publish(&self, event: SmsSentEvent) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(&event)?;
        self.client
            .publish(self.subject.clone(), payload.into())
            .await?;
        Ok(())
    }
}
