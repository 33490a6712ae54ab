use async_trait::async_trait;
use tracing::info;

use crate::{application::services::event_bus::EventBus, domain::events::SmsSentEvent};

/// Event bus used when no event subject is configured: the event only shows
/// up in the service log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventBus;

#[async_trait]
impl EventBus for LogEventBus {
    async fn publish(&self, event: SmsSentEvent) -> anyhow::Result<()> {
        info!(
            event = %event.event,
            phone_number = %event.phone_number,
            timestamp = %event.timestamp,
            payload = %serde_json::to_string(&event)?,
            "publishing to event bus"
        );
        Ok(())
    }
}
