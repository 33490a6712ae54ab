use async_trait::async_trait;

use crate::domain::events::SmsSentEvent;

#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: SmsSentEvent) -> anyhow::Result<()>;
}
