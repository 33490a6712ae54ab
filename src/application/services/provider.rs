use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::OutboundSms;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryResult {
    Delivered { attempts: u32 },
    /// Every attempt failed; the provider never accepted the message.
    Exhausted { attempts: u32 },
}

impl DeliveryResult {
    pub fn attempts(&self) -> u32 {
        match *self {
            DeliveryResult::Delivered { attempts } | DeliveryResult::Exhausted { attempts } => {
                attempts
            }
        }
    }
}

/// Failures that happen outside a single delivery attempt and so are not
/// retried.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to encode sms payload: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait SmsProvider: Send + Sync {
    async fn send(&self, message: &OutboundSms) -> Result<DeliveryResult, DeliveryError>;
}
