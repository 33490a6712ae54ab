use std::str::FromStr;
use std::sync::Arc;

use chrono::TimeDelta;
use tracing::{error, info, warn};

use crate::{
    application::services::{
        clock::Clock,
        event_bus::EventBus,
        provider::{DeliveryResult, SmsProvider},
    },
    domain::{
        events::SmsSentEvent,
        models::{OutboundSms, ReceivedCommand},
        repositories::{Claim, SentMessageCache},
        value_objects::DedupKey,
    },
};

/// Repeats of the same body within this many minutes of a successful send are
/// dropped.
pub const DEDUP_WINDOW_MINUTES: i64 = 2;

/// A claim older than this is assumed to belong to a delivery that died
/// without confirming or releasing it.
pub const CLAIM_LEASE_MINUTES: i64 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DedupMode {
    /// Claim the key before delivery so concurrent repeats are suppressed.
    #[default]
    Atomic,
    /// Read the cache before delivery and write it after. Concurrent repeats
    /// of the same body can both get through.
    StrictLegacy,
}

impl FromStr for DedupMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "atomic" => Ok(DedupMode::Atomic),
            "strict-legacy" => Ok(DedupMode::StrictLegacy),
            other => Err(format!(
                "unknown dedup mode '{other}', expected 'atomic' or 'strict-legacy'"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendSmsOutcome {
    Invalid,
    Duplicate,
    Sent,
    Exhausted,
    Failed,
}

pub struct SendSmsUseCase {
    provider: Arc<dyn SmsProvider>,
    bus: Arc<dyn EventBus>,
    cache: Arc<dyn SentMessageCache>,
    clock: Arc<dyn Clock>,
    mode: DedupMode,
}

impl SendSmsUseCase {
    pub fn new(
        provider: Arc<dyn SmsProvider>,
        bus: Arc<dyn EventBus>,
        cache: Arc<dyn SentMessageCache>,
        clock: Arc<dyn Clock>,
        mode: DedupMode,
    ) -> Self {
        Self {
            provider,
            bus,
            cache,
            clock,
            mode,
        }
    }

    pub async fn execute(&self, command: ReceivedCommand) -> SendSmsOutcome {
        let message = match OutboundSms::try_from(&command) {
            Ok(message) => message,
            Err(err) => {
                error!(command = %to_json(&command), error = %err, "invalid sms command");
                return SendSmsOutcome::Invalid;
            }
        };

        info!(command = %to_json(&command), "sending sms");

        let key = DedupKey::for_message(&message);
        let claimed = match self.mode {
            DedupMode::Atomic => {
                if !self.claim(&key).await {
                    return SendSmsOutcome::Duplicate;
                }
                true
            }
            DedupMode::StrictLegacy => {
                if self.sent_recently(&key).await {
                    return SendSmsOutcome::Duplicate;
                }
                false
            }
        };

        let outcome = match self.provider.send(&message).await {
            Ok(DeliveryResult::Delivered { attempts }) => {
                info!(attempts, "publishing SmsSent event to event bus");
                let sent_at = self.clock.now();
                let published = self.publish(SmsSentEvent::new(&message, sent_at)).await;
                self.cache.confirm(&key, sent_at).await;
                if published {
                    info!("SmsSent event published to event bus");
                }
                return SendSmsOutcome::Sent;
            }
            Ok(DeliveryResult::Exhausted { attempts }) => {
                error!(attempts, "maximum retry attempts reached, sms delivery failed");
                SendSmsOutcome::Exhausted
            }
            Err(err) => {
                error!(error = %err, "error processing sms message");
                SendSmsOutcome::Failed
            }
        };

        if claimed {
            self.cache.release(&key).await;
        }
        outcome
    }

    async fn claim(&self, key: &DedupKey) -> bool {
        let window = TimeDelta::minutes(DEDUP_WINDOW_MINUTES);
        let lease = TimeDelta::minutes(CLAIM_LEASE_MINUTES);
        match self.cache.claim(key, self.clock.now(), window, lease).await {
            Claim::Acquired => true,
            Claim::Recent { sent_at } => {
                warn!(
                    %sent_at,
                    "message already sent recently, wait and resend in {DEDUP_WINDOW_MINUTES} minutes"
                );
                false
            }
            Claim::InFlight => {
                warn!("identical message is already being delivered");
                false
            }
        }
    }

    async fn sent_recently(&self, key: &DedupKey) -> bool {
        let window = TimeDelta::minutes(DEDUP_WINDOW_MINUTES);
        match self.cache.last_sent(key).await {
            Some(sent_at) if self.clock.now() - sent_at <= window => {
                warn!(
                    %sent_at,
                    "message already sent recently, wait and resend in {DEDUP_WINDOW_MINUTES} minutes"
                );
                true
            }
            _ => false,
        }
    }

    async fn publish(&self, event: SmsSentEvent) -> bool {
        match self.bus.publish(event).await {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, "failed to publish SmsSent event");
                false
            }
        }
    }
}

fn to_json(command: &ReceivedCommand) -> String {
    serde_json::to_string(command).unwrap_or_default()
}
