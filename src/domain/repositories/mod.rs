use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::value_objects::DedupKey;

/// Result of trying to reserve a message body for delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    Acquired,
    /// The same body was delivered inside the suppression window.
    Recent { sent_at: DateTime<Utc> },
    /// Another delivery of the same body holds the claim.
    InFlight,
}

/// Keyed store of recently delivered message bodies.
///
/// `claim` is an atomic check-and-set: a key is either handed out or reported
/// as a duplicate under a single lock, so two concurrent sends of the same body
/// cannot both pass. A claim must be finished with `confirm` (delivered) or
/// `release` (not delivered). A claim left unfinished for longer than `lease`
/// is treated as abandoned and handed to the next caller.
#[async_trait]
pub trait SentMessageCache: Send + Sync {
    async fn claim(
        &self,
        key: &DedupKey,
        now: DateTime<Utc>,
        window: TimeDelta,
        lease: TimeDelta,
    ) -> Claim;
    async fn confirm(&self, key: &DedupKey, sent_at: DateTime<Utc>);
    async fn release(&self, key: &DedupKey);
    async fn last_sent(&self, key: &DedupKey) -> Option<DateTime<Utc>>;
}
