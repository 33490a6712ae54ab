use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use tracing::warn;

use crate::domain::{
    repositories::{Claim, SentMessageCache},
    value_objects::DedupKey,
};

#[derive(Debug, Clone, Copy)]
enum Entry {
    /// Claimed and not yet finished. Keeps the previous send time so a failed
    /// delivery does not erase history.
    Pending {
        claimed_at: DateTime<Utc>,
        previous: Option<DateTime<Utc>>,
    },
    Sent(DateTime<Utc>),
}

impl Entry {
    fn sent_at(&self) -> Option<DateTime<Utc>> {
        match *self {
            Entry::Pending { previous, .. } => previous,
            Entry::Sent(at) => Some(at),
        }
    }
}

/// Process-wide dedup cache. Entries are never evicted; expiry is decided on
/// read against the caller's window.
#[derive(Default)]
pub struct InMemorySentMessageCache {
    entries: Arc<RwLock<HashMap<DedupKey, Entry>>>,
}

impl InMemorySentMessageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl SentMessageCache for InMemorySentMessageCache {
    async fn claim(
        &self,
        key: &DedupKey,
        now: DateTime<Utc>,
        window: TimeDelta,
        lease: TimeDelta,
    ) -> Claim {
        let mut entries = self.entries.write().await;

        let previous = match entries.get(key).copied() {
            Some(Entry::Pending {
                claimed_at,
                previous,
            }) => {
                if now - claimed_at <= lease {
                    return Claim::InFlight;
                }
                warn!(%key, %claimed_at, "taking over an abandoned dedup claim");
                previous
            }
            Some(Entry::Sent(sent_at)) if now - sent_at <= window => {
                return Claim::Recent { sent_at };
            }
            Some(Entry::Sent(sent_at)) => Some(sent_at),
            None => None,
        };

        entries.insert(
            key.clone(),
            Entry::Pending {
                claimed_at: now,
                previous,
            },
        );
        Claim::Acquired
    }

    async fn confirm(&self, key: &DedupKey, sent_at: DateTime<Utc>) {
        let mut entries = self.entries.write().await;
        entries.insert(key.clone(), Entry::Sent(sent_at));
    }

    async fn release(&self, key: &DedupKey) {
        let mut entries = self.entries.write().await;
        if let Some(Entry::Pending { previous, .. }) = entries.get(key).copied() {
            match previous {
                Some(sent_at) => {
                    entries.insert(key.clone(), Entry::Sent(sent_at));
                }
                None => {
                    entries.remove(key);
                }
            }
        }
    }

    async fn last_sent(&self, key: &DedupKey) -> Option<DateTime<Utc>> {
        let entries = self.entries.read().await;
        entries.get(key).and_then(Entry::sent_at)
    }
}
