//! In-memory fakes shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use tokio::sync::{Notify, Semaphore};
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
    subscriber::DefaultGuard,
};
use tracing_subscriber::{Layer, layer::Context, prelude::*};

use crate::application::services::{
    clock::{Clock, Delay},
    event_bus::EventBus,
    provider::{DeliveryError, DeliveryResult, SmsProvider},
};
use crate::domain::{events::SmsSentEvent, models::OutboundSms};

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// Provider that replays scripted results and records every message it sees.
/// Once the script runs out it reports a first-attempt delivery.
#[derive(Default)]
pub struct RecordingProvider {
    script: Mutex<VecDeque<Result<DeliveryResult, String>>>,
    calls: Mutex<Vec<OutboundSms>>,
    entered: Notify,
    gate: Option<Arc<Semaphore>>,
    panics: AtomicU32,
}

impl RecordingProvider {
    pub fn delivering() -> Self {
        Self::default()
    }

    pub fn exhausting(attempts: u32) -> Self {
        Self::scripted(vec![Ok(DeliveryResult::Exhausted { attempts })])
    }

    pub fn erroring(message: &str) -> Self {
        Self::scripted(vec![Err(message.to_string())])
    }

    pub fn scripted(script: Vec<Result<DeliveryResult, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    /// Each call blocks until `gate` has a permit.
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    /// The first call panics mid-delivery; later calls deliver.
    pub fn panicking_once() -> Self {
        Self {
            panics: AtomicU32::new(1),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<OutboundSms> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub async fn wait_until_called(&self) {
        self.entered.notified().await;
    }
}

#[async_trait]
impl SmsProvider for RecordingProvider {
    async fn send(&self, message: &OutboundSms) -> Result<DeliveryResult, DeliveryError> {
        self.calls.lock().unwrap().push(message.clone());
        self.entered.notify_one();

        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await;
        }

        let panics_left = self
            .panics
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if panics_left.is_ok() {
            panic!("provider blew up");
        }

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(result)) => Ok(result),
            Some(Err(reason)) => Err(DeliveryError::Other(anyhow::anyhow!(reason))),
            None => Ok(DeliveryResult::Delivered { attempts: 1 }),
        }
    }
}

#[derive(Default)]
pub struct RecordingBus {
    published: Mutex<Vec<SmsSentEvent>>,
    attempts: Mutex<usize>,
    fail: bool,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<SmsSentEvent> {
        self.published.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl EventBus for RecordingBus {
    async fn publish(&self, event: SmsSentEvent) -> anyhow::Result<()> {
        *self.attempts.lock().unwrap() += 1;
        if self.fail {
            anyhow::bail!("event bus unavailable");
        }
        self.published.lock().unwrap().push(event);
        Ok(())
    }
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Records requested pauses and returns immediately.
#[derive(Default)]
pub struct RecordingDelay {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn wait(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

/// Collects the level and message of every event emitted on the current
/// thread while the returned guard is alive.
#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl LogCapture {
    pub fn install() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn count(&self, level: Level) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }

    pub fn messages(&self, level: Level) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }
}
