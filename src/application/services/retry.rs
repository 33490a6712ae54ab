//! Bounded retry with a fixed pause between attempts.
//!
//! There is no backoff growth: every retry waits the same configured delay,
//! and no delay follows the final attempt.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use crate::application::services::clock::Delay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T> {
    Succeeded { value: T, attempts: u32 },
    Exhausted { attempts: u32 },
}

pub struct RetryPolicy {
    config: RetryConfig,
    delay: Arc<dyn Delay>,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig, delay: Arc<dyn Delay>) -> Self {
        Self { config, delay }
    }

    pub fn config(&self) -> RetryConfig {
        self.config
    }

    /// Runs `operation` until it succeeds or `max_attempts` is used up. The
    /// closure receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> RetryOutcome<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.config.max_attempts;
        let mut attempts = 0;

        while attempts < max_attempts {
            let attempt = attempts + 1;
            match operation(attempt).await {
                Ok(value) => {
                    return RetryOutcome::Succeeded {
                        value,
                        attempts: attempt,
                    };
                }
                Err(err) => {
                    error!(attempt, max_attempts, error = %err, "delivery attempt failed");
                }
            }

            attempts = attempt;
            if attempts < max_attempts {
                self.delay.wait(self.config.delay).await;
            }
        }

        RetryOutcome::Exhausted { attempts }
    }
}
