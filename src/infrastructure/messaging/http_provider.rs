use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url, header::CONTENT_TYPE};
use thiserror::Error;
use tracing::debug;

use crate::{
    application::services::{
        clock::Delay,
        provider::{DeliveryError, DeliveryResult, SmsProvider},
        retry::{RetryConfig, RetryOutcome, RetryPolicy},
    },
    domain::models::OutboundSms,
};

pub const API_KEY_HEADER: &str = "ApiKey";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub url: Url,
    pub api_key: String,
    pub max_retry_attempts: u32,
    pub delay_between_retries: Duration,
    /// Upper bound on a single POST, connect included.
    pub request_timeout: Duration,
}

#[derive(Debug, Error)]
enum AttemptError {
    #[error("refusing to send an sms without phone number or text")]
    InvalidMessage,
    #[error("provider responded with {0}")]
    Status(StatusCode),
    #[error("request to provider failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Delivers SMS to the third-party provider over HTTP.
pub struct HttpSmsProvider {
    http: Client,
    config: ProviderConfig,
    retry: RetryPolicy,
}

impl HttpSmsProvider {
    pub fn new(config: ProviderConfig, delay: Arc<dyn Delay>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent("sms-service/provider")
            .timeout(config.request_timeout)
            .build()?;
        let retry = RetryPolicy::new(
            RetryConfig {
                max_attempts: config.max_retry_attempts,
                delay: config.delay_between_retries,
            },
            delay,
        );

        Ok(Self {
            http,
            config,
            retry,
        })
    }

    async fn post(&self, message: &OutboundSms, body: &[u8]) -> Result<(), AttemptError> {
        if message.phone_number.is_empty() || message.sms_text.is_empty() {
            return Err(AttemptError::InvalidMessage);
        }

        let response = self
            .http
            .post(self.config.url.clone())
            .header(API_KEY_HEADER, &self.config.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(AttemptError::Status(status))
        }
    }
}

#[async_trait]
impl SmsProvider for HttpSmsProvider {
    async fn send(&self, message: &OutboundSms) -> Result<DeliveryResult, DeliveryError> {
        let body = serde_json::to_vec(message)?;

        let outcome = self
            .retry
            .run(|attempt| {
                debug!(attempt, url = %self.config.url, "posting sms to provider");
                self.post(message, &body)
            })
            .await;

        Ok(match outcome {
            RetryOutcome::Succeeded { attempts, .. } => DeliveryResult::Delivered { attempts },
            RetryOutcome::Exhausted { attempts } => DeliveryResult::Exhausted { attempts },
        })
    }
}
