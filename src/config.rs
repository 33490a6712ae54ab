use std::env::var;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use reqwest::Url;
use thiserror::Error;

use crate::{
    application::usecases::send_sms::DedupMode,
    infrastructure::messaging::{http_provider::ProviderConfig, jetstream::JetstreamConfig},
    telemetry::{LogFormat, LoggingConfig},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub provider: ProviderConfig,
    pub queue: JetstreamConfig,
    pub events_subject: Option<String>,
    pub dedup_mode: DedupMode,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn try_parse() -> Result<Config, ConfigError> {
        let _ = dotenv();
        Self::from_lookup(|name| var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let url = env.required("PROVIDER_URL")?;
        let url = Url::parse(&url).map_err(|err| ConfigError::Invalid {
            name: "PROVIDER_URL",
            reason: err.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                name: "PROVIDER_URL",
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let max_retry_attempts: u32 = env.parsed("PROVIDER_MAX_RETRY_ATTEMPTS", 3)?;
        if max_retry_attempts < 1 {
            return Err(ConfigError::Invalid {
                name: "PROVIDER_MAX_RETRY_ATTEMPTS",
                reason: "must be at least 1".to_string(),
            });
        }

        let provider = ProviderConfig {
            url,
            api_key: env.required("PROVIDER_API_KEY")?,
            max_retry_attempts,
            delay_between_retries: Duration::from_millis(
                env.parsed("PROVIDER_RETRY_DELAY_MS", 1000)?,
            ),
            request_timeout: Duration::from_millis(
                env.parsed("PROVIDER_REQUEST_TIMEOUT_MS", 30_000)?,
            ),
        };
        if provider.request_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                name: "PROVIDER_REQUEST_TIMEOUT_MS",
                reason: "must be greater than zero".to_string(),
            });
        }

        let queue = JetstreamConfig {
            url: env.or("NATS_URL", "nats://localhost:4222"),
            stream: env.or("QUEUE_STREAM", "SMS_COMMANDS"),
            subject: env.required("QUEUE_NAME")?,
            durable: env.or("QUEUE_DURABLE", "sms-service"),
            pull_batch: env.parsed("QUEUE_PULL_BATCH", 10)?,
            ack_wait_seconds: env.parsed("QUEUE_ACK_WAIT_SECONDS", 30)?,
        };

        let dedup_mode = match env.optional("DEDUP_MODE") {
            Some(value) => value
                .parse()
                .map_err(|reason| ConfigError::Invalid {
                    name: "DEDUP_MODE",
                    reason,
                })?,
            None => DedupMode::default(),
        };

        let logging = LoggingConfig {
            level: env.or("LOG_LEVEL", "info"),
            format: match env.optional("LOG_FORMAT").as_deref() {
                None | Some("plain") => LogFormat::Plain,
                Some("json") => LogFormat::Json,
                Some(other) => {
                    return Err(ConfigError::Invalid {
                        name: "LOG_FORMAT",
                        reason: format!("expected 'plain' or 'json', got '{other}'"),
                    });
                }
            },
        };

        Ok(Config {
            provider,
            queue,
            events_subject: env.optional("EVENTS_SUBJECT"),
            dedup_mode,
            http: HttpConfig {
                scheme: env.or("SCHEME", "http"),
                host: env.or("HOST", "localhost"),
                port: env.parsed("PORT", 8080)?,
            },
            logging,
        })
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Unset and blank are treated the same.
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn or(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            Some(value) => value.parse().map_err(|err: T::Err| ConfigError::Invalid {
                name,
                reason: err.to_string(),
            }),
            None => Ok(default),
        }
    }
}
