//! Configuration module for environment variable parsing.
//!
//! The configuration is read once at process start and shared read-only
//! through [`crate::AppState`].

use std::env;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;
use url::Url;

/// Default public base URL of the Telegram Bot API.
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("environment variable {name} is not a valid URL: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Shared secret every management caller must present in `X-Api-Key`
    pub api_key: String,

    /// Public base URL of this service, used to build webhook callback URLs
    pub host: Url,

    /// Downstream endpoint receiving normalized inbound messages
    pub message_received_url: Url,

    /// Base URL of the Telegram Bot API
    pub telegram_api_base: Url,

    /// SQLite database file holding connector records
    pub database_path: String,

    /// Port for the web server to listen on
    pub port: u16,

    /// Timeout for the downstream relay call in milliseconds
    pub relay_timeout_ms: u64,

    /// Timeout for Telegram Bot API calls in milliseconds
    pub telegram_timeout_ms: u64,

    /// Human readable project name reported by the index endpoint
    pub project_name: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("host", &self.host.as_str())
            .field("message_received_url", &self.message_received_url.as_str())
            .field("telegram_api_base", &self.telegram_api_base.as_str())
            .field("database_path", &self.database_path)
            .field("port", &self.port)
            .field("relay_timeout_ms", &self.relay_timeout_ms)
            .field("telegram_timeout_ms", &self.telegram_timeout_ms)
            .field("project_name", &self.project_name)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            api_key: required("API_KEY")?,

            host: parse_url("HOST", &required("HOST")?)?,

            message_received_url: parse_url(
                "WEBHOOK_MESSAGE_RECEIVED",
                &required("WEBHOOK_MESSAGE_RECEIVED")?,
            )?,

            telegram_api_base: parse_url(
                "TELEGRAM_API_BASE",
                &env::var("TELEGRAM_API_BASE")
                    .unwrap_or_else(|_| DEFAULT_TELEGRAM_API_BASE.to_string()),
            )?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "telegram_connector.db".to_string()),

            port: parse_number("PORT", 8080),

            relay_timeout_ms: parse_number("RELAY_TIMEOUT_MS", 5000),

            telegram_timeout_ms: parse_number("TELEGRAM_TIMEOUT_MS", 10_000),

            project_name: env::var("PROJECT_NAME")
                .unwrap_or_else(|_| "Telegram Connector".to_string()),
        })
    }

    pub fn relay_timeout(&self) -> Duration {
        Duration::from_millis(self.relay_timeout_ms)
    }

    pub fn telegram_timeout(&self) -> Duration {
        Duration::from_millis(self.telegram_timeout_ms)
    }

    /// Build a configuration suitable for tests, pointing at fake hosts.
    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Config {
            api_key: "fake-api-key".to_string(),
            host: Url::parse("https://fake-host/dev").expect("static url"),
            message_received_url: Url::parse("https://fake-host/dev/webhook/message-received")
                .expect("static url"),
            telegram_api_base: Url::parse(DEFAULT_TELEGRAM_API_BASE).expect("static url"),
            database_path: ":memory:".to_string(),
            port: 0,
            relay_timeout_ms: 5000,
            telegram_timeout_ms: 10_000,
            project_name: "Telegram Connector".to_string(),
        }
    }
}

/// Read a variable that has no sensible default.
fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { name, source })
}

/// Parse a numeric variable, falling back to `default` when unset or invalid.
fn parse_number<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "config_invalid_number_using_default");
            default
        }
    }
}
