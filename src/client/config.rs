//! Configuration for the homework API and Telegram clients

use std::{path::PathBuf, time::Duration};

use compact_str::CompactString;

use super::error::{ClientError, Result};
use crate::id::ChatId;

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Main configuration for the homework API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Homework statuses endpoint
    pub endpoint: CompactString,
    /// OAuth token for the homework API
    pub practicum_token: CompactString,
    /// Polling configuration
    pub polling: PollingConfig,
    /// Request configuration
    pub request: RequestConfig,
    /// Debug configuration
    pub debug: DebugConfig,
}

/// Polling interval configuration
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Pause between the end of one cycle and the start of the next
    pub interval: Duration,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Request timeout
    pub timeout: Duration,
}

/// Debug configuration
#[derive(Debug, Clone)]
pub struct DebugConfig {
    /// Dump raw API responses to disk
    pub log_responses: bool,
    /// Directory for storing response dumps
    pub log_directory: Option<PathBuf>,
}

/// Configuration for the Telegram bot client
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_url: CompactString,
    pub bot_token: CompactString,
    pub chat_id: ChatId,
    pub timeout: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(600) }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30) }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_responses: false,
            log_directory: Some(PathBuf::from("homework-bot-responses")),
        }
    }
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(
        endpoint: impl Into<CompactString>,
        practicum_token: impl Into<CompactString>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            practicum_token: practicum_token.into(),
            polling: PollingConfig::default(),
            request: RequestConfig::default(),
            debug: DebugConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_url("endpoint", &self.endpoint)?;

        if self.practicum_token.trim().is_empty() {
            return Err(ClientError::config_validation(
                "practicum_token",
                "Practicum token cannot be empty",
            ));
        }

        if self.request.timeout.is_zero() {
            return Err(ClientError::config_validation(
                "timeout",
                "Timeout must be greater than zero",
            ));
        }

        if self.polling.interval.is_zero() {
            return Err(ClientError::config_validation(
                "poll_interval",
                "Poll interval must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Set polling configuration
    pub fn with_polling(mut self, polling: PollingConfig) -> Self {
        self.polling = polling;
        self
    }

    /// Set request configuration
    pub fn with_request(mut self, request: RequestConfig) -> Self {
        self.request = request;
        self
    }

    /// Enable response dumps
    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug.log_responses = enabled;
        self
    }
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<CompactString>, chat_id: ChatId) -> Self {
        Self {
            api_url: DEFAULT_TELEGRAM_API_URL.into(),
            bot_token: bot_token.into(),
            chat_id,
            timeout: RequestConfig::default().timeout,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_url("telegram_api_url", &self.api_url)?;

        if self.bot_token.trim().is_empty() {
            return Err(ClientError::config_validation(
                "telegram_token",
                "Telegram token cannot be empty",
            ));
        }

        if self.timeout.is_zero() {
            return Err(ClientError::config_validation(
                "timeout",
                "Timeout must be greater than zero",
            ));
        }

        Ok(())
    }

    pub fn with_api_url(mut self, api_url: impl Into<CompactString>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn validate_url(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ClientError::config_validation(field, "URL cannot be empty"));
    }

    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(ClientError::config_validation(
            field,
            "URL must start with http:// or https://",
        ));
    }

    if url::Url::parse(value).is_err() {
        return Err(ClientError::config_validation(field, "URL is not a valid URL format"));
    }

    Ok(())
}
