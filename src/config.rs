use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use compact_str::CompactString;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

use crate::{
    client::{
        ClientConfig, PollingConfig, RequestConfig, TelegramConfig,
        config::{DEFAULT_ENDPOINT, DEFAULT_TELEGRAM_API_URL},
    },
    id::ChatId,
    result::{BotError, Result},
};

pub const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Secrets read from the environment at startup
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub practicum_token: CompactString,
    pub telegram_token: CompactString,
    pub chat_id: ChatId,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads all three secrets through `lookup`.
    ///
    /// Blank values count as missing. Every missing variable is logged; the
    /// first one is returned.
    #[instrument(name = "check_tokens", skip_all)]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |name: &'static str| {
            let value = lookup(name).filter(|v| !v.trim().is_empty());
            if value.is_none() {
                error!(variable = name, "Required environment variable is missing");
            }
            value.ok_or(BotError::MissingCredential { name })
        };

        let practicum_token = read(PRACTICUM_TOKEN);
        let telegram_token = read(TELEGRAM_TOKEN);
        let chat_id = read(TELEGRAM_CHAT_ID);

        let practicum_token = practicum_token?;
        let telegram_token = telegram_token?;
        let chat_id = chat_id?
            .parse::<ChatId>()
            .map_err(|e| BotError::config_validation_error(TELEGRAM_CHAT_ID, e))?;

        Ok(Self {
            practicum_token: practicum_token.into(),
            telegram_token: telegram_token.into(),
            chat_id,
        })
    }
}

/// Non-secret settings, optionally loaded from a TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    pub endpoint: CompactString,
    pub telegram_api_url: CompactString,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<CompactString>,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.into(),
            poll_interval_secs: PollingConfig::default().interval.as_secs(),
            request_timeout_secs: RequestConfig::default().timeout.as_secs(),
            log_dir: None,
            log_level: None,
        }
    }
}

impl BotSettings {
    pub fn client_config(&self, credentials: &Credentials) -> ClientConfig {
        ClientConfig::new(self.endpoint.clone(), credentials.practicum_token.clone())
            .with_polling(PollingConfig { interval: Duration::from_secs(self.poll_interval_secs) })
            .with_request(RequestConfig { timeout: Duration::from_secs(self.request_timeout_secs) })
    }

    pub fn telegram_config(&self, credentials: &Credentials) -> TelegramConfig {
        TelegramConfig::new(credentials.telegram_token.clone(), credentials.chat_id.clone())
            .with_api_url(self.telegram_api_url.clone())
            .with_timeout(Duration::from_secs(self.request_timeout_secs))
    }
}

pub fn default_config_path() -> PathBuf {
    if let Some(dirs) = BaseDirs::new() {
        dirs.config_dir().join("homework-bot.toml")
    } else {
        PathBuf::from("homework-bot.toml")
    }
}

/// Load settings from an explicit path, or from the default path if present.
///
/// An explicit path must exist; a missing default file means built-in defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<BotSettings> {
    let path = match explicit {
        Some(path) if !path.exists() => {
            return Err(BotError::config_file_not_found(path.to_path_buf()));
        },
        Some(path) => path.to_path_buf(),
        None => {
            let path = default_config_path();
            if !path.exists() {
                return Ok(BotSettings::default());
            }
            path
        },
    };

    confy::load_path(&path).map_err(|e| BotError::config_load_error(path, e))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn lookup(vars: &HashMap<String, String>) -> impl Fn(&str) -> Option<String> + '_ {
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn all_credentials_present() {
        let vars = env(&[
            (PRACTICUM_TOKEN, "y0_practicum"),
            (TELEGRAM_TOKEN, "123:abc"),
            (TELEGRAM_CHAT_ID, "42"),
        ]);
        let credentials = Credentials::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(credentials.practicum_token, "y0_practicum");
        assert_eq!(credentials.chat_id, ChatId::new("42"));
    }

    #[test]
    fn any_missing_credential_fails() {
        let full = [
            (PRACTICUM_TOKEN, "y0_practicum"),
            (TELEGRAM_TOKEN, "123:abc"),
            (TELEGRAM_CHAT_ID, "42"),
        ];

        for skipped in 0..full.len() {
            let partial: Vec<_> = full
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skipped)
                .map(|(_, pair)| *pair)
                .collect();
            let vars = env(&partial);

            match Credentials::from_lookup(lookup(&vars)) {
                Err(BotError::MissingCredential { name }) => assert_eq!(name, full[skipped].0),
                other => panic!("expected missing credential, got {other:?}"),
            }
        }
    }

    #[test]
    fn blank_credentials_are_missing() {
        let vars = env(&[
            (PRACTICUM_TOKEN, "   "),
            (TELEGRAM_TOKEN, "123:abc"),
            (TELEGRAM_CHAT_ID, "42"),
        ]);
        assert!(matches!(
            Credentials::from_lookup(lookup(&vars)),
            Err(BotError::MissingCredential { name: PRACTICUM_TOKEN })
        ));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let credentials = Credentials {
            practicum_token: "y0_secret".into(),
            telegram_token: "123:secret".into(),
            chat_id: ChatId::new("42"),
        };
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("42"));
    }

    #[test]
    fn settings_build_client_configs() {
        let settings = BotSettings {
            poll_interval_secs: 60,
            request_timeout_secs: 5,
            ..Default::default()
        };
        let credentials = Credentials {
            practicum_token: "token".into(),
            telegram_token: "123:abc".into(),
            chat_id: ChatId::new("42"),
        };

        let client = settings.client_config(&credentials);
        assert_eq!(client.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(client.polling.interval, Duration::from_secs(60));
        assert_eq!(client.request.timeout, Duration::from_secs(5));

        let telegram = settings.telegram_config(&credentials);
        assert_eq!(telegram.api_url, DEFAULT_TELEGRAM_API_URL);
        assert_eq!(telegram.timeout, Duration::from_secs(5));
    }

    #[test]
    fn explicit_missing_config_file_is_an_error() {
        let path = std::env::temp_dir().join("homework-bot-does-not-exist.toml");
        assert!(matches!(
            load_settings(Some(&path)),
            Err(BotError::ConfigFileNotFound { .. })
        ));
    }

    #[test]
    fn partial_config_file_falls_back_to_defaults() {
        let dir =
            std::env::temp_dir().join(format!("homework-bot-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(&path, "poll_interval_secs = 120\n").unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.poll_interval_secs, 120);
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
