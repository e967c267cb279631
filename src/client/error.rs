//! Error types for the homework API client

use std::error::Error as StdError;

use compact_str::{CompactString, format_compact};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Everything that can go wrong between issuing a poll request and rendering
/// a status message.
///
/// Display strings end up in the chat, so they are written for the user.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Failed to build the HTTP client
    #[error("HTTP client error: {0}")]
    Http(#[source] reqwest::Error),

    /// DNS, connect, timeout, or body read failure
    #[error("Сбой соединения с {endpoint}: {detail}")]
    Transport {
        endpoint: CompactString,
        /// `source` and its causes, without the request URL
        detail: CompactString,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status
    #[error("Ошибка доступа {code} к {endpoint}")]
    UpstreamStatus { code: u16, endpoint: CompactString },

    /// The body was not valid JSON
    #[error("Ответ API не является JSON ({endpoint}): {source}")]
    Decode {
        endpoint: CompactString,
        #[source]
        source: serde_json::Error,
    },

    /// A value had the wrong JSON type
    #[error("Некорректная структура ответа API: {0}")]
    Shape(CompactString),

    #[error("В ответе API нет ключа {key}")]
    MissingKey { key: &'static str },

    #[error("Неизвестный статус домашней работы: {code}")]
    UnknownStatus { code: CompactString },

    #[error("Invalid configuration: {field}: {message}")]
    ConfigValidation {
        field: &'static str,
        message: CompactString,
    },
}

impl ClientError {
    /// The request URL carries the poll cursor, so it is dropped to keep
    /// repeated failures textually identical.
    pub fn transport(endpoint: impl Into<CompactString>, source: reqwest::Error) -> Self {
        let source = source.without_url();
        Self::Transport { endpoint: endpoint.into(), detail: error_chain(&source), source }
    }

    pub fn upstream_status(code: u16, endpoint: impl Into<CompactString>) -> Self {
        Self::UpstreamStatus { code, endpoint: endpoint.into() }
    }

    pub fn decode(endpoint: impl Into<CompactString>, source: serde_json::Error) -> Self {
        Self::Decode { endpoint: endpoint.into(), source }
    }

    pub fn shape(message: impl Into<CompactString>) -> Self {
        Self::Shape(message.into())
    }

    pub fn missing_key(key: &'static str) -> Self {
        Self::MissingKey { key }
    }

    pub fn unknown_status(code: impl Into<CompactString>) -> Self {
        Self::UnknownStatus { code: code.into() }
    }

    pub fn config_validation(field: &'static str, message: impl Into<CompactString>) -> Self {
        Self::ConfigValidation { field, message: message.into() }
    }
}

/// Render an error and all of its causes as `outer: inner: root`.
///
/// reqwest's own message is generic ("error sending request"), the useful
/// part (timeout, refused connection, DNS) lives in the source chain.
pub(crate) fn error_chain(error: &dyn StdError) -> CompactString {
    let mut text = format_compact!("{error}");
    let mut cause = error.source();
    while let Some(inner) = cause {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        cause = inner.source();
    }
    text
}
