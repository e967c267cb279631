use std::fmt;

use compact_str::CompactString;
use serde_json::Value;

use crate::client::error::{ClientError, Result};

/// Review status codes reported by the homework API, with the verdict text
/// shown to the user for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub const ALL: [HomeworkStatus; 3] = [Self::Approved, Self::Reviewing, Self::Rejected];

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    pub fn verdict(self) -> &'static str {
        match self {
            Self::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Self::Reviewing => "Работа взята на проверку ревьюером.",
            Self::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A rendered status change for a single homework
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub homework_name: CompactString,
    pub status: HomeworkStatus,
    pub message: String,
}

/// Pulls the `homeworks` list out of a decoded API response.
///
/// An empty list is a valid answer: nothing changed since the cursor.
pub fn extract_homeworks(response: &Value) -> Result<&[Value]> {
    let Value::Object(map) = response else {
        return Err(ClientError::shape("ответ API не является словарём"));
    };

    match map.get("homeworks") {
        None => Err(ClientError::missing_key("homeworks")),
        Some(Value::Array(homeworks)) => Ok(homeworks),
        Some(_) => Err(ClientError::shape("homeworks не является списком")),
    }
}

/// Renders the notification text for one homework record.
///
/// Expects the full record, not just its status value.
pub fn parse_status(homework: &Value) -> Result<StatusUpdate> {
    let Value::Object(record) = homework else {
        return Err(ClientError::shape("запись о домашней работе не является словарём"));
    };

    let status = record
        .get("status")
        .ok_or(ClientError::missing_key("status"))?;
    let homework_name = record
        .get("homework_name")
        .ok_or(ClientError::missing_key("homework_name"))?;

    let Value::String(homework_name) = homework_name else {
        return Err(ClientError::shape("homework_name не является строкой"));
    };
    let Value::String(code) = status else {
        return Err(ClientError::shape("status не является строкой"));
    };

    let status =
        HomeworkStatus::from_code(code).ok_or_else(|| ClientError::unknown_status(code.as_str()))?;

    Ok(StatusUpdate {
        homework_name: homework_name.as_str().into(),
        status,
        message: format!(
            "Изменился статус проверки работы \"{homework_name}\" на {}",
            status.verdict()
        ),
    })
}
