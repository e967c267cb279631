use std::{fmt, str::FromStr};

use compact_str::CompactString;
use serde::{Deserialize, Deserializer, Serialize};

/// Telegram chat identifier
///
/// Either a numeric id (`123456`, `-100123456` for groups) or a public
/// `@channelusername`. Kept as text since Telegram accepts both forms.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(transparent)]
pub struct ChatId {
    value: CompactString,
}

impl ChatId {
    pub fn new<S: Into<CompactString>>(id: S) -> Self {
        Self { value: id.into() }
    }
}

impl FromStr for ChatId {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("chat id cannot be empty");
        }
        Ok(ChatId::new(trimmed))
    }
}

impl<'de> Deserialize<'de> for ChatId {
    fn deserialize<D>(deserializer: D) -> Result<ChatId, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ChatIdVisitor;

        impl Visitor<'_> for ChatIdVisitor {
            type Value = ChatId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing a chat ID")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value.parse().map_err(E::custom)
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(ChatId::new(value.to_string()))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(ChatId::new(value.to_string()))
            }
        }

        deserializer.deserialize_any(ChatIdVisitor)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
