//! Homework API and Telegram client modules
//!
//! The API client, the bot client and the poll loop are split so each can be
//! swapped for a fake in tests.

pub mod api;
pub mod config;
pub mod error;
pub mod poller;
pub mod service;
pub mod telegram;

// Re-export main types for convenience
pub use api::PracticumApi;
pub use config::{ClientConfig, PollingConfig, RequestConfig, TelegramConfig};
pub use error::ClientError;
pub use poller::{HomeworkPoller, SystemClock};
pub use service::HomeworkService;
pub use telegram::TelegramBot;
