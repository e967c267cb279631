use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use crate::{
    client::{HomeworkPoller, HomeworkService, PracticumApi, SystemClock, TelegramBot},
    config::{BotSettings, Credentials},
    logging::{LoggingConfig, init_logging},
    notice_service::Notifier,
    result::Result,
};

pub type Poller = HomeworkPoller<PracticumApi, TelegramBot, SystemClock>;

pub fn initialize_logging(settings: &BotSettings) -> Result<Option<WorkerGuard>> {
    let mut logging_config = LoggingConfig::from_env();

    if let Some(dir) = &settings.log_dir {
        logging_config.log_dir = Some(dir.clone());
    }

    // Override with config if specified
    if let Some(log_level) = &settings.log_level {
        // Disable file logging if set to "Off"
        if log_level.eq_ignore_ascii_case("off") {
            logging_config.log_dir = None;
        } else if let Ok(level) = log_level.parse() {
            logging_config.file_level = level;
        }
    }

    init_logging(logging_config)
}

/// Build the API client, bot client and poller from validated settings.
///
/// Makes no network calls.
pub fn create_poller(
    settings: &BotSettings,
    credentials: &Credentials,
    debug: bool,
) -> Result<Poller> {
    let client_config = settings
        .client_config(credentials)
        .with_debug_logging(debug);
    let polling = client_config.polling.clone();

    let api = PracticumApi::new(client_config)?;
    let bot = TelegramBot::new(settings.telegram_config(credentials))?;

    info!(
        endpoint = %api.config().endpoint,
        chat_id = %bot.chat_id(),
        interval = ?polling.interval,
        "Clients configured"
    );

    Ok(HomeworkPoller::new(
        HomeworkService::new(api),
        Notifier::new(bot),
        SystemClock,
        polling,
    ))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{client::ClientError, id::ChatId, result::BotError};

    fn credentials() -> Credentials {
        Credentials {
            practicum_token: "y0_token".into(),
            telegram_token: "123:abc".into(),
            chat_id: ChatId::new("42"),
        }
    }

    #[test]
    fn builds_poller_from_defaults() {
        let poller = create_poller(&BotSettings::default(), &credentials(), false).unwrap();
        assert_eq!(poller.last_status(), None);
        assert_eq!(poller.last_error(), None);
        assert!(poller.cursor() > 0);
    }

    #[test]
    fn rejects_invalid_endpoint() {
        let settings = BotSettings { endpoint: "not a url".into(), ..Default::default() };
        let err = create_poller(&settings, &credentials(), false).unwrap_err();
        assert!(matches!(
            err,
            BotError::Client(ClientError::ConfigValidation { field: "endpoint", .. })
        ));
    }

    #[test]
    fn rejects_zero_interval() {
        let settings = BotSettings { poll_interval_secs: 0, ..Default::default() };
        assert!(create_poller(&settings, &credentials(), false).is_err());

        let settings = BotSettings { poll_interval_secs: 1, ..Default::default() };
        let poller = create_poller(&settings, &credentials(), false).unwrap();
        assert_eq!(poller.interval(), Duration::from_secs(1));
    }
}
