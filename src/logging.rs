//! Tracing setup: console output plus a size-rotated log file

use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::PathBuf,
};

use chrono::Local;
use tracing::{Event, Subscriber, level_filters::LevelFilter};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{FmtContext, FormatEvent, FormatFields, format::Writer},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::result::{BotError, Result};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory for the log file, `None` disables file logging
    pub log_dir: Option<PathBuf>,
    pub file_name: String,
    pub file_level: LevelFilter,
    /// `EnvFilter` directive for the console
    pub console_filter: String,
    /// Size at which the log file is rolled over
    pub max_bytes: u64,
    /// Number of rolled files kept next to the active one
    pub max_backups: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: Some(PathBuf::from(".")),
            file_name: "homework_bot.log".into(),
            file_level: LevelFilter::DEBUG,
            console_filter: "info".into(),
            max_bytes: 20_000_000,
            max_backups: 2,
        }
    }
}

impl LoggingConfig {
    /// Defaults overridden by `HOMEWORK_BOT_LOG` (console filter) and
    /// `HOMEWORK_BOT_LOG_DIR` (log file directory)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(filter) = std::env::var("HOMEWORK_BOT_LOG") {
            config.console_filter = filter;
        }

        if let Ok(dir) = std::env::var("HOMEWORK_BOT_LOG_DIR") {
            config.log_dir = Some(PathBuf::from(dir));
        }

        config
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process.
pub fn init_logging(config: LoggingConfig) -> Result<Option<WorkerGuard>> {
    let console_filter =
        EnvFilter::try_new(&config.console_filter).map_err(BotError::logging_error)?;
    let console = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_line_number(true)
        .with_filter(console_filter);

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            fs::create_dir_all(dir).map_err(BotError::logging_error)?;
            let file = RotatingFile::open(
                dir.join(&config.file_name),
                config.max_bytes,
                config.max_backups,
            )
            .map_err(BotError::logging_error)?;

            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .event_format(LineFormat)
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(config.file_level);
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(BotError::logging_error)?;

    Ok(guard)
}

/// `<line> - <LEVEL> - <message> - <span or target> - <timestamp>`
#[derive(Debug, Default, Clone, Copy)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        write!(writer, "{} - {} - ", meta.line().unwrap_or(0), meta.level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;

        let origin = ctx
            .lookup_current()
            .map(|span| span.name())
            .unwrap_or_else(|| meta.target());
        writeln!(
            writer,
            " - {} - {}",
            origin,
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f")
        )
    }
}

/// Append-only file that rolls over to `name.1`, `name.2`, ... once it would
/// grow past `max_bytes`. The oldest backup beyond `max_backups` is dropped.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    max_backups: usize,
    file: File,
    written: u64,
}

impl RotatingFile {
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, max_backups: usize) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();

        Ok(Self { path, max_bytes, max_backups, file, written })
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        for index in (1..self.max_backups).rev() {
            let from = self.backup_path(index);
            if from.exists() {
                fs::rename(&from, self.backup_path(index + 1))?;
            }
        }
        fs::rename(&self.path, self.backup_path(1))?;

        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }

    fn should_rotate(&self, incoming: usize) -> bool {
        // A zero limit or zero backups means never roll over.
        self.max_bytes > 0
            && self.max_backups > 0
            && self.written > 0
            && self.written + incoming as u64 > self.max_bytes
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.should_rotate(buf.len()) {
            self.rotate()?;
        }
        let written = self.file.write(buf)?;
        self.written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
