//! Poll loop for homework status changes

use std::{future::Future, time::Duration};

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument};

use super::{
    api::HomeworkSource, config::PollingConfig, error::ClientError, service::HomeworkService,
    telegram::MessageSender,
};
use crate::{
    domain::{HomeworkStatus, StatusUpdate},
    event::CycleOutcome,
    notice_service::Notifier,
};

/// Time source and sleep primitive for the poll loop
pub trait Clock: Send + Sync {
    /// Current Unix timestamp in seconds
    fn now(&self) -> i64;

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Wall clock backed by chrono and the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Polls the homework API and relays status changes to the chat
///
/// Owns all loop state: the `from_date` cursor, the last notified status and
/// the last reported failure. One cycle runs to completion before the next
/// one starts.
#[derive(Debug)]
pub struct HomeworkPoller<A, S, C = SystemClock> {
    service: HomeworkService<A>,
    notifier: Notifier<S>,
    clock: C,
    config: PollingConfig,
    cursor: i64,
    last_status: Option<HomeworkStatus>,
    last_error: Option<String>,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl<A, S, C> HomeworkPoller<A, S, C>
where
    A: HomeworkSource,
    S: MessageSender,
    C: Clock,
{
    /// Create a new poller with the cursor set to the current time
    pub fn new(
        service: HomeworkService<A>,
        notifier: Notifier<S>,
        clock: C,
        config: PollingConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let cursor = clock.now();

        Self {
            service,
            notifier,
            clock,
            config,
            cursor,
            last_status: None,
            last_error: None,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Run cycles until a shutdown signal arrives
    #[instrument(name = "poller", skip(self))]
    pub async fn start(mut self) {
        info!(
            interval = ?self.interval(),
            cursor = self.cursor,
            "Starting homework poller"
        );

        let mut shutdown_rx =
            std::mem::replace(&mut self.shutdown_rx, self.shutdown_tx.subscribe());

        loop {
            tokio::select! {
                outcome = self.tick() => {
                    debug!(
                        outcome = outcome.variant_name(),
                        cursor = self.cursor(),
                        last_status = ?self.last_status(),
                        has_error = self.last_error().is_some(),
                        "Cycle finished"
                    );
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutting down homework poller");
                    break;
                }
            }
        }
    }

    /// Get a shutdown sender for external shutdown control
    pub fn shutdown_sender(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// One full cycle: check, notify, then wait out the interval.
    ///
    /// The wait and cursor refresh happen whatever the cycle outcome was.
    pub async fn tick(&mut self) -> CycleOutcome {
        let outcome = self.run_cycle().await;
        self.wait().await;
        outcome
    }

    /// Check for a status change and notify, without waiting afterwards
    #[instrument(name = "poll_cycle", skip(self), fields(cursor = self.cursor))]
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        match self.service.check(self.cursor).await {
            Ok(None) => CycleOutcome::Idle,
            Ok(Some(update)) => self.handle_update(update).await,
            Err(e) => self.handle_failure(e).await,
        }
    }

    async fn handle_update(&mut self, update: StatusUpdate) -> CycleOutcome {
        if self.last_status == Some(update.status) {
            debug!(status = %update.status, "Homework status unchanged");
            return CycleOutcome::Unchanged(update.status);
        }

        self.notifier.notify(&update.message).await;
        self.last_status = Some(update.status);
        info!(
            homework = %update.homework_name,
            status = %update.status,
            "Homework status changed and was sent to the chat"
        );
        CycleOutcome::Notified(update.status)
    }

    async fn handle_failure(&mut self, e: ClientError) -> CycleOutcome {
        let message = format!("Сбой в работе программы: {e}");
        error!(error = %e, "Poll cycle failed");

        if self.last_error.as_deref() == Some(message.as_str()) {
            debug!("Failure already reported, not resending");
            return CycleOutcome::FailureSuppressed(message);
        }

        self.notifier.notify(&message).await;
        self.last_error = Some(message.clone());
        CycleOutcome::FailureReported(message)
    }

    async fn wait(&mut self) {
        debug!(interval = ?self.config.interval, "Waiting for next cycle");
        self.clock.sleep(self.config.interval).await;
        self.cursor = self.clock.now();
        debug!(cursor = self.cursor, "Wait finished");
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn last_status(&self) -> Option<HomeworkStatus> {
        self.last_status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
