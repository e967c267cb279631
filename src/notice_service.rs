use tracing::{error, info, instrument};

use crate::client::telegram::MessageSender;

/// Delivers notifications to the chat without ever failing the caller.
///
/// Delivery problems are logged and dropped so a flaky bot API cannot stall
/// the poll loop.
#[derive(Debug)]
pub struct Notifier<S> {
    sender: S,
}

impl<S: MessageSender> Notifier<S> {
    pub fn new(sender: S) -> Self {
        Self { sender }
    }

    #[instrument(name = "notify", skip_all)]
    pub async fn notify(&self, message: &str) {
        match self.sender.send_message(message).await {
            Ok(()) => info!("Notification sent"),
            Err(e) => error!(error = %e, "Failed to deliver notification"),
        }
    }
}
