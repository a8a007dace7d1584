//! Outbound delivery collaborator.
//!
//! Handlers only produce [`OutgoingMessage`]s; a [`Messenger`] delivers them.
//! Delivery failures are logged here and never reach the handlers.

use crate::metrics::track_delivery_failure;
use async_trait::async_trait;
use tracing::{info, warn};
use tutorbot_models::OutgoingMessage;

#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(&self, message: &OutgoingMessage) -> anyhow::Result<()>;
}

/// Delivers messages in order, logging and skipping failures.
pub async fn deliver(messenger: &dyn Messenger, messages: &[OutgoingMessage]) {
    for message in messages {
        if let Err(e) = messenger.send_message(message).await {
            warn!(chat_id = %message.chat_id, error = %e, "Failed to deliver message");
            track_delivery_failure();
        }
    }
}

/// Writes messages to the log instead of sending them. Used when no bot
/// token is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMessenger;

#[async_trait]
impl Messenger for LogMessenger {
    async fn send_message(&self, message: &OutgoingMessage) -> anyhow::Result<()> {
        info!(chat_id = %message.chat_id, text = %message.text, "Outgoing message (not delivered)");
        Ok(())
    }
}
