use crate::messenger::deliver;
use crate::modules::dispatch::DispatchService;
use crate::modules::telegram::client::TelegramClient;
use crate::modules::telegram::model::Update;
use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use tutorbot_core::AppError;

pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Pause after a failed `getUpdates` before polling again.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Dispatches one update and delivers the replies.
pub async fn handle_update(state: &AppState, update: Update) {
    let update_id = update.update_id;

    if let (Some(id), Some(client)) = (update.callback_id(), state.telegram.as_ref()) {
        if let Err(e) = client.answer_callback_query(id).await {
            warn!(update_id, error = %e, "Failed to answer callback query");
        }
    }

    let Some(event) = update.into_event() else {
        debug!(update_id, "Update ignored");
        return;
    };

    let messages = DispatchService::process(state, &event).await;
    deliver(state.messenger.as_ref(), &messages).await;
}

#[instrument(skip_all, fields(update_id = update.update_id))]
pub async fn telegram_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<Update>,
) -> Result<StatusCode, AppError> {
    if let Some(expected) = state.bot_config.webhook_secret.as_deref() {
        let provided = headers
            .get(SECRET_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());
        if provided != Some(expected) {
            return Err(AppError::unauthorized(anyhow::anyhow!(
                "Invalid webhook secret token"
            )));
        }
    }

    handle_update(&state, update).await;
    Ok(StatusCode::OK)
}

/// Long-polling loop. Runs until the task is dropped.
pub async fn run_polling(state: AppState, client: TelegramClient) {
    if let Err(e) = client.delete_webhook().await {
        warn!(error = %e, "Failed to delete webhook before polling");
    }
    info!(timeout = client.config().poll_timeout_seconds, "Polling for updates");

    let mut offset = 0;
    loop {
        let updates = match client.get_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!(error = %e, "getUpdates failed");
                tokio::time::sleep(POLL_RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            handle_update(&state, update).await;
        }
    }
}
