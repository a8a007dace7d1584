use crate::modules::dispatch::service::DispatchService;
use crate::state::AppState;
use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;
use tutorbot_core::AppError;
use tutorbot_models::{EventKind, InboundEvent, OutgoingMessage};
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub messages: Vec<OutgoingMessage>,
}

/// Feeds one transport-neutral event through the bot and returns the
/// replies instead of delivering them.
#[instrument(skip(state, event), fields(chat_id = %event.chat_id))]
pub async fn post_event(
    State(state): State<AppState>,
    Json(event): Json<InboundEvent>,
) -> Result<Json<EventResponse>, AppError> {
    if let EventKind::SharedContact(contact) = &event.kind {
        contact
            .validate()
            .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;
    }

    let messages = DispatchService::process(&state, &event).await;
    Ok(Json(EventResponse { messages }))
}
