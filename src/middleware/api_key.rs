use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tutorbot_core::AppError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Rejects `/api` requests lacking the configured key. With no key
/// configured every request passes.
pub async fn require_api_key(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(expected) = state.server_config.api_key.as_deref() else {
        return next.run(req).await;
    };

    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if provided == Some(expected) {
        next.run(req).await
    } else {
        AppError::unauthorized(anyhow::anyhow!("Missing or invalid API key")).into_response()
    }
}
