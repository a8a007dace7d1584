use crate::modules::telegram::controller::telegram_webhook;
use crate::state::AppState;
use axum::{Router, routing::post};

pub fn init_telegram_router() -> Router<AppState> {
    Router::new().route("/webhook", post(telegram_webhook))
}
