use crate::modules::dispatch::controller::post_event;
use crate::state::AppState;
use axum::{Router, routing::post};

pub fn init_events_router() -> Router<AppState> {
    Router::new().route("/", post(post_event))
}
