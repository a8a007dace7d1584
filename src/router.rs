use crate::logging::logging_middleware;
use crate::metrics::{metrics_middleware, metrics_router};
use crate::middleware::api_key::require_api_key;
use crate::modules::dispatch::router::init_events_router;
use crate::modules::profiles::router::init_profiles_router;
use crate::modules::telegram::router::init_telegram_router;
use crate::state::AppState;
use axum::{Json, Router, middleware, routing::get};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn init_router(state: AppState, metrics: Option<PrometheusHandle>) -> Router {
    let api = Router::new()
        .nest("/events", init_events_router())
        .nest("/profiles", init_profiles_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    let mut router = Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .nest("/telegram", init_telegram_router());

    if let Some(handle) = metrics {
        router = router.merge(metrics_router(handle));
    }

    router
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
