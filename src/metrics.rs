//! Prometheus metrics: HTTP request instrumentation plus counters for
//! registrations, enrollment codes and tickets.
//!
//! Every helper is a no-op when `OBSERVABILITY_ENABLED` is `false` or `0`.

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tutorbot_models::{Role, Subject};

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}

/// Installs the Prometheus recorder and spawns its upkeep task.
///
/// Returns `Ok(None)` when observability is disabled.
pub fn init_metrics() -> Result<Option<PrometheusHandle>, BuildError> {
    if !is_observability_enabled() {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )?
        .install_recorder()?;

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Ok(Some(handle))
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    gauge!("http_requests_active").increment(1.0);
    let response = next.run(req).await;
    gauge!("http_requests_active").decrement(1.0);

    let status = response.status().as_u16().to_string();
    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status)
        .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(start.elapsed().as_secs_f64());

    response
}

/// `GET /metrics` in Prometheus text format.
pub fn metrics_router<S>(handle: PrometheusHandle) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

pub fn track_event(kind: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("bot_events_total", "kind" => kind).increment(1);
}

pub fn track_profile_registered(role: Role) {
    if !is_observability_enabled() {
        return;
    }
    counter!("profiles_registered_total", "role" => role.as_str()).increment(1);
}

pub fn track_code_issued(subject: Subject) {
    if !is_observability_enabled() {
        return;
    }
    counter!("enrollment_codes_issued_total", "subject" => subject.key()).increment(1);
}

/// `outcome` is `success` or the rejection kind.
pub fn track_code_redemption(outcome: &'static str, subject: Subject) {
    if !is_observability_enabled() {
        return;
    }
    counter!("enrollment_code_redemptions_total", "outcome" => outcome, "subject" => subject.key())
        .increment(1);
}

pub fn track_ticket_submitted() {
    if !is_observability_enabled() {
        return;
    }
    counter!("tickets_submitted_total").increment(1);
}

pub fn track_ticket_relayed() {
    if !is_observability_enabled() {
        return;
    }
    counter!("tickets_relayed_total").increment(1);
}

pub fn track_delivery_failure() {
    if !is_observability_enabled() {
        return;
    }
    counter!("message_delivery_failures_total").increment(1);
}
