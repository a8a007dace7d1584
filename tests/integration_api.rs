use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use tutorbot::router::init_router;
use tutorbot::state::AppState;
use tutorbot::texts;
use tutorbot_config::BotConfig;

fn test_state() -> AppState {
    AppState::in_memory(BotConfig {
        admin_chat_id: Some(-1001),
        ..BotConfig::default()
    })
}

fn event(chat_id: i64, username: &str, kind: &str, payload: Value) -> Value {
    json!({
        "chat_id": chat_id,
        "sender": { "user_id": chat_id, "username": username },
        "kind": kind,
        "payload": payload,
    })
}

async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = init_router(state.clone(), None)
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&test_state(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_teacher_registration_over_events_api() {
    let state = test_state();

    let contact = event(1, "alice", "shared_contact", json!({
        "first_name": "Alice",
        "phone_number": "+1"
    }));
    let (status, body) = send(&state, post_json("/api/events", &contact)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"][0]["text"], texts::ROLE_PROMPT);
    assert_eq!(body["messages"][0]["keyboard"]["type"], "inline");

    let role = event(1, "alice", "button_press", json!("role_teacher"));
    send(&state, post_json("/api/events", &role)).await;

    let subject = event(1, "alice", "button_press", json!("subject_math"));
    let (status, body) = send(&state, post_json("/api/events", &subject)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"][0]["text"], texts::REGISTRATION_DONE);

    // Committed conversations hold no session.
    assert!(state.sessions.is_empty());

    let (status, body) = send(&state, get("/api/profiles/alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "teacher");
    assert_eq!(body["identity"], "alice");
    assert_eq!(body["subject"], "math");
    assert_eq!(body["first_name"], "Alice");
}

#[tokio::test]
async fn test_unknown_profile_is_404() {
    let (status, body) = send(&test_state(), get("/api/profiles/nobody")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nobody"));
}

#[tokio::test]
async fn test_invalid_contact_is_rejected() {
    let contact = event(1, "alice", "shared_contact", json!({
        "first_name": "",
        "phone_number": "+1"
    }));
    let (status, body) = send(&test_state(), post_json("/api/events", &contact)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_api_key_guards_api_routes() {
    let mut state = test_state();
    state.server_config.api_key = Some("secret-key".into());

    let start = event(1, "alice", "command", json!("start"));
    let (status, _) = send(&state, post_json("/api/events", &start)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut request = post_json("/api/events", &start);
    request
        .headers_mut()
        .insert("x-api-key", "secret-key".parse().unwrap());
    let (status, body) = send(&state, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"][0]["text"], texts::WELCOME);

    let (status, _) = send(&state, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_webhook_checks_secret_and_dispatches() {
    let mut state = test_state();
    state.bot_config.webhook_secret = Some("hook-secret".into());

    let update = json!({
        "update_id": 10,
        "message": {
            "message_id": 1,
            "from": { "id": 77, "username": "gina" },
            "chat": { "id": 77 },
            "contact": { "phone_number": "+7", "first_name": "Gina" }
        }
    });

    let (status, _) = send(&state, post_json("/telegram/webhook", &update)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(state.sessions.is_empty());

    let mut request = post_json("/telegram/webhook", &update);
    request
        .headers_mut()
        .insert("x-telegram-bot-api-secret-token", "hook-secret".parse().unwrap());
    let (status, _) = send(&state, request).await;
    assert_eq!(status, StatusCode::OK);

    // Registration started: the conversation now holds a session.
    assert_eq!(state.sessions.len(), 1);
}
