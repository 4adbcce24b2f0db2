//! API endpoint integration tests

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use telegram_driver::api::{self, ApiState};
use telegram_driver::{IncomingMessage, PeerId, WebhookConfig};
use tokio::sync::mpsc;
use tower::ServiceExt;

mod common;
use common::{CALLBACK_QUERY, PHOTO_MESSAGE, TEXT_MESSAGE, recording_transport, test_config};

fn webhook_config() -> WebhookConfig {
    WebhookConfig {
        secret: None,
        debug_updates: true,
        typing_indicator: false,
    }
}

/// Build a test router with an inbox attached
fn build_test_router(webhook: WebhookConfig) -> (axum::Router, mpsc::Receiver<IncomingMessage>) {
    let (tx, rx) = mpsc::channel(8);
    let state = ApiState::new(test_config(), webhook).with_inbox(tx);
    (api::router(Arc::new(state)), rx)
}

fn webhook_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/webhooks/telegram")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _rx) = build_test_router(webhook_config());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["driver"], "Telegram");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_text_message_is_forwarded() {
    let (app, mut rx) = build_test_router(webhook_config());

    let response = app.oneshot(webhook_request(TEXT_MESSAGE)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["matched"], true);

    let message = rx.try_recv().unwrap();
    assert_eq!(message.text.as_deref(), Some("hi"));
    assert_eq!(message.sender_id, Some(PeerId::Numeric(42)));
    assert_eq!(message.recipient_id, Some(PeerId::Numeric(99)));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_callback_query_is_forwarded() {
    let (app, mut rx) = build_test_router(webhook_config());

    let response = app.oneshot(webhook_request(CALLBACK_QUERY)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let message = rx.try_recv().unwrap();
    assert_eq!(message.text.as_deref(), Some("YES"));
    assert_eq!(message.recipient_id, Some(PeerId::Numeric(55)));
}

#[tokio::test]
async fn test_unclaimed_updates_are_acknowledged() {
    for body in [PHOTO_MESSAGE, "{}", "garbage"] {
        let (app, mut rx) = build_test_router(webhook_config());

        let response = app.oneshot(webhook_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "body {body}");

        let json = json_body(response).await;
        assert_eq!(json["ok"], true);
        assert_eq!(json["matched"], false);
        assert!(rx.try_recv().is_err(), "body {body}");
    }
}

#[tokio::test]
async fn test_secret_mismatch_is_forbidden() {
    let (app, mut rx) = build_test_router(WebhookConfig {
        secret: Some("s3cret".to_string()),
        ..webhook_config()
    });

    let response = app.clone().oneshot(webhook_request(TEXT_MESSAGE)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["ok"], false);
    assert!(rx.try_recv().is_err());

    let mut request = webhook_request(TEXT_MESSAGE);
    request.headers_mut().insert(
        "x-telegram-bot-api-secret-token",
        "s3cret".parse().unwrap(),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(rx.try_recv().is_ok());
}

#[tokio::test]
async fn test_duplicate_update_is_dropped() {
    let (app, mut rx) = build_test_router(webhook_config());

    let first = app.clone().oneshot(webhook_request(TEXT_MESSAGE)).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let second = app.oneshot(webhook_request(TEXT_MESSAGE)).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(json_body(second).await["matched"], true);

    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_full_inbox_does_not_fail_webhook() {
    let (tx, _rx) = mpsc::channel(1);
    tx.try_send(IncomingMessage {
        text: None,
        sender_id: None,
        recipient_id: None,
        raw_payload: None,
    })
    .unwrap();
    let state = ApiState::new(test_config(), webhook_config()).with_inbox(tx);
    let app = api::router(Arc::new(state));

    let response = app.oneshot(webhook_request(TEXT_MESSAGE)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_typing_indicator_is_sent() {
    let (recorder, transport) = recording_transport();
    let webhook = WebhookConfig {
        typing_indicator: true,
        ..webhook_config()
    };
    let state = ApiState::new(test_config(), webhook).with_transport(transport);
    let app = api::router(Arc::new(state));

    let response = app.oneshot(webhook_request(TEXT_MESSAGE)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The indicator is sent from a background task
    for _ in 0..50 {
        if !recorder.sent().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let sent = recorder.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].url, "https://api.telegram.org/botT/sendChatAction");
    assert_eq!(sent[0].params["chat_id"], 99);
}
