//! Telegram webhook handler

mod dedup;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError};

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use serde::Serialize;
use tokio::sync::mpsc::error::TrySendError;

pub use self::dedup::UpdateDedup;
use crate::api::ApiState;
use crate::driver::{Driver, IncomingMessage, TelegramDriver};

/// Header Telegram uses to echo the webhook secret
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Telegram webhook response
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<bool>,
}

impl WebhookResponse {
    const fn forbidden() -> Self {
        Self {
            ok: false,
            matched: None,
        }
    }

    const fn handled(matched: bool) -> Self {
        Self {
            ok: true,
            matched: Some(matched),
        }
    }
}

/// Handle an incoming Telegram update
///
/// Always answers quickly: Telegram retries slow or failing webhooks, so
/// unclaimed updates still get `200` and outbound calls run in the background.
#[allow(clippy::unused_async)]
pub async fn handle_update(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<WebhookResponse>) {
    if let Some(expected) = state.webhook.secret.as_deref() {
        let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if provided != Some(expected) {
            tracing::warn!("telegram webhook secret mismatch");
            return (StatusCode::FORBIDDEN, Json(WebhookResponse::forbidden()));
        }
    }

    if state.webhook.debug_updates {
        tracing::debug!(raw = %String::from_utf8_lossy(&body), "telegram raw update");
    }

    let driver = TelegramDriver::from_request(&body, query, Arc::clone(&state.driver_config));

    let verdict = driver.verdict();
    if !verdict.is_accepted() {
        tracing::debug!(%verdict, "telegram update not claimed");
        return (StatusCode::OK, Json(WebhookResponse::handled(false)));
    }

    // Accepted updates always carry an update_id
    if let Some(update_id) = driver.update_id().map(ToString::to_string) {
        let mut dedup = state.dedup.lock().unwrap_or_else(PoisonError::into_inner);
        if dedup.is_duplicate(&update_id) {
            tracing::debug!(update_id = %update_id, "duplicate telegram update, skipping");
            return (StatusCode::OK, Json(WebhookResponse::handled(true)));
        }
    }

    let messages = driver.messages();
    tracing::debug!(
        update_id = ?driver.update_id(),
        count = messages.len(),
        "received telegram update"
    );

    if state.webhook.typing_indicator {
        if let Some(transport) = state.transport.clone() {
            let driver = driver.clone();
            let pending = messages.clone();
            tokio::spawn(async move {
                for message in &pending {
                    if let Err(e) = driver.types(message, transport.as_ref()).await {
                        tracing::warn!(error = %e, "failed to send typing indicator");
                    }
                }
            });
        }
    }

    forward(&state, messages);

    (StatusCode::OK, Json(WebhookResponse::handled(true)))
}

/// Hand messages to the framework inbox without blocking the webhook
fn forward(state: &ApiState, messages: Vec<IncomingMessage>) {
    let Some(inbox) = state.inbox.as_ref() else {
        return;
    };

    for message in messages {
        match inbox.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => tracing::warn!("inbox full, dropping telegram message"),
            Err(TrySendError::Closed(_)) => tracing::warn!("inbox closed, dropping telegram message"),
        }
    }
}
