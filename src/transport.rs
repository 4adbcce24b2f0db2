//! HTTP transport for outbound Bot API calls
//!
//! The driver only builds requests; a transport sends them. Tests swap in a
//! recording transport through the same trait.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::driver::OutboundRequest;
use crate::{Error, Result};

/// Request timeout for Bot API calls
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Sends outbound requests to the Bot API
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST the request parameters as JSON and return the API `result`
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API answers `ok: false`
    async fn post(&self, request: &OutboundRequest) -> Result<Value>;
}

/// Bot API response envelope
#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    result: Option<Value>,
    description: Option<String>,
}

impl TelegramResponse {
    fn into_result(self) -> Result<Value> {
        if self.ok {
            Ok(self.result.unwrap_or(Value::Null))
        } else {
            Err(Error::Api(
                self.description
                    .unwrap_or_else(|| "request failed without description".to_string()),
            ))
        }
    }
}

/// `reqwest`-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with its own client
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Wrap an existing client
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(&self, request: &OutboundRequest) -> Result<Value> {
        let endpoint = request.endpoint();

        let response = self
            .client
            .post(&request.url)
            .json(&request.params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // Error statuses still carry the envelope; fall back to the raw body
        let envelope: TelegramResponse = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => return Err(Error::Api(format!("{status} - {body}"))),
        };

        match envelope.into_result() {
            Ok(result) => {
                tracing::debug!(endpoint, "telegram api call succeeded");
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(endpoint, %status, error = %e, "telegram api call failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::config::DriverConfig;
    use crate::driver::PeerId;
    use crate::driver::outbound::{reply_request, typing_request};

    fn envelope(json: &str) -> TelegramResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn ok_envelope_yields_result() {
        let result = envelope(r#"{"ok": true, "result": {"message_id": 5}}"#).into_result().unwrap();
        assert_eq!(result["message_id"], 5);
    }

    #[test]
    fn ok_without_result_is_null() {
        let result = envelope(r#"{"ok": true}"#).into_result().unwrap();
        assert!(result.is_null());
    }

    /// Serve a fake Bot API on a random local port
    async fn fake_bot_api() -> String {
        async fn send_chat_action(Json(params): Json<Value>) -> Json<Value> {
            Json(json!({"ok": true, "result": params}))
        }

        async fn send_message() -> (StatusCode, Json<Value>) {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"ok": false, "error_code": 400, "description": "Bad Request: chat not found"})),
            )
        }

        let app = Router::new()
            .route("/botT/sendChatAction", post(send_chat_action))
            .route("/botT/sendMessage", post(send_message));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });
        format!("http://{addr}/bot")
    }

    #[tokio::test]
    async fn shared_client_posts_params_as_json() {
        let base = fake_bot_api().await;
        let config = DriverConfig::new("T").with_api_base(base);
        let transport: Arc<dyn HttpTransport> =
            Arc::new(ReqwestTransport::with_client(reqwest::Client::new()));

        let request = typing_request(&config, &PeerId::Numeric(99));
        let result = transport.post(&request).await.unwrap();
        assert_eq!(result, json!({"chat_id": 99, "action": "typing"}));

        let request = reply_request(&config, &PeerId::Numeric(99), "hi");
        let err = transport.post(&request).await.unwrap_err();
        assert!(matches!(err, Error::Api(ref d) if d.contains("chat not found")));
    }

    #[test]
    fn not_ok_is_api_error() {
        let err = envelope(r#"{"ok": false, "error_code": 400, "description": "Bad Request: chat not found"}"#)
            .into_result()
            .unwrap_err();
        assert!(matches!(err, Error::Api(ref d) if d.contains("chat not found")));
    }
}
