//! Shared test utilities

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use telegram_driver::{DriverConfig, HttpTransport, OutboundRequest};

/// Plain text message from a user
pub const TEXT_MESSAGE: &str =
    r#"{"update_id":1,"message":{"text":"hi","from":{"id":42},"chat":{"id":99}}}"#;

/// Inline button press
pub const CALLBACK_QUERY: &str =
    r#"{"update_id":2,"callback_query":{"data":"YES","from":{"id":7},"message":{"chat":{"id":55}}}}"#;

/// Photo message
pub const PHOTO_MESSAGE: &str = r#"{"update_id":3,"message":{"photo":[{"file_id":"abc","width":90,"height":90}],"from":{"id":1},"chat":{"id":2}}}"#;

/// Driver config with token `T`
pub fn test_config() -> DriverConfig {
    DriverConfig::new("T")
}

/// Transport that records every request and answers `ok`
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutboundRequest>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<OutboundRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn post(&self, request: &OutboundRequest) -> telegram_driver::Result<Value> {
        self.sent.lock().unwrap().push(request.clone());
        Ok(json!(true))
    }
}

/// Transport that fails every call like the Bot API would
pub struct FailingTransport;

#[async_trait]
impl HttpTransport for FailingTransport {
    async fn post(&self, _request: &OutboundRequest) -> telegram_driver::Result<Value> {
        Err(telegram_driver::Error::Api("Bad Request: chat not found".to_string()))
    }
}

/// Wrap a recording transport for handing to the API state
pub fn recording_transport() -> (Arc<RecordingTransport>, Arc<dyn HttpTransport>) {
    let transport = Arc::new(RecordingTransport::default());
    let dyn_transport: Arc<dyn HttpTransport> = transport.clone();
    (transport, dyn_transport)
}
