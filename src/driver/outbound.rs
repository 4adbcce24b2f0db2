//! Outbound Bot API request construction
//!
//! Every call targets `<api_base><token>/<endpoint>`. Building a request is
//! pure; sending it is the transport's job.

use std::fmt;

use serde_json::{Map, Value};

use super::message::PeerId;
use crate::config::DriverConfig;

/// Telegram Bot API base URL
pub const API_BASE: &str = "https://api.telegram.org/bot";

/// Telegram file download base URL
pub const FILE_API_BASE: &str = "https://api.telegram.org/file/bot";

/// Endpoint for chat actions such as the typing indicator
pub const SEND_CHAT_ACTION: &str = "sendChatAction";

/// Endpoint for replies
pub const SEND_MESSAGE: &str = "sendMessage";

/// A Bot API call ready to hand to a transport
///
/// `Debug` shows the endpoint only, since the URL embeds the token.
#[derive(Clone, PartialEq)]
pub struct OutboundRequest {
    /// Full endpoint URL, token included
    pub url: String,

    /// Call parameters, sent as the JSON body
    pub params: Map<String, Value>,
}

impl OutboundRequest {
    /// Endpoint name, i.e. the last path segment
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or_default()
    }
}

impl fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundRequest")
            .field("endpoint", &self.endpoint())
            .field("params", &self.params)
            .finish()
    }
}

/// `<api_base><token>/<endpoint>`
#[must_use]
pub fn build_api_url(config: &DriverConfig, endpoint: &str) -> String {
    format!("{}{}/{endpoint}", config.api_base, config.token())
}

/// Build a call to any endpoint; parameters pass through unchanged
#[must_use]
pub fn build_outbound_request(
    config: &DriverConfig,
    endpoint: &str,
    params: Map<String, Value>,
) -> OutboundRequest {
    OutboundRequest {
        url: build_api_url(config, endpoint),
        params,
    }
}

/// `sendChatAction` with `action = "typing"`
#[must_use]
pub fn typing_request(config: &DriverConfig, recipient: &PeerId) -> OutboundRequest {
    let mut params = Map::new();
    params.insert("chat_id".to_string(), recipient.to_value());
    params.insert("action".to_string(), Value::from("typing"));
    build_outbound_request(config, SEND_CHAT_ACTION, params)
}

/// `sendMessage` with plain text
#[must_use]
pub fn reply_request(config: &DriverConfig, recipient: &PeerId, text: &str) -> OutboundRequest {
    let mut params = Map::new();
    params.insert("chat_id".to_string(), recipient.to_value());
    params.insert("text".to_string(), Value::from(text));
    build_outbound_request(config, SEND_MESSAGE, params)
}

/// Download URL for a file path returned by `getFile`
#[must_use]
pub fn file_url(config: &DriverConfig, file_path: &str) -> String {
    format!(
        "{}{}/{}",
        config.file_api_base,
        config.token(),
        file_path.trim_start_matches('/')
    )
}
