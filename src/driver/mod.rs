//! Telegram webhook driver
//!
//! A request flows `payload` → `event` → (`matcher`, `message`). The
//! `outbound` builders are independent and only need the driver config plus
//! a recipient id.

pub mod event;
pub mod matcher;
pub mod message;
pub mod outbound;
pub mod payload;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

pub use event::{CHANNEL_POST_SENDER_ID, CallbackQuery, Event, EventSource, Inbound, extract_event};
pub use matcher::{ATTACHMENT_KEYS, MatchVerdict};
pub use message::{IncomingMessage, PeerId, extract_messages};
pub use outbound::{OutboundRequest, build_api_url, build_outbound_request};
pub use payload::RawUpdate;

use crate::Result;
use crate::config::DriverConfig;
use crate::transport::HttpTransport;

/// Name the driver registers under
pub const DRIVER_NAME: &str = "Telegram";

/// A platform driver as seen by the messaging framework
pub trait Driver: Send + Sync {
    /// Registry name
    fn name(&self) -> &'static str;

    /// Whether the current request belongs to this driver
    fn matches_request(&self) -> bool;

    /// Canonical messages carried by the request (zero or one)
    fn messages(&self) -> Vec<IncomingMessage>;

    /// Whether the request was sent by a bot
    fn is_bot(&self) -> bool;

    /// Query string of the request, passed through untouched
    fn query_parameters(&self) -> &HashMap<String, String>;

    /// Typing indicator call for a message, if it has a recipient
    fn typing_request(&self, message: &IncomingMessage) -> Option<OutboundRequest>;
}

/// Pick the first driver that claims the request
#[must_use]
pub fn select_driver<'a>(drivers: &'a [Box<dyn Driver>]) -> Option<&'a dyn Driver> {
    drivers
        .iter()
        .map(AsRef::as_ref)
        .find(|driver| driver.matches_request())
}

/// Telegram driver bound to one webhook request
///
/// The body is parsed and the event extracted once at construction. Every
/// later call reads those values, so repeated calls agree.
#[derive(Debug, Clone)]
pub struct TelegramDriver {
    update: RawUpdate,
    event: Option<Event>,
    query: HashMap<String, String>,
    config: Arc<DriverConfig>,
}

impl TelegramDriver {
    /// Bind the driver to a request body and its query parameters
    #[must_use]
    pub fn from_request(body: &[u8], query: HashMap<String, String>, config: Arc<DriverConfig>) -> Self {
        Self::from_update(RawUpdate::parse(body), query, config)
    }

    /// Bind the driver to an already-parsed update
    #[must_use]
    pub fn from_update(update: RawUpdate, query: HashMap<String, String>, config: Arc<DriverConfig>) -> Self {
        let event = extract_event(&update);
        Self {
            update,
            event,
            query,
            config,
        }
    }

    /// The parsed update
    #[must_use]
    pub const fn update(&self) -> &RawUpdate {
        &self.update
    }

    /// The extracted event, if any
    #[must_use]
    pub const fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    /// The Telegram `update_id`, if present
    #[must_use]
    pub fn update_id(&self) -> Option<&Value> {
        self.update.update_id()
    }

    /// Full matching outcome, including which rule rejected the request
    #[must_use]
    pub fn verdict(&self) -> MatchVerdict {
        matcher::evaluate(&self.update, self.event.as_ref())
    }

    /// `sendMessage` call answering a message, if it has a recipient
    #[must_use]
    pub fn reply_request(&self, message: &IncomingMessage, text: &str) -> Option<OutboundRequest> {
        let recipient = message.recipient_id.as_ref()?;
        Some(outbound::reply_request(&self.config, recipient, text))
    }

    /// Show the typing indicator in the message's chat
    ///
    /// Nothing is sent when the message has no recipient.
    ///
    /// # Errors
    ///
    /// Returns error if the transport or the Bot API fails
    pub async fn types(&self, message: &IncomingMessage, transport: &dyn HttpTransport) -> Result<()> {
        let Some(request) = self.typing_request(message) else {
            tracing::debug!("no recipient, skipping typing indicator");
            return Ok(());
        };
        transport.post(&request).await?;
        Ok(())
    }

    /// Reply with plain text in the message's chat
    ///
    /// Returns the sent message as reported by the Bot API, or `None` when
    /// the message has no recipient.
    ///
    /// # Errors
    ///
    /// Returns error if the transport or the Bot API fails
    pub async fn reply(
        &self,
        message: &IncomingMessage,
        text: &str,
        transport: &dyn HttpTransport,
    ) -> Result<Option<Value>> {
        let Some(request) = self.reply_request(message, text) else {
            tracing::debug!("no recipient, skipping reply");
            return Ok(None);
        };
        let sent = transport.post(&request).await?;
        Ok(Some(sent))
    }
}

impl Driver for TelegramDriver {
    fn name(&self) -> &'static str {
        DRIVER_NAME
    }

    fn matches_request(&self) -> bool {
        self.verdict().is_accepted()
    }

    fn messages(&self) -> Vec<IncomingMessage> {
        message::normalize(&self.update, self.event.as_ref())
    }

    fn is_bot(&self) -> bool {
        false
    }

    fn query_parameters(&self) -> &HashMap<String, String> {
        &self.query
    }

    fn typing_request(&self, message: &IncomingMessage) -> Option<OutboundRequest> {
        let recipient = message.recipient_id.as_ref()?;
        Some(outbound::typing_request(&self.config, recipient))
    }
}
