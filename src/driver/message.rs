//! Canonical incoming messages
//!
//! Converts the selected callback query or event into the framework's
//! platform-agnostic [`IncomingMessage`]. Missing fields become `None`;
//! nothing here can fail.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::event::{CallbackQuery, Event, Inbound, extract_event};
use super::payload::{RawUpdate, as_text};

/// A sender or chat identifier
///
/// Telegram ids are integers, but a string id is kept as-is rather than
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PeerId {
    /// Integer id
    Numeric(i64),
    /// Any other textual id
    Text(String),
}

impl PeerId {
    /// Read an id from a JSON number or string
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(n.as_i64().map_or_else(|| Self::Text(n.to_string()), Self::Numeric)),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// JSON form used in outbound parameters
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Numeric(id) => Value::from(*id),
            Self::Text(id) => Value::from(id.as_str()),
        }
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for PeerId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

/// A message from the platform, in framework form
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    /// Message text, or the callback data for button presses
    pub text: Option<String>,

    /// Who sent it
    pub sender_id: Option<PeerId>,

    /// Chat to reply into
    pub recipient_id: Option<PeerId>,

    /// Selected event object (the attached message for callback queries)
    pub raw_payload: Option<Value>,
}

impl IncomingMessage {
    /// Build from a callback query
    #[must_use]
    pub fn from_callback_query(callback: &CallbackQuery<'_>) -> Self {
        Self {
            text: callback.data().and_then(as_text),
            sender_id: callback.sender_id().and_then(PeerId::from_value),
            recipient_id: callback.chat_id().and_then(PeerId::from_value),
            raw_payload: callback.message().cloned(),
        }
    }

    /// Build from a message, edited message, or channel post
    #[must_use]
    pub fn from_event(event: &Event) -> Self {
        Self {
            text: event.text().and_then(as_text),
            sender_id: event.sender_id().and_then(PeerId::from_value),
            recipient_id: event.chat_id().and_then(PeerId::from_value),
            raw_payload: Some(event.to_value()),
        }
    }

    /// Build from whichever source outranks the other
    #[must_use]
    pub fn from_inbound(inbound: &Inbound<'_>) -> Self {
        match inbound {
            Inbound::CallbackQuery(callback) => Self::from_callback_query(callback),
            Inbound::Event(event) => Self::from_event(event),
        }
    }
}

/// Normalize an update with an already-extracted event
///
/// Yields at most one message.
#[must_use]
pub fn normalize(update: &RawUpdate, event: Option<&Event>) -> Vec<IncomingMessage> {
    Inbound::select(update, event)
        .map(|inbound| IncomingMessage::from_inbound(&inbound))
        .into_iter()
        .collect()
}

/// Extract the event and normalize in one step
#[must_use]
pub fn extract_messages(update: &RawUpdate) -> Vec<IncomingMessage> {
    let event = extract_event(update);
    normalize(update, event.as_ref())
}
