//! Event selection
//!
//! An update carries at most one message-like object. The candidates are
//! tried in [`EventSource::PRECEDENCE`] order and the first present,
//! non-empty object wins. Callback queries are handled separately by
//! [`Inbound::select`] because they take priority for normalization but
//! never feed the attachment check.

use serde_json::{Map, Value, json};

use super::payload::{RawUpdate, lookup, lookup_in};

/// Sender id stamped onto channel posts, which have no originating user
pub const CHANNEL_POST_SENDER_ID: i64 = 0;

/// Which update field an [`Event`] was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    /// `message`
    Message,
    /// `edited_message`
    EditedMessage,
    /// `channel_post`
    ChannelPost,
}

impl EventSource {
    /// Selection order, first match wins
    pub const PRECEDENCE: [Self; 3] = [Self::Message, Self::EditedMessage, Self::ChannelPost];

    /// Update field holding this kind of event
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::EditedMessage => "edited_message",
            Self::ChannelPost => "channel_post",
        }
    }

    /// Try to take this source's event out of an update
    #[must_use]
    pub fn select(self, update: &RawUpdate) -> Option<Event> {
        let body = update.object(self.key()).filter(|m| !m.is_empty())?;
        let mut body = body.clone();

        if self == Self::ChannelPost {
            body.insert("from".to_string(), json!({ "id": CHANNEL_POST_SENDER_ID }));
        }

        Some(Event { source: self, body })
    }
}

/// The message-like object selected from an update
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Field the event came from
    pub source: EventSource,
    /// The event object, including any synthesized sender
    pub body: Map<String, Value>,
}

impl Event {
    /// Top-level value, `None` when absent or `null`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key).filter(|v| !v.is_null())
    }

    /// Whether `key` exists at the top level, whatever its value
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        self.body.contains_key(key)
    }

    /// `text`
    #[must_use]
    pub fn text(&self) -> Option<&Value> {
        self.get("text")
    }

    /// `from.id`
    #[must_use]
    pub fn sender_id(&self) -> Option<&Value> {
        lookup_in(&self.body, &["from", "id"])
    }

    /// `chat.id`
    #[must_use]
    pub fn chat_id(&self) -> Option<&Value> {
        lookup_in(&self.body, &["chat", "id"])
    }

    /// Clone the event as a JSON value
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.body.clone())
    }
}

/// Select the event of an update
///
/// Returns `None` when the update has no message, edited message, or channel
/// post. That is a valid state, e.g. for a pure callback-query update.
#[must_use]
pub fn extract_event(update: &RawUpdate) -> Option<Event> {
    let event = EventSource::PRECEDENCE
        .iter()
        .find_map(|source| source.select(update));

    if let Some(event) = &event {
        tracing::trace!(source = event.source.key(), "selected update event");
    }

    event
}

/// Typed view over an update's `callback_query`
///
/// Any non-null value counts as a callback query. A value that is not an
/// object simply has none of the fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallbackQuery<'a> {
    body: &'a Value,
}

impl<'a> CallbackQuery<'a> {
    /// The callback query of an update, if it carries one
    #[must_use]
    pub fn from_update(update: &'a RawUpdate) -> Option<Self> {
        update.get("callback_query").map(|body| Self { body })
    }

    /// `data`, the payload chosen when the inline button was built
    #[must_use]
    pub fn data(&self) -> Option<&'a Value> {
        lookup(self.body, &["data"])
    }

    /// `from.id`
    #[must_use]
    pub fn sender_id(&self) -> Option<&'a Value> {
        lookup(self.body, &["from", "id"])
    }

    /// `message.chat.id`
    #[must_use]
    pub fn chat_id(&self) -> Option<&'a Value> {
        lookup(self.body, &["message", "chat", "id"])
    }

    /// `message`, the message the button was attached to
    #[must_use]
    pub fn message(&self) -> Option<&'a Value> {
        lookup(self.body, &["message"])
    }
}

/// What a request is normalized from
///
/// A callback query outranks any event in the same update.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound<'a> {
    /// Inline button press
    CallbackQuery(CallbackQuery<'a>),
    /// Message, edited message, or channel post
    Event(&'a Event),
}

impl<'a> Inbound<'a> {
    /// Pick the normalization source for an update and its extracted event
    #[must_use]
    pub fn select(update: &'a RawUpdate, event: Option<&'a Event>) -> Option<Self> {
        CallbackQuery::from_update(update)
            .map(Self::CallbackQuery)
            .or_else(|| event.map(Self::Event))
    }
}
