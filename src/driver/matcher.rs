//! Request matching
//!
//! Decides whether a webhook request belongs to this driver. The rules run in
//! a fixed order and the first one that fails is reported in the verdict.

use std::fmt;

use super::event::{CallbackQuery, Event};
use super::payload::RawUpdate;

/// Event keys that mark an attachment-bearing update
pub const ATTACHMENT_KEYS: [&str; 7] = [
    "audio", "voice", "video", "photo", "location", "contact", "document",
];

/// Outcome of matching a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchVerdict {
    /// The request is claimed by this driver
    Accepted,
    /// The event carries an attachment under this key
    Attachment(&'static str),
    /// Neither an event sender nor a callback query is present
    NoSender,
    /// The update has no `update_id`
    MissingUpdateId,
}

impl MatchVerdict {
    /// Whether the request is claimed
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl fmt::Display for MatchVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => f.write_str("accepted"),
            Self::Attachment(key) => write!(f, "attachment: {key}"),
            Self::NoSender => f.write_str("no sender or callback query"),
            Self::MissingUpdateId => f.write_str("missing update_id"),
        }
    }
}

/// First attachment key present on the event
///
/// An absent event has no attachments.
#[must_use]
pub fn attachment_key(event: Option<&Event>) -> Option<&'static str> {
    let event = event?;
    ATTACHMENT_KEYS.into_iter().find(|key| event.has_key(key))
}

/// Evaluate every matching rule against an update and its extracted event
#[must_use]
pub fn evaluate(update: &RawUpdate, event: Option<&Event>) -> MatchVerdict {
    if let Some(key) = attachment_key(event) {
        return MatchVerdict::Attachment(key);
    }

    let has_sender = event.is_some_and(|e| e.get("from").is_some());
    if !has_sender && CallbackQuery::from_update(update).is_none() {
        return MatchVerdict::NoSender;
    }

    if update.update_id().is_none() {
        return MatchVerdict::MissingUpdateId;
    }

    MatchVerdict::Accepted
}

/// Whether this driver claims the request
#[must_use]
pub fn matches(update: &RawUpdate, event: Option<&Event>) -> bool {
    evaluate(update, event).is_accepted()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::event::extract_event;

    fn verdict(body: &str) -> MatchVerdict {
        let update = RawUpdate::parse(body.as_bytes());
        let event = extract_event(&update);
        evaluate(&update, event.as_ref())
    }

    #[test]
    fn plain_message_is_accepted() {
        let v = verdict(r#"{"update_id": 1, "message": {"text": "hi", "from": {"id": 42}}}"#);
        assert_eq!(v, MatchVerdict::Accepted);
    }

    #[test]
    fn every_attachment_key_is_rejected() {
        for key in ATTACHMENT_KEYS {
            let body = format!(r#"{{"update_id": 1, "message": {{"{key}": {{}}, "from": {{"id": 1}}}}}}"#);
            assert_eq!(verdict(&body), MatchVerdict::Attachment(key), "key {key}");
        }
    }

    #[test]
    fn attachment_key_with_null_value_still_rejects() {
        let v = verdict(r#"{"update_id": 1, "message": {"photo": null, "from": {"id": 1}}}"#);
        assert_eq!(v, MatchVerdict::Attachment("photo"));
    }

    #[test]
    fn nested_attachment_keys_are_ignored() {
        let v = verdict(
            r#"{"update_id": 1, "message": {"from": {"id": 1}, "reply_to_message": {"photo": []}}}"#,
        );
        assert_eq!(v, MatchVerdict::Accepted);
    }

    #[test]
    fn attachment_check_runs_first() {
        let v = verdict(r#"{"message": {"video": {}}}"#);
        assert_eq!(v, MatchVerdict::Attachment("video"));
    }

    #[test]
    fn message_without_sender_is_rejected() {
        let v = verdict(r#"{"update_id": 1, "message": {"text": "hi"}}"#);
        assert_eq!(v, MatchVerdict::NoSender);
    }

    #[test]
    fn callback_query_stands_in_for_sender() {
        let v = verdict(r#"{"update_id": 1, "callback_query": {"data": "x"}}"#);
        assert_eq!(v, MatchVerdict::Accepted);
    }

    #[test]
    fn non_object_callback_query_stands_in_for_sender() {
        let v = verdict(r#"{"update_id": 1, "callback_query": "x"}"#);
        assert_eq!(v, MatchVerdict::Accepted);
    }

    #[test]
    fn channel_post_matches_through_sentinel_sender() {
        let v = verdict(r#"{"update_id": 1, "channel_post": {"text": "news"}}"#);
        assert_eq!(v, MatchVerdict::Accepted);
    }

    #[test]
    fn missing_update_id_is_rejected() {
        let v = verdict(r#"{"message": {"text": "hi", "from": {"id": 42}}}"#);
        assert_eq!(v, MatchVerdict::MissingUpdateId);
    }

    #[test]
    fn empty_update_is_rejected() {
        assert_eq!(verdict("{}"), MatchVerdict::NoSender);
        assert_eq!(verdict(""), MatchVerdict::NoSender);
        assert!(!verdict("garbage").is_accepted());
    }

    #[test]
    fn verdict_display() {
        assert_eq!(MatchVerdict::Attachment("photo").to_string(), "attachment: photo");
        assert_eq!(MatchVerdict::MissingUpdateId.to_string(), "missing update_id");
    }
}
