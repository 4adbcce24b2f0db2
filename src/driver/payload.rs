//! Webhook body parsing and optional lookups
//!
//! A Telegram update is decoded into a [`RawUpdate`]: a JSON object that is
//! never mutated after parsing. Every lookup returns `Option` and treats a
//! JSON `null` exactly like a missing key, so callers never branch on both.

use serde_json::{Map, Value};

/// A decoded webhook update
///
/// Parsing never fails: a body that is empty, not JSON, or not a JSON object
/// yields an empty update on which every lookup returns `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawUpdate {
    fields: Map<String, Value>,
}

impl RawUpdate {
    /// Decode a request body
    #[must_use]
    pub fn parse(body: &[u8]) -> Self {
        if body.iter().all(u8::is_ascii_whitespace) {
            tracing::debug!("empty webhook body");
            return Self::default();
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => Self { fields },
            Ok(other) => {
                tracing::debug!(kind = json_kind(&other), "webhook body is not a JSON object");
                Self::default()
            }
            Err(e) => {
                tracing::debug!(error = %e, "malformed webhook body");
                Self::default()
            }
        }
    }

    /// Wrap an already-decoded object
    #[must_use]
    pub const fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Whether the update carries no fields at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Top-level value, `None` when absent or `null`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// Top-level value as an object, `None` for any other shape
    #[must_use]
    pub fn object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.get(key).and_then(Value::as_object)
    }

    /// Whether a non-null value exists under `key`
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Nested lookup starting at the update root
    #[must_use]
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        lookup(self.get(first)?, rest)
    }

    /// The `update_id` envelope marker
    #[must_use]
    pub fn update_id(&self) -> Option<&Value> {
        self.get("update_id")
    }

    /// Borrow the underlying object
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Walk `path` through nested objects
///
/// Returns `None` as soon as a segment is missing, `null`, or the current
/// value is not an object. An empty path returns `value` itself unless it is
/// `null`.
#[must_use]
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.as_object()?.get(*key))
        .filter(|v| !v.is_null())
}

/// Nested lookup starting from an object
#[must_use]
pub fn lookup_in<'a>(map: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    lookup(map.get(*first)?, rest)
}

/// Render a scalar as text
///
/// Strings are returned as-is; numbers and booleans use their JSON text.
/// Objects, arrays, and `null` have no text form.
#[must_use]
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
