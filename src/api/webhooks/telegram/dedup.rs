//! Webhook update deduplication

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// How long an `update_id` stays remembered (5 minutes)
const DEDUP_TTL_SECS: u64 = 300;

/// Maximum remembered updates
const DEDUP_MAX_ENTRIES: usize = 2000;

/// Remembers recently seen `update_id`s
///
/// Telegram redelivers an update when the webhook answers slowly or with an
/// error. Entries expire after the TTL and the cache never grows past its cap.
#[derive(Debug)]
pub struct UpdateDedup {
    seen: HashMap<String, Instant>,
    ttl: Duration,
    max_entries: usize,
}

impl Default for UpdateDedup {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEDUP_TTL_SECS), DEDUP_MAX_ENTRIES)
    }
}

impl UpdateDedup {
    /// Cache with a custom TTL and capacity
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            seen: HashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Record `update_id` and report whether it was already seen within the TTL
    pub fn is_duplicate(&mut self, update_id: &str) -> bool {
        let now = Instant::now();

        if let Some(seen_at) = self.seen.get(update_id) {
            if now.duration_since(*seen_at) < self.ttl {
                return true;
            }
        }

        if self.seen.len() >= self.max_entries {
            self.seen.retain(|_, seen_at| now.duration_since(*seen_at) < self.ttl);
        }

        if self.seen.len() >= self.max_entries {
            if let Some(oldest) = self
                .seen
                .iter()
                .min_by_key(|(_, seen_at)| **seen_at)
                .map(|(id, _)| id.clone())
            {
                self.seen.remove(&oldest);
            }
        }

        self.seen.insert(update_id.to_string(), now);
        false
    }

    /// Number of remembered updates
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing is remembered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
