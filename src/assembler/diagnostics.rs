//! Rate-limited warnings.
//!
//! Decoders tend to repeat the same mistake on every paragraph. Each warning
//! is keyed; a key is logged at most `limit` times and counted afterwards.

use std::collections::HashMap;

/// Warning log owned by one assembler session.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    counts: HashMap<&'static str, u32>,
    limit: u32,
}

impl Diagnostics {
    /// Create a log that reports each key at most `limit` times.
    pub fn new(limit: u32) -> Self {
        Self {
            counts: HashMap::new(),
            limit,
        }
    }

    /// Record a warning; logs it unless the key was already reported `limit` times.
    ///
    /// Returns `true` if the message was logged.
    pub fn warn(&mut self, key: &'static str, message: impl AsRef<str>) -> bool {
        let count = self.counts.entry(key).or_insert(0);
        *count += 1;
        if *count <= self.limit {
            log::warn!("{}: {}", key, message.as_ref());
            true
        } else {
            log::debug!("{} (repeated {} times): {}", key, count, message.as_ref());
            false
        }
    }

    /// Number of times a key was recorded.
    pub fn count(&self, key: &str) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Total number of warnings recorded.
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Recorded keys with their counts, sorted by key.
    pub fn summary(&self) -> Vec<(&'static str, u32)> {
        let mut entries: Vec<_> = self.counts.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort();
        entries
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(1)
    }
}
