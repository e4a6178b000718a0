//! Recency-bounded set of processed keys.
//!
//! Both deduplication layers of the credits path are built on this type: the
//! poller keys it by server event (`request_id-type-id`) and the credits
//! service keys it by request id. `insert` is the mark-before-mutate
//! primitive: it atomically answers "has this been seen?" while recording
//! that it now has been.

use dashmap::DashMap;
use tokio::time::Instant;

/// Once the log grows past this many keys, a cleanup pass trims it.
pub const LOG_HIGH_WATER: usize = 100;

/// How many of the most recent keys a cleanup pass retains.
pub const LOG_RETAIN: usize = 50;

/// Concurrent set of string keys with insertion-recency trimming.
#[derive(Debug, Default)]
pub struct ProcessedLog {
    entries: DashMap<String, Instant>,
}

impl ProcessedLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as processed. Returns `true` if the key was not already
    /// present. A single call both checks and marks, so two racing callers
    /// cannot both observe "unseen".
    pub fn insert(&self, key: &str) -> bool {
        self.entries.insert(key.to_string(), Instant::now()).is_none()
    }

    /// Unmark a key so a later occurrence is processed again.
    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wipe the log entirely. Invoked on logout.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Bound memory: once more than `max` keys are held, retain only the
    /// `keep` most recently inserted ones.
    ///
    /// Dropping old keys makes a sufficiently old duplicate eligible for
    /// reprocessing again; the retention window is sized so that in practice
    /// the server has long stopped replaying those events.
    pub fn trim(&self, max: usize, keep: usize) {
        if self.entries.len() <= max {
            return;
        }
        let mut by_age: Vec<(String, Instant)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        by_age.sort_by(|a, b| b.1.cmp(&a.1));
        for (key, _) in by_age.into_iter().skip(keep) {
            self.entries.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_marks_once() {
        let log = ProcessedLog::new();
        assert!(log.insert("req-1-credit_approved-9"));
        assert!(!log.insert("req-1-credit_approved-9"));
        assert!(log.contains("req-1-credit_approved-9"));
    }

    #[tokio::test]
    async fn test_remove_makes_key_fresh_again() {
        let log = ProcessedLog::new();
        log.insert("req-1");
        log.remove("req-1");
        assert!(!log.contains("req-1"));
        assert!(log.insert("req-1"));
    }

    #[tokio::test]
    async fn test_trim_noop_below_high_water() {
        let log = ProcessedLog::new();
        for i in 0..LOG_HIGH_WATER {
            log.insert(&format!("key-{i}"));
        }
        log.trim(LOG_HIGH_WATER, LOG_RETAIN);
        assert_eq!(log.len(), LOG_HIGH_WATER);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trim_keeps_most_recent() {
        let log = ProcessedLog::new();
        for i in 0..150 {
            log.insert(&format!("key-{i}"));
            tokio::time::advance(std::time::Duration::from_millis(1)).await;
        }

        log.trim(LOG_HIGH_WATER, LOG_RETAIN);
        assert_eq!(log.len(), LOG_RETAIN);

        // The newest keys survive, the oldest are gone.
        for i in 100..150 {
            assert!(log.contains(&format!("key-{i}")), "key-{i} should survive");
        }
        for i in 0..100 {
            assert!(!log.contains(&format!("key-{i}")), "key-{i} should be gone");
        }
    }

    #[tokio::test]
    async fn test_clear() {
        let log = ProcessedLog::new();
        log.insert("a");
        log.insert("b");
        log.clear();
        assert!(log.is_empty());
    }
}
