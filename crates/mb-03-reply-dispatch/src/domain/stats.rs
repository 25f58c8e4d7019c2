//! Dispatch statistics shared with the health surface.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative counters written by the loop and read by `/health`.
#[derive(Debug, Default)]
pub struct DispatchStats {
    processed: AtomicU64,
    errors: AtomicU64,
    cycles: AtomicU64,
    last_poll: RwLock<Option<DateTime<Utc>>>,
}

impl DispatchStats {
    /// Fresh counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of a poll.
    pub fn record_poll(&self, at: DateTime<Utc>) {
        *self.last_poll.write() = Some(at);
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a delivered reply.
    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts an error.
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Replies delivered.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Errors counted.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Polls started.
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Start time of the most recent poll.
    pub fn last_poll(&self) -> Option<DateTime<Utc>> {
        *self.last_poll.read()
    }

    /// Health payload.
    pub fn snapshot(&self, chain: &str) -> HealthSnapshot {
        HealthSnapshot {
            status: "ok",
            chain: chain.to_string(),
            last_poll: self.last_poll(),
            processed_count: self.processed(),
            error_count: self.errors(),
            cycle_count: self.cycles(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    /// Always `ok` while the process serves requests.
    pub status: &'static str,
    /// Configured chain.
    pub chain: String,
    /// Start time of the most recent poll.
    pub last_poll: Option<DateTime<Utc>>,
    /// Replies delivered.
    pub processed_count: u64,
    /// Errors counted.
    pub error_count: u64,
    /// Polls started.
    pub cycle_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_counters() {
        let stats = DispatchStats::new();
        stats.record_processed();
        stats.record_error();
        stats.record_error();
        stats.record_poll(Utc.timestamp_opt(1_700_000_000, 0).unwrap());

        assert_eq!(stats.processed(), 1);
        assert_eq!(stats.errors(), 2);
        assert_eq!(stats.cycles(), 1);
        assert!(stats.last_poll().is_some());
    }

    #[test]
    fn test_snapshot_json_shape() {
        let stats = DispatchStats::new();
        let json = serde_json::to_value(stats.snapshot("BSC")).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["chain"], "BSC");
        assert!(json["lastPoll"].is_null());
        assert_eq!(json["processedCount"], 0);
        assert_eq!(json["errorCount"], 0);
        assert_eq!(json["cycleCount"], 0);
    }
}
