//! Word-set similarity and the rolling window of recent replies.

use std::collections::{HashSet, VecDeque};

/// Texts more similar than this are considered repeats.
pub const SIMILARITY_THRESHOLD: f64 = 0.7;

/// Capacity of the recent-reply window.
pub const RECENT_WINDOW_CAPACITY: usize = 50;

/// Jaccard similarity of the lower-cased whitespace-separated word sets.
///
/// Two texts with no words at all are treated as identical.
pub fn jaccard(a: &str, b: &str) -> f64 {
    let a = word_set(a);
    let b = word_set(b);
    let union = a.union(&b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Bounded FIFO of recently emitted replies.
///
/// Process-local; lost on restart.
#[derive(Debug, Clone)]
pub struct RecentReplyWindow {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for RecentReplyWindow {
    fn default() -> Self {
        Self::with_capacity(RECENT_WINDOW_CAPACITY)
    }
}

impl RecentReplyWindow {
    /// Window holding at most `capacity` texts (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// True when `text` is at most `SIMILARITY_THRESHOLD` similar to every entry.
    pub fn is_distinct(&self, text: &str) -> bool {
        self.entries
            .iter()
            .all(|entry| jaccard(entry, text) <= SIMILARITY_THRESHOLD)
    }

    /// Records a text, evicting the oldest entry when full.
    pub fn push(&mut self, text: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(text.into());
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    /// Entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
