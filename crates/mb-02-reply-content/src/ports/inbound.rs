//! # Inbound Port - ReplyGenerator
//!
//! Primary driving port used by the dispatch pipeline.

use async_trait::async_trait;
use shared_types::TransactionRecord;

/// Counters kept by a generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Replies produced.
    pub generated: u64,
    /// Replies that fell back to template text.
    pub fallbacks: u64,
    /// Backoff windows opened.
    pub backoff_triggers: u64,
    /// Backend calls skipped because of an active cooldown.
    pub suppressed_calls: u64,
}

impl GenerationStats {
    /// Per-field difference `self - earlier`.
    pub fn since(&self, earlier: &GenerationStats) -> GenerationStats {
        GenerationStats {
            generated: self.generated.saturating_sub(earlier.generated),
            fallbacks: self.fallbacks.saturating_sub(earlier.fallbacks),
            backoff_triggers: self.backoff_triggers.saturating_sub(earlier.backoff_triggers),
            suppressed_calls: self.suppressed_calls.saturating_sub(earlier.suppressed_calls),
        }
    }
}

/// Reply content generator.
///
/// Implementations never fail and always return non-empty text. They own
/// their anti-repetition and backoff state, hence `&mut self`.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Produces reply text for a record.
    async fn generate(&mut self, record: &TransactionRecord) -> String;

    /// Strategy name for logs.
    fn strategy(&self) -> &'static str;

    /// Cumulative counters.
    fn stats(&self) -> GenerationStats {
        GenerationStats::default()
    }
}
