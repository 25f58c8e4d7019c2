//! Core domain entities for reply dispatch.

use mb_01_reply_ledger::{LedgerUpdate, DEFAULT_BATCH_SIZE};
use mb_02_reply_content::GenerationStats;
use shared_types::RecordId;
use std::time::Duration;

/// Default pause between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(30_000);

/// Default pause after a successful post when more records remain.
pub const DEFAULT_POST_PACING: Duration = Duration::from_millis(3_000);

/// Default deadline for one post call.
pub const DEFAULT_POST_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Which upstream `SKIP_*` / `ERROR_*` / `LIMIT_*` codes get no reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SentinelPolicy {
    /// Reply to every code the classifier recognises; silence the rest.
    #[default]
    ReplyKnown,
    /// Silence every `SKIP_*` and `ERROR_*` code.
    SilenceAll,
}

impl SentinelPolicy {
    /// Parses `reply-known` / `silence-all`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "reply-known" => Some(SentinelPolicy::ReplyKnown),
            "silence-all" => Some(SentinelPolicy::SilenceAll),
            _ => None,
        }
    }
}

/// Dispatch tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Records fetched per poll.
    pub batch_size: usize,
    /// Pause between polls.
    pub poll_interval: Duration,
    /// Pause after a successful post when more records remain.
    pub post_pacing: Duration,
    /// Deadline for one post call.
    pub post_timeout: Duration,
    /// Handling of upstream codes.
    pub sentinel_policy: SentinelPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            post_pacing: DEFAULT_POST_PACING,
            post_timeout: DEFAULT_POST_TIMEOUT,
            sentinel_policy: SentinelPolicy::default(),
        }
    }
}

/// Successful post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedReply {
    /// Id of the newly created post.
    pub post_id: String,
}

/// Result of processing one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Reply delivered.
    Posted {
        /// New post id.
        post_id: String,
    },
    /// No reply owed; record closed without posting.
    Skipped {
        /// Reason stored on the record.
        reason: String,
    },
    /// Retrying would never succeed; record closed.
    NonRecoverable {
        /// Reason stored on the record.
        reason: String,
    },
    /// Failure counted against the retry budget.
    Recoverable {
        /// Reason stored on the record.
        reason: String,
    },
    /// Platform rate limit; the rest of the batch is abandoned.
    RateLimited {
        /// Reason stored on the record.
        reason: String,
    },
}

impl AttemptOutcome {
    /// Short label for logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            AttemptOutcome::Posted { .. } => "posted",
            AttemptOutcome::Skipped { .. } => "skipped",
            AttemptOutcome::NonRecoverable { .. } => "non_recoverable",
            AttemptOutcome::Recoverable { .. } => "recoverable",
            AttemptOutcome::RateLimited { .. } => "rate_limited",
        }
    }

    /// True for outcomes counted as errors.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            AttemptOutcome::NonRecoverable { .. }
                | AttemptOutcome::Recoverable { .. }
                | AttemptOutcome::RateLimited { .. }
        )
    }
}

/// One processed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyAttempt {
    /// Record processed.
    pub record_id: RecordId,
    /// Text that was (or would have been) posted.
    pub text: Option<String>,
    /// What happened.
    pub outcome: AttemptOutcome,
    /// Ledger transition, `None` when the ledger write failed.
    pub ledger: Option<LedgerUpdate>,
}

/// Summary of one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Records returned by the ledger.
    pub fetched: usize,
    /// Per-record results, in processing order.
    pub attempts: Vec<ReplyAttempt>,
    /// Fetch failed; the cycle ran as an empty batch.
    pub fetch_failed: bool,
    /// Batch aborted on a rate limit.
    pub aborted: bool,
    /// Ledger writes that failed.
    pub ledger_errors: usize,
    /// Generator counters accumulated during this cycle.
    pub generation: GenerationStats,
}

impl CycleReport {
    /// Attempts with the given outcome label.
    pub fn count(&self, label: &str) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.outcome.label() == label)
            .count()
    }

    /// Replies delivered.
    pub fn posted(&self) -> usize {
        self.count("posted")
    }

    /// Records closed without a post.
    pub fn skipped(&self) -> usize {
        self.count("skipped")
    }

    /// Records whose processing counted as an error.
    pub fn errors(&self) -> usize {
        self.attempts.iter().filter(|a| a.outcome.is_error()).count()
            + self.ledger_errors
            + usize::from(self.fetch_failed)
    }
}
