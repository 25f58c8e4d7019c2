//! # Domain Errors
//!
//! Posting failures, classified by what the pipeline should do next.

use shared_types::ErrorReason;
use thiserror::Error;

/// Failure reported by a `ReplyPoster`.
///
/// | Variant | Ledger action |
/// |---------|---------------|
/// | `NotFound`, `DuplicateContent`, `TargetUnavailable` | `mark_replied(reason)` |
/// | `RateLimited` (or any message mentioning 429) | `record_failure` + abort batch |
/// | everything else | `record_failure` |
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostError {
    /// 401/403 authorization failure.
    #[error("Unauthorized ({status})")]
    Unauthorized {
        /// HTTP status code
        status: u16,
    },

    /// Target post does not exist.
    #[error("Target post not found (404)")]
    NotFound,

    /// Platform rejected the text as a duplicate.
    #[error("Duplicate content rejected")]
    DuplicateContent,

    /// Target exists but cannot be replied to (deleted, hidden, restricted).
    #[error("Target post unavailable: {0}")]
    TargetUnavailable(String),

    /// 429 from the platform.
    #[error("Rate limited (429)")]
    RateLimited {
        /// Unix seconds at which the window resets, when reported.
        reset_at: Option<u64>,
    },

    /// The post call exceeded its deadline.
    #[error("Post timed out")]
    Timeout,

    /// Network-level failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Any other non-success response.
    #[error("Service error ({status}): {message}")]
    Service {
        /// HTTP status code
        status: u16,
        /// Error detail (truncated)
        message: String,
    },
}

impl PostError {
    /// True for 429 conditions, including ones only visible in the message.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            PostError::RateLimited { .. } => true,
            PostError::Service { status, message } => *status == 429 || message.contains("429"),
            PostError::Transport(message) => message.contains("429"),
            _ => false,
        }
    }

    /// False only when retrying can never succeed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            PostError::NotFound | PostError::DuplicateContent | PostError::TargetUnavailable(_)
        )
    }

    /// Reason stored in the ledger.
    pub fn reason(&self) -> ErrorReason {
        ErrorReason::new(self.to_string())
    }
}
