//! # Error Types
//!
//! Failure details that travel between subsystems and end up in the
//! `error_reason` column.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum stored length of a failure reason, in characters.
pub const MAX_REASON_LEN: usize = 200;

/// Reason stamped on records that carried no post to reply to.
pub const REASON_NO_TARGET: &str = "NO_TWEET_ID";

/// Prefix stamped on records whose retry budget ran out.
pub const REASON_MAX_RETRIES: &str = "MAX_RETRIES_EXCEEDED";

/// A failure reason, truncated to [`MAX_REASON_LEN`] characters on creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorReason(String);

impl ErrorReason {
    /// Creates a reason, truncating on a character boundary.
    pub fn new(reason: impl AsRef<str>) -> Self {
        let reason = reason.as_ref().trim();
        let truncated = match reason.char_indices().nth(MAX_REASON_LEN) {
            Some((idx, _)) => &reason[..idx],
            None => reason,
        };
        Self(truncated.to_string())
    }

    /// Reason recorded when the retry ceiling is reached.
    pub fn exhausted(last: &ErrorReason) -> Self {
        Self::new(format!("{}: {}", REASON_MAX_RETRIES, last.0))
    }

    /// Raw text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when this reason marks ceiling exhaustion.
    pub fn is_exhaustion(&self) -> bool {
        self.0.starts_with(REASON_MAX_RETRIES)
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ErrorReason {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ErrorReason {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Errors raised while decoding persisted records.
#[derive(Debug, Clone, Error)]
pub enum RecordError {
    /// A row could not be mapped onto `TransactionRecord`.
    #[error("Malformed record: {0}")]
    Malformed(String),

    /// A field was present with an unexpected type.
    #[error("Unexpected type for field {field}: {found}")]
    FieldType { field: String, found: String },
}
