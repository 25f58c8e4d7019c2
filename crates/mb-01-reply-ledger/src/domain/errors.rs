//! # Domain Errors
//!
//! Error types for the Reply Ledger.

use shared_types::{RecordError, RecordId};
use thiserror::Error;

/// Ledger error types.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Record id does not exist in the store.
    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    /// Store could not be reached.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Store answered with a non-success status.
    #[error("Storage returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },

    /// Transport failure talking to the store.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A row could not be decoded.
    #[error(transparent)]
    Decode(#[from] RecordError),
}

impl LedgerError {
    /// Builds a status error, truncating large bodies.
    pub fn status(status: u16, body: impl AsRef<str>) -> Self {
        let body = body.as_ref();
        let body = match body.char_indices().nth(200) {
            Some((idx, _)) => &body[..idx],
            None => body,
        };
        LedgerError::Status {
            status,
            body: body.to_string(),
        }
    }
}
