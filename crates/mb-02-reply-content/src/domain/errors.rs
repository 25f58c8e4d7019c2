//! # Domain Errors
//!
//! Error types for the generation backend.

use thiserror::Error;

/// Generation backend errors.
///
/// None of these reach the caller of `ReplyGenerator::generate`; every one
/// ends in template fallback.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Backend answered 429.
    #[error("Generation backend rate limited")]
    RateLimited,

    /// Backend answered 402 (credits or quota used up).
    #[error("Generation backend quota exhausted")]
    QuotaExhausted,

    /// Backend answered another non-success status.
    #[error("Generation backend returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },

    /// Transport failure.
    #[error("Generation request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected shape.
    #[error("Failed to decode generation response: {0}")]
    Decode(String),
}

impl GenerationError {
    /// True for the responses that open a backoff window.
    pub fn triggers_backoff(&self) -> bool {
        matches!(
            self,
            GenerationError::RateLimited | GenerationError::QuotaExhausted
        )
    }

    /// Maps a non-success status code.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            429 => GenerationError::RateLimited,
            402 => GenerationError::QuotaExhausted,
            _ => GenerationError::Status {
                status,
                body: body.chars().take(200).collect(),
            },
        }
    }
}
