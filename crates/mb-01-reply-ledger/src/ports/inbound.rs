//! # Inbound Port - ReplyLedgerApi
//!
//! Primary driving port used by the poll-and-dispatch loop.

use crate::domain::{LedgerError, LedgerUpdate};
use async_trait::async_trait;
use shared_types::{ErrorReason, RecordId, TransactionRecord};

/// Retry/state ledger API.
///
/// # Example
///
/// ```rust,ignore
/// use mb_01_reply_ledger::ports::ReplyLedgerApi;
///
/// async fn example(ledger: &dyn ReplyLedgerApi) {
///     for record in ledger.fetch_eligible(5).await.unwrap_or_default() {
///         // ... attempt a reply ...
///         ledger.mark_replied(&record.id, None).await.ok();
///     }
/// }
/// ```
#[async_trait]
pub trait ReplyLedgerApi: Send + Sync {
    /// Returns up to `limit` unreplied records under the retry ceiling,
    /// oldest first.
    async fn fetch_eligible(&self, limit: usize) -> Result<Vec<TransactionRecord>, LedgerError>;

    /// Marks a record terminal, optionally stamping a reason.
    ///
    /// Idempotent: a second call returns `LedgerUpdate::AlreadyTerminal` and
    /// writes nothing.
    async fn mark_replied(
        &self,
        id: &RecordId,
        reason: Option<ErrorReason>,
    ) -> Result<LedgerUpdate, LedgerError>;

    /// Counts one recoverable failure. Terminates the record when the new
    /// count reaches the ceiling.
    async fn record_failure(
        &self,
        id: &RecordId,
        reason: ErrorReason,
    ) -> Result<LedgerUpdate, LedgerError>;

    /// Configured retry ceiling.
    fn max_retries(&self) -> u32;
}
