//! Reply Ledger service.
//!
//! Implements `ReplyLedgerApi` on top of any `RecordStore`.

use crate::domain::{
    failure_transition, FieldValue, LedgerConfig, LedgerError, LedgerUpdate, RecordField,
    RecordPatch,
};
use crate::ports::{RecordStore, ReplyLedgerApi};
use async_trait::async_trait;
use shared_types::{ErrorReason, RecordError, RecordId, TransactionRecord};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Retry/state ledger over a record store.
pub struct ReplyLedger<S: RecordStore> {
    config: LedgerConfig,
    store: Arc<S>,
}

impl<S: RecordStore> ReplyLedger<S> {
    /// Create a ledger.
    pub fn new(config: LedgerConfig, store: Arc<S>) -> Self {
        Self { config, store }
    }

    /// Backing store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Ledger configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Returns true when the record is already terminal.
    ///
    /// Every mutation goes through here first so that terminal records are
    /// never written again.
    async fn guard_terminal(&self, id: &RecordId) -> Result<bool, LedgerError> {
        let value = self
            .store
            .read_field(id, RecordField::Replied)
            .await?
            .ok_or_else(|| LedgerError::RecordNotFound(id.clone()))?;
        expect_bool(&value)
    }

    async fn read_retry_count(&self, id: &RecordId) -> Result<u32, LedgerError> {
        let value = self
            .store
            .read_field(id, RecordField::RetryCount)
            .await?
            .ok_or_else(|| LedgerError::RecordNotFound(id.clone()))?;
        value.as_count().ok_or_else(|| {
            RecordError::FieldType {
                field: RecordField::RetryCount.column().to_string(),
                found: value.type_name().to_string(),
            }
            .into()
        })
    }
}

fn expect_bool(value: &FieldValue) -> Result<bool, LedgerError> {
    value.as_bool().ok_or_else(|| {
        RecordError::FieldType {
            field: RecordField::Replied.column().to_string(),
            found: value.type_name().to_string(),
        }
        .into()
    })
}

#[async_trait]
impl<S: RecordStore> ReplyLedgerApi for ReplyLedger<S> {
    async fn fetch_eligible(&self, limit: usize) -> Result<Vec<TransactionRecord>, LedgerError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query = self.config.eligibility_query(limit);
        let mut records = self.store.query_eligible(&query).await?;

        // A store that ignores part of the filter must not leak terminal rows.
        let before = records.len();
        records.retain(|record| query.matches(record));
        if records.len() != before {
            warn!(
                dropped = before - records.len(),
                "[mb-01] Store returned ineligible records"
            );
        }
        records.truncate(limit);

        debug!(count = records.len(), "[mb-01] Eligible records fetched");
        Ok(records)
    }

    async fn mark_replied(
        &self,
        id: &RecordId,
        reason: Option<ErrorReason>,
    ) -> Result<LedgerUpdate, LedgerError> {
        if self.guard_terminal(id).await? {
            debug!(record = %id.short(), "[mb-01] Record already terminal");
            return Ok(LedgerUpdate::AlreadyTerminal);
        }

        let reason_label = reason.as_ref().map(|r| r.as_str().to_string());
        self.store
            .update_fields(id, &RecordPatch::terminal(reason))
            .await?;

        info!(
            record = %id.short(),
            reason = reason_label.as_deref().unwrap_or("-"),
            "[mb-01] Record marked replied"
        );
        Ok(LedgerUpdate::Replied)
    }

    async fn record_failure(
        &self,
        id: &RecordId,
        reason: ErrorReason,
    ) -> Result<LedgerUpdate, LedgerError> {
        if self.guard_terminal(id).await? {
            debug!(record = %id.short(), "[mb-01] Failure on terminal record ignored");
            return Ok(LedgerUpdate::AlreadyTerminal);
        }

        let current = self.read_retry_count(id).await?;
        let (patch, update) = failure_transition(current, self.config.max_retries, &reason);
        self.store.update_fields(id, &patch).await?;

        match &update {
            LedgerUpdate::Exhausted { retry_count } => warn!(
                record = %id.short(),
                retry_count,
                reason = %reason,
                "[mb-01] Retry ceiling reached, record terminated"
            ),
            LedgerUpdate::RetryScheduled { retry_count } => info!(
                record = %id.short(),
                retry_count,
                max_retries = self.config.max_retries,
                reason = %reason,
                "[mb-01] Retry scheduled"
            ),
            _ => {}
        }
        Ok(update)
    }

    fn max_retries(&self) -> u32 {
        self.config.max_retries
    }
}
