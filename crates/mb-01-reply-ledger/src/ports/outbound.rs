//! # Outbound Ports
//!
//! The persistence collaborator: a table-like store keyed by record id.

use crate::domain::{EligibilityQuery, FieldValue, LedgerError, RecordField, RecordPatch};
use async_trait::async_trait;
use shared_types::{RecordId, TransactionRecord};

/// Table-like record store - outbound port.
///
/// No cross-record transactions are required; every call touches at most one
/// record (or reads a batch).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Rows matching the query criteria, in the query order, at most
    /// `query.limit` of them.
    async fn query_eligible(
        &self,
        query: &EligibilityQuery,
    ) -> Result<Vec<TransactionRecord>, LedgerError>;

    /// Applies a partial update to one record.
    async fn update_fields(&self, id: &RecordId, patch: &RecordPatch) -> Result<(), LedgerError>;

    /// Reads a single field. `Ok(None)` when the record does not exist.
    async fn read_field(
        &self,
        id: &RecordId,
        field: RecordField,
    ) -> Result<Option<FieldValue>, LedgerError>;
}
