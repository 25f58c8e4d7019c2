//! In-memory record store.
//!
//! Backs the test suites and the `memory` ledger backend used for dry runs.

use crate::domain::{EligibilityQuery, FieldValue, LedgerError, RecordField, RecordOrder, RecordPatch};
use crate::ports::RecordStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{RecordId, TransactionRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::debug;

/// `RecordStore` kept in a `HashMap`.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<RecordId, TransactionRecord>>,
    /// Number of successful `update_fields` calls.
    writes: AtomicUsize,
    /// When set, every call fails with `LedgerError::Unavailable`.
    unavailable: AtomicBool,
}

impl InMemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with records.
    pub fn with_records(records: impl IntoIterator<Item = TransactionRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Insert or replace a record.
    pub fn insert(&self, record: TransactionRecord) {
        self.records.write().insert(record.id.clone(), record);
    }

    /// Snapshot of one record.
    pub fn get(&self, id: &RecordId) -> Option<TransactionRecord> {
        self.records.read().get(id).cloned()
    }

    /// Snapshot of every record.
    pub fn records(&self) -> Vec<TransactionRecord> {
        self.records.read().values().cloned().collect()
    }

    /// Number of writes applied so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Simulate an outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), LedgerError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("in-memory store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn query_eligible(
        &self,
        query: &EligibilityQuery,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        self.check_available()?;

        let records = self.records.read();
        let mut matching: Vec<TransactionRecord> = records
            .values()
            .filter(|record| query.matches(record))
            .cloned()
            .collect();

        match query.order {
            RecordOrder::OldestFirst => matching.sort_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            }),
        }
        matching.truncate(query.limit);

        debug!(
            chain = %query.chain,
            returned = matching.len(),
            "[mb-01] In-memory eligibility query"
        );
        Ok(matching)
    }

    async fn update_fields(&self, id: &RecordId, patch: &RecordPatch) -> Result<(), LedgerError> {
        self.check_available()?;

        let mut records = self.records.write();
        let record = records
            .get_mut(id)
            .ok_or_else(|| LedgerError::RecordNotFound(id.clone()))?;
        patch.apply_to(record);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn read_field(
        &self,
        id: &RecordId,
        field: RecordField,
    ) -> Result<Option<FieldValue>, LedgerError> {
        self.check_available()?;
        Ok(self.records.read().get(id).map(|record| field.read(record)))
    }
}
