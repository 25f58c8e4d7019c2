//! Core domain entities for the Reply Ledger.

use serde::Serialize;
use shared_types::{ErrorReason, TransactionRecord, DEFAULT_CHAIN};

/// Default retry ceiling.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default number of records fetched per poll.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Only records on this chain are served.
    pub chain: String,
    /// Recoverable failures allowed before a record becomes terminal.
    pub max_retries: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            chain: DEFAULT_CHAIN.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl LedgerConfig {
    /// Builds the eligibility query for a batch of `limit` records.
    pub fn eligibility_query(&self, limit: usize) -> EligibilityQuery {
        EligibilityQuery {
            chain: self.chain.clone(),
            max_retries: self.max_retries,
            order: RecordOrder::OldestFirst,
            limit,
        }
    }
}

/// Sort order of an eligibility query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordOrder {
    /// `created_at` ascending.
    #[default]
    OldestFirst,
}

/// Criteria, order and limit handed to the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityQuery {
    /// `chain == chain`
    pub chain: String,
    /// `retry_count < max_retries`
    pub max_retries: u32,
    /// Result order.
    pub order: RecordOrder,
    /// Maximum number of rows.
    pub limit: usize,
}

impl EligibilityQuery {
    /// True when `record` satisfies the criteria (ignores order and limit).
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        record.is_eligible(&self.chain, self.max_retries)
    }
}

/// Partial update applied to a single record.
///
/// Serialises to the PATCH body expected by PostgREST; unset fields are
/// omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordPatch {
    /// New terminal marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replied: Option<bool>,
    /// New retry count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
    /// New failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<ErrorReason>,
}

impl RecordPatch {
    /// Patch that marks a record terminal.
    pub fn terminal(reason: Option<ErrorReason>) -> Self {
        Self {
            replied: Some(true),
            retry_count: None,
            error_reason: reason,
        }
    }

    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.replied.is_none() && self.retry_count.is_none() && self.error_reason.is_none()
    }

    /// Applies the patch to an in-memory record.
    pub fn apply_to(&self, record: &mut TransactionRecord) {
        if let Some(replied) = self.replied {
            record.replied = replied;
        }
        if let Some(retry_count) = self.retry_count {
            record.retry_count = retry_count;
        }
        if let Some(reason) = &self.error_reason {
            record.error_reason = Some(reason.as_str().to_string());
        }
    }
}

/// Fields the ledger reads back individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    /// `replied`
    Replied,
    /// `retry_count`
    RetryCount,
    /// `error_reason`
    ErrorReason,
}

impl RecordField {
    /// Column name in the backing table.
    pub fn column(&self) -> &'static str {
        match self {
            RecordField::Replied => "replied",
            RecordField::RetryCount => "retry_count",
            RecordField::ErrorReason => "error_reason",
        }
    }

    /// Reads the field from an in-memory record.
    pub fn read(&self, record: &TransactionRecord) -> FieldValue {
        match self {
            RecordField::Replied => FieldValue::Bool(record.replied),
            RecordField::RetryCount => FieldValue::Count(record.retry_count),
            RecordField::ErrorReason => record
                .error_reason
                .clone()
                .map(FieldValue::Text)
                .unwrap_or(FieldValue::Null),
        }
    }
}

/// Value of a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Boolean column.
    Bool(bool),
    /// Counter column.
    Count(u32),
    /// Text column.
    Text(String),
    /// SQL NULL.
    Null,
}

impl FieldValue {
    /// Boolean view; NULL reads as false.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(*value),
            FieldValue::Null => Some(false),
            _ => None,
        }
    }

    /// Counter view; NULL reads as zero.
    pub fn as_count(&self) -> Option<u32> {
        match self {
            FieldValue::Count(value) => Some(*value),
            FieldValue::Null => Some(0),
            _ => None,
        }
    }

    /// Short type name, used in decode errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "bool",
            FieldValue::Count(_) => "count",
            FieldValue::Text(_) => "text",
            FieldValue::Null => "null",
        }
    }
}

/// Transition performed by a ledger mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerUpdate {
    /// Record is now terminal.
    Replied,
    /// Failure counted; record stays eligible.
    RetryScheduled {
        /// Count after the update.
        retry_count: u32,
    },
    /// Failure counted and the ceiling was reached; record is now terminal.
    Exhausted {
        /// Count after the update.
        retry_count: u32,
    },
    /// Record was already terminal; nothing was written.
    AlreadyTerminal,
}

impl LedgerUpdate {
    /// True when the record is terminal after this update.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LedgerUpdate::RetryScheduled { .. })
    }
}
