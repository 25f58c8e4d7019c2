//! # MB-01 Reply Ledger
//!
//! Tracks, per transaction record, whether a reply was delivered, how many
//! attempts failed and why.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Select the records eligible for a reply attempt (oldest first)
//! - Record terminal outcomes (`replied = true`)
//! - Count recoverable failures and terminate records at the retry ceiling
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Terminal records are never mutated | `service.rs` - `guard_terminal()` |
//! | INVARIANT-2 | `retry_count` is monotonic and bounded | `domain/policy.rs` - `failure_transition()` |
//! | INVARIANT-3 | Ceiling exhaustion is terminal and auditable | `domain/policy.rs` - `MAX_RETRIES_EXCEEDED` reason |
//! | INVARIANT-4 | Fetch never returns terminal or exhausted records | `domain/entities.rs` - `EligibilityQuery::matches()` |
//!
//! ## State Machine
//!
//! ```text
//! [ELIGIBLE] ──success / non-recoverable──→ [REPLIED]
//!     │
//!     └── recoverable failure ──→ retry_count + 1 ──(≥ ceiling)──→ [REPLIED: MAX_RETRIES_EXCEEDED]
//! ```
//!
//! ## Concurrency
//!
//! Every mutation is scoped to a single record id. The ledger does not
//! provide cross-process mutual exclusion: exactly one poller may run
//! against a given store.
//!
//! ## Module Structure
//!
//! ```text
//! mb-01-reply-ledger/
//! ├── domain/     # LedgerConfig, EligibilityQuery, RecordPatch, policy, errors
//! ├── ports/      # ReplyLedgerApi (inbound), RecordStore (outbound)
//! ├── adapters/   # InMemoryRecordStore, SupabaseRecordStore
//! └── service.rs  # ReplyLedger
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryRecordStore, SupabaseConfig, SupabaseRecordStore};
pub use domain::{
    failure_transition, EligibilityQuery, FieldValue, LedgerConfig, LedgerError, LedgerUpdate,
    RecordField, RecordOrder, RecordPatch, DEFAULT_BATCH_SIZE, DEFAULT_MAX_RETRIES,
};
pub use ports::{RecordStore, ReplyLedgerApi};
pub use service::ReplyLedger;
