//! # Shared Types Crate
//!
//! This crate contains the persisted `TransactionRecord`, the semantic
//! `OutcomeCategory` enumeration and the bounded `ErrorReason` used by every
//! reply subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: The record shape mirrors the
//!   `monibot_transactions` table; column names live only in this crate.
//! - **Opaque Outcome Codes**: `SKIP_*` / `ERROR_*` / `LIMIT_*` codes are
//!   produced upstream and only interpreted by the classifier.
//! - **Bounded Reasons**: failure details are truncated before they reach
//!   storage.

pub mod category;
pub mod entities;
pub mod errors;

pub use category::OutcomeCategory;
pub use entities::*;
pub use errors::*;
