//! # Domain Layer - Reply Ledger
//!
//! - `entities`: LedgerConfig, EligibilityQuery, RecordPatch, field access types
//! - `policy`: pure retry/terminal transitions
//! - `errors`: LedgerError

pub mod entities;
pub mod errors;
pub mod policy;

pub use entities::*;
pub use errors::*;
pub use policy::*;
