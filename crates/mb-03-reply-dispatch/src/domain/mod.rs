//! # Domain Layer
//!
//! Dispatch configuration, attempt outcomes, posting errors and counters.

pub mod entities;
pub mod errors;
pub mod stats;

pub use entities::*;
pub use errors::*;
pub use stats::*;
