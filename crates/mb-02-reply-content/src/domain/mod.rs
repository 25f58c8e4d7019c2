//! # Domain Layer
//!
//! Pure reply-content logic: classification, template banks, similarity,
//! backoff state and the generation context.

pub mod backoff;
pub mod classifier;
pub mod context;
pub mod errors;
pub mod similarity;
pub mod templates;

pub use backoff::*;
pub use classifier::*;
pub use context::*;
pub use errors::*;
pub use similarity::*;
pub use templates::*;
