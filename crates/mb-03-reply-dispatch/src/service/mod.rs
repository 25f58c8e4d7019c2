//! Dispatch services: the per-record pipeline and the poll loop.

mod dispatch;
mod pipeline;

pub use dispatch::DispatchLoop;
pub use pipeline::{AttemptPipeline, ALREADY_POSTED};
