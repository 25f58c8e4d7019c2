//! Retry/terminal transition rules.
//!
//! Pure functions: given the current counter and the ceiling they return the
//! patch to write and the resulting `LedgerUpdate`.

use super::entities::{LedgerUpdate, RecordPatch};
use shared_types::ErrorReason;

/// Transition for one recoverable failure.
///
/// - `current + 1 < ceiling`: counter incremented, record stays eligible.
/// - `current + 1 >= ceiling`: counter incremented and record terminated
///   with a `MAX_RETRIES_EXCEEDED` reason.
/// - `current >= ceiling` (record inserted past the ceiling): terminated
///   without touching the counter.
pub fn failure_transition(
    current: u32,
    ceiling: u32,
    reason: &ErrorReason,
) -> (RecordPatch, LedgerUpdate) {
    if current >= ceiling {
        return (
            RecordPatch {
                replied: Some(true),
                retry_count: None,
                error_reason: Some(ErrorReason::exhausted(reason)),
            },
            LedgerUpdate::Exhausted {
                retry_count: current,
            },
        );
    }

    let next = current + 1;
    if next >= ceiling {
        (
            RecordPatch {
                replied: Some(true),
                retry_count: Some(next),
                error_reason: Some(ErrorReason::exhausted(reason)),
            },
            LedgerUpdate::Exhausted { retry_count: next },
        )
    } else {
        (
            RecordPatch {
                replied: None,
                retry_count: Some(next),
                error_reason: Some(reason.clone()),
            },
            LedgerUpdate::RetryScheduled { retry_count: next },
        )
    }
}
