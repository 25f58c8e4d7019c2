//! Structured logging helpers.
//!
//! Every event carries a `subsystem` field so JSON logs can be split per
//! component (`ledger`, `content`, `dispatch`, `runtime`).

/// Log an event tagged with its subsystem.
#[macro_export]
macro_rules! log_reply_event {
    (info, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    (error, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a record-scoped event with the standard `record_id` field.
#[macro_export]
macro_rules! log_record_event {
    ($level:ident, $subsystem:expr, $msg:expr, $record_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            record_id = %$record_id,
            $($($field)*,)?
            $msg
        )
    };
}
