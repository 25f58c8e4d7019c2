//! Prometheus metrics for the reply service.
//!
//! All metrics follow the naming convention: `mb_<area>_<metric>_<unit>`
//!
//! Counters are incremented by the runtime's cycle observer; the health
//! surface serves them through [`encode_metrics`].

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

/// Label values for [`POST_FAILURES`].
pub mod failure_class {
    /// Transient failure, retry budget consumed.
    pub const RECOVERABLE: &str = "recoverable";
    /// Permanent failure, record closed.
    pub const NON_RECOVERABLE: &str = "non_recoverable";
    /// Posting API returned a rate limit.
    pub const RATE_LIMITED: &str = "rate_limited";
}

lazy_static! {
    /// Registry backing `/metrics`.
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // DISPATCH METRICS
    // =========================================================================

    /// Poll cycles run
    pub static ref POLL_CYCLES: Counter = Counter::new(
        "mb_dispatch_poll_cycles_total",
        "Total number of poll cycles"
    ).expect("metric creation failed");

    /// Poll cycles whose fetch failed
    pub static ref POLL_FAILURES: Counter = Counter::new(
        "mb_dispatch_poll_failures_total",
        "Poll cycles that could not fetch eligible records"
    ).expect("metric creation failed");

    /// Records fetched by the most recent poll
    pub static ref LAST_BATCH_SIZE: Gauge = Gauge::new(
        "mb_dispatch_last_batch_size",
        "Number of records fetched by the most recent poll"
    ).expect("metric creation failed");

    /// Batches ended early by a rate limit
    pub static ref RATE_LIMIT_ABORTS: Counter = Counter::new(
        "mb_dispatch_rate_limit_aborts_total",
        "Batches ended early because the posting API rate limited"
    ).expect("metric creation failed");

    // =========================================================================
    // REPLY METRICS
    // =========================================================================

    /// Replies posted
    pub static ref REPLIES_POSTED: Counter = Counter::new(
        "mb_replies_posted_total",
        "Total number of replies posted"
    ).expect("metric creation failed");

    /// Records closed without posting
    pub static ref REPLIES_SKIPPED: Counter = Counter::new(
        "mb_replies_skipped_total",
        "Records closed without a post (no target or silent code)"
    ).expect("metric creation failed");

    /// Post failures by class
    pub static ref POST_FAILURES: CounterVec = CounterVec::new(
        Opts::new("mb_post_failures_total", "Post failures by class"),
        &["class"]  // recoverable / non_recoverable / rate_limited
    ).expect("metric creation failed");

    /// Ledger writes that failed after an attempt
    pub static ref LEDGER_ERRORS: Counter = Counter::new(
        "mb_ledger_write_errors_total",
        "Ledger updates that failed after an attempt"
    ).expect("metric creation failed");

    // =========================================================================
    // GENERATION METRICS
    // =========================================================================

    /// Replies that fell back to template text
    pub static ref GENERATION_FALLBACKS: Counter = Counter::new(
        "mb_generation_fallbacks_total",
        "Replies that used template text instead of the backend"
    ).expect("metric creation failed");

    /// Backoff windows opened
    pub static ref BACKOFF_TRIGGERS: Counter = Counter::new(
        "mb_generation_backoff_triggers_total",
        "Backoff windows opened by rate-limit or quota errors"
    ).expect("metric creation failed");

    /// Backend calls suppressed by an active cooldown
    pub static ref SUPPRESSED_CALLS: Counter = Counter::new(
        "mb_generation_suppressed_calls_total",
        "Backend calls skipped while cooling down"
    ).expect("metric creation failed");
}

/// Adds every reply metric to [`REGISTRY`]. Safe to call more than once.
///
/// Safe to call more than once; already registered collectors are skipped.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Dispatch
        Box::new(POLL_CYCLES.clone()),
        Box::new(POLL_FAILURES.clone()),
        Box::new(LAST_BATCH_SIZE.clone()),
        Box::new(RATE_LIMIT_ABORTS.clone()),
        // Replies
        Box::new(REPLIES_POSTED.clone()),
        Box::new(REPLIES_SKIPPED.clone()),
        Box::new(POST_FAILURES.clone()),
        Box::new(LEDGER_ERRORS.clone()),
        // Generation
        Box::new(GENERATION_FALLBACKS.clone()),
        Box::new(BACKOFF_TRIGGERS.clone()),
        Box::new(SUPPRESSED_CALLS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Renders the registry in the Prometheus text exposition format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Content type for [`encode_metrics`] output.
pub fn metrics_content_type() -> String {
    TextEncoder::new().format_type().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics_is_idempotent() {
        register_metrics().unwrap();
        register_metrics().unwrap();
    }

    #[test]
    fn test_counter_increment() {
        let before = REPLIES_POSTED.get();
        REPLIES_POSTED.inc();
        assert!(REPLIES_POSTED.get() >= before + 1.0);
    }

    #[test]
    fn test_failure_classes_are_labelled() {
        POST_FAILURES
            .with_label_values(&[failure_class::RATE_LIMITED])
            .inc();
        assert!(
            POST_FAILURES
                .with_label_values(&[failure_class::RATE_LIMITED])
                .get()
                >= 1.0
        );
    }

    #[test]
    fn test_encode_contains_registered_names() {
        register_metrics().unwrap();
        POLL_CYCLES.inc();
        let text = encode_metrics().unwrap();
        assert!(text.contains("mb_dispatch_poll_cycles_total"));
        assert!(metrics_content_type().starts_with("text/plain"));
    }
}
