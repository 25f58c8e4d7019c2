//! Cycle observer feeding the Prometheus counters.

use mb_03_reply_dispatch::{AttemptOutcome, CycleObserver, CycleReport};
use reply_telemetry::log_reply_event;
use reply_telemetry::metrics::{
    failure_class, BACKOFF_TRIGGERS, GENERATION_FALLBACKS, LAST_BATCH_SIZE, LEDGER_ERRORS,
    POLL_CYCLES, POLL_FAILURES, POST_FAILURES, RATE_LIMIT_ABORTS, REPLIES_POSTED,
    REPLIES_SKIPPED, SUPPRESSED_CALLS,
};

/// Translates each [`CycleReport`] into metric increments.
#[derive(Debug, Default)]
pub struct MetricsObserver;

impl MetricsObserver {
    /// Create an observer.
    pub fn new() -> Self {
        Self
    }
}

impl CycleObserver for MetricsObserver {
    fn on_cycle(&self, report: &CycleReport) {
        POLL_CYCLES.inc();
        LAST_BATCH_SIZE.set(report.fetched as f64);
        if report.fetch_failed {
            POLL_FAILURES.inc();
        }
        if report.aborted {
            RATE_LIMIT_ABORTS.inc();
        }

        for attempt in &report.attempts {
            match attempt.outcome {
                AttemptOutcome::Posted { .. } => REPLIES_POSTED.inc(),
                AttemptOutcome::Skipped { .. } => REPLIES_SKIPPED.inc(),
                AttemptOutcome::NonRecoverable { .. } => POST_FAILURES
                    .with_label_values(&[failure_class::NON_RECOVERABLE])
                    .inc(),
                AttemptOutcome::Recoverable { .. } => POST_FAILURES
                    .with_label_values(&[failure_class::RECOVERABLE])
                    .inc(),
                AttemptOutcome::RateLimited { .. } => POST_FAILURES
                    .with_label_values(&[failure_class::RATE_LIMITED])
                    .inc(),
            }
        }

        LEDGER_ERRORS.inc_by(report.ledger_errors as f64);
        GENERATION_FALLBACKS.inc_by(report.generation.fallbacks as f64);
        BACKOFF_TRIGGERS.inc_by(report.generation.backoff_triggers as f64);
        SUPPRESSED_CALLS.inc_by(report.generation.suppressed_calls as f64);

        if report.fetched > 0 || report.fetch_failed {
            log_reply_event!(
                info,
                "dispatch",
                "Cycle summary",
                fetched = report.fetched,
                posted = report.posted(),
                skipped = report.skipped(),
                errors = report.errors(),
                aborted = report.aborted
            );
        }
    }
}
