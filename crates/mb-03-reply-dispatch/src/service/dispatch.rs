//! Poll-and-dispatch loop.
//!
//! ```text
//! [IDLE] ──shutdown?──yes──→ exit
//!   │no
//!   ↓
//! [FETCHING] ──error──→ log, count, empty batch
//!   ↓
//! [DISPATCHING] one record at a time; rate limit aborts the batch;
//!   │           pacing sleep after each post when more records remain
//!   ↓
//! [SLEEPING] poll interval, interrupted by shutdown ──→ [IDLE]
//! ```

use super::pipeline::AttemptPipeline;
use crate::domain::{AttemptOutcome, CycleReport, DispatchStats};
use crate::ports::CycleObserver;
use chrono::Utc;
use mb_01_reply_ledger::ReplyLedgerApi;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Single cooperative worker owning the pipeline (and with it the
/// generator's window and backoff state).
pub struct DispatchLoop {
    ledger: Arc<dyn ReplyLedgerApi>,
    pipeline: AttemptPipeline,
    stats: Arc<DispatchStats>,
    observer: Option<Arc<dyn CycleObserver>>,
}

impl DispatchLoop {
    /// Create a loop. `stats` should be the instance given to the pipeline.
    pub fn new(
        ledger: Arc<dyn ReplyLedgerApi>,
        pipeline: AttemptPipeline,
        stats: Arc<DispatchStats>,
    ) -> Self {
        Self {
            ledger,
            pipeline,
            stats,
            observer: None,
        }
    }

    /// Builder: reports every cycle to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn CycleObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Shared counters.
    pub fn stats(&self) -> Arc<DispatchStats> {
        Arc::clone(&self.stats)
    }

    /// Runs one poll cycle to completion.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let started = Utc::now();
        self.stats.record_poll(started);
        let generation_before = self.pipeline.generation_stats();
        let batch_size = self.pipeline.config().batch_size;
        let pacing = self.pipeline.config().post_pacing;

        debug!(at = %started.to_rfc3339(), "[mb-03] Polling for unreplied records");

        let mut report = CycleReport::default();
        let records = match self.ledger.fetch_eligible(batch_size).await {
            Ok(records) => records,
            Err(err) => {
                self.stats.record_error();
                error!(error = %err, "[mb-03] Poll failed");
                report.fetch_failed = true;
                Vec::new()
            }
        };
        report.fetched = records.len();

        if records.is_empty() {
            debug!("[mb-03] No unreplied records found");
        } else {
            info!(count = records.len(), "[mb-03] Found records to reply to");
        }

        let total = records.len();
        for (index, record) in records.iter().enumerate() {
            let attempt = self.pipeline.process(record).await;
            if attempt.ledger.is_none() {
                report.ledger_errors += 1;
            }
            let outcome = attempt.outcome.clone();
            report.attempts.push(attempt);

            match outcome {
                AttemptOutcome::RateLimited { .. } => {
                    report.aborted = true;
                    info!(
                        remaining = total - index - 1,
                        "[mb-03] Rate limited, ending cycle early"
                    );
                    break;
                }
                AttemptOutcome::Posted { .. } if index + 1 < total && !pacing.is_zero() => {
                    tokio::time::sleep(pacing).await;
                }
                _ => {}
            }
        }

        report.generation = self.pipeline.generation_stats().since(&generation_before);

        if let Some(observer) = &self.observer {
            observer.on_cycle(&report);
        }
        report
    }

    /// Polls until `shutdown` turns true (or its sender is dropped).
    ///
    /// A cycle in progress always completes; the signal is honoured at the
    /// idle boundary and interrupts the sleep between polls.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let interval = self.pipeline.config().poll_interval;
        info!(
            poll_interval_ms = interval.as_millis() as u64,
            batch_size = self.pipeline.config().batch_size,
            "[mb-03] Dispatch loop started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let report = self.run_cycle().await;
            debug!(
                fetched = report.fetched,
                posted = report.posted(),
                skipped = report.skipped(),
                errors = report.errors(),
                "[mb-03] Cycle complete"
            );

            if *shutdown.borrow() {
                break;
            }

            let sender_gone = tokio::select! {
                changed = shutdown.changed() => changed.is_err(),
                _ = tokio::time::sleep(interval) => false,
            };
            if sender_gone {
                break;
            }
        }

        info!(
            cycles = self.stats.cycles(),
            processed = self.stats.processed(),
            errors = self.stats.errors(),
            "[mb-03] Dispatch loop stopped"
        );
    }
}
