//! Attempt pipeline: drives one record through generate → post → ledger.

use crate::domain::{
    AttemptOutcome, DispatchConfig, DispatchStats, PostError, ReplyAttempt, SentinelPolicy,
};
use crate::ports::ReplyPoster;
use mb_01_reply_ledger::{LedgerUpdate, ReplyLedgerApi};
use mb_02_reply_content::{is_upstream_code, GenerationStats, OutcomeClassifier, ReplyGenerator};
use shared_types::{ErrorReason, OutcomeCategory, RecordId, TransactionRecord, REASON_NO_TARGET};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Attempt reason for a record whose reply went out in an earlier cycle
/// but whose ledger write did not.
pub const ALREADY_POSTED: &str = "ALREADY_POSTED";

/// Processes single records. Never returns an error: every failure is
/// folded into the returned `ReplyAttempt`.
///
/// INVARIANT: a record is posted at most once per process. Posts whose
/// `mark_replied` failed are remembered and only settled, never reposted.
pub struct AttemptPipeline {
    ledger: Arc<dyn ReplyLedgerApi>,
    generator: Box<dyn ReplyGenerator>,
    poster: Arc<dyn ReplyPoster>,
    classifier: OutcomeClassifier,
    config: DispatchConfig,
    stats: Arc<DispatchStats>,
    /// Posted but not yet recorded as replied: record id → post id.
    unsettled: HashMap<RecordId, String>,
}

impl AttemptPipeline {
    /// Create a pipeline.
    pub fn new(
        ledger: Arc<dyn ReplyLedgerApi>,
        generator: Box<dyn ReplyGenerator>,
        poster: Arc<dyn ReplyPoster>,
        classifier: OutcomeClassifier,
        config: DispatchConfig,
        stats: Arc<DispatchStats>,
    ) -> Self {
        Self {
            ledger,
            generator,
            poster,
            classifier,
            config,
            stats,
            unsettled: HashMap::new(),
        }
    }

    /// Records posted whose ledger write is still outstanding.
    pub fn unsettled(&self) -> usize {
        self.unsettled.len()
    }

    /// Dispatch configuration.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Counters of the owned generator.
    pub fn generation_stats(&self) -> GenerationStats {
        self.generator.stats()
    }

    /// Runs one record through the pipeline.
    pub async fn process(&mut self, record: &TransactionRecord) -> ReplyAttempt {
        let id = record.id.clone();
        debug!(
            record = %id.short(),
            kind = record.kind.as_str(),
            outcome = record.outcome(),
            "[mb-03] Processing record"
        );

        if let Some(post_id) = self.unsettled.get(&id).cloned() {
            return self.settle(id, post_id).await;
        }

        let Some(target) = record.reply_target() else {
            info!(record = %id.short(), "[mb-03] No post to reply to, closing record");
            let ledger = self
                .close(&id, Some(ErrorReason::new(REASON_NO_TARGET)))
                .await;
            return skipped(id, REASON_NO_TARGET.to_string(), ledger);
        };

        if let Some(code) = self.silent_code(record) {
            let reason = format!("SKIP_{}", code);
            info!(record = %id.short(), code, "[mb-03] Upstream code needs no reply, closing record");
            let ledger = self.close(&id, Some(ErrorReason::new(&reason))).await;
            return skipped(id, reason, ledger);
        }

        let text = self.generator.generate(record).await;
        debug!(
            record = %id.short(),
            strategy = self.generator.strategy(),
            text = %text,
            "[mb-03] Reply generated"
        );

        let result = match tokio::time::timeout(
            self.config.post_timeout,
            self.poster.post_reply(target, &text),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(PostError::Timeout),
        };

        let (outcome, ledger) = match result {
            Ok(posted) => {
                let ledger = self.close(&id, None).await;
                self.stats.record_processed();
                info!(
                    record = %id.short(),
                    post_id = %posted.post_id,
                    "[mb-03] Reply posted"
                );
                if ledger.is_none() {
                    warn!(
                        record = %id.short(),
                        "[mb-03] Reply posted but not recorded; holding record back from reposting"
                    );
                    self.unsettled.insert(id.clone(), posted.post_id.clone());
                }
                (
                    AttemptOutcome::Posted {
                        post_id: posted.post_id,
                    },
                    ledger,
                )
            }
            Err(err) if err.is_rate_limited() => {
                self.stats.record_error();
                warn!(record = %id.short(), error = %err, "[mb-03] Rate limited, aborting batch");
                let ledger = self.count_failure(&id, err.reason()).await;
                (
                    AttemptOutcome::RateLimited {
                        reason: err.to_string(),
                    },
                    ledger,
                )
            }
            Err(err) if !err.is_recoverable() => {
                self.stats.record_error();
                warn!(record = %id.short(), error = %err, "[mb-03] Non-recoverable post failure");
                let ledger = self.close(&id, Some(err.reason())).await;
                (
                    AttemptOutcome::NonRecoverable {
                        reason: err.to_string(),
                    },
                    ledger,
                )
            }
            Err(err) => {
                self.stats.record_error();
                warn!(record = %id.short(), error = %err, "[mb-03] Recoverable post failure");
                let ledger = self.count_failure(&id, err.reason()).await;
                (
                    AttemptOutcome::Recoverable {
                        reason: err.to_string(),
                    },
                    ledger,
                )
            }
        };

        ReplyAttempt {
            record_id: id,
            text: Some(text),
            outcome,
            ledger,
        }
    }

    /// Retries the ledger write for a reply that already went out.
    async fn settle(&mut self, id: RecordId, post_id: String) -> ReplyAttempt {
        let ledger = self.close(&id, None).await;
        if ledger.is_some() {
            self.unsettled.remove(&id);
            info!(record = %id.short(), post_id = %post_id, "[mb-03] Earlier reply recorded");
        }
        skipped(id, ALREADY_POSTED.to_string(), ledger)
    }

    /// Code that should be closed without a reply, if any.
    fn silent_code<'a>(&self, record: &'a TransactionRecord) -> Option<&'a str> {
        let code = record.outcome().trim();
        let silent = match self.config.sentinel_policy {
            SentinelPolicy::SilenceAll => code.starts_with("SKIP_") || code.starts_with("ERROR_"),
            SentinelPolicy::ReplyKnown => {
                is_upstream_code(code)
                    && self.classifier.classify(record) == OutcomeCategory::GenericError
            }
        };
        silent.then_some(code)
    }

    async fn close(&self, id: &RecordId, reason: Option<ErrorReason>) -> Option<LedgerUpdate> {
        match self.ledger.mark_replied(id, reason).await {
            Ok(update) => Some(update),
            Err(err) => {
                self.stats.record_error();
                error!(record = %id.short(), error = %err, "[mb-03] Failed to mark record replied");
                None
            }
        }
    }

    async fn count_failure(&self, id: &RecordId, reason: ErrorReason) -> Option<LedgerUpdate> {
        match self.ledger.record_failure(id, reason).await {
            Ok(update) => {
                if let LedgerUpdate::Exhausted { retry_count } = update {
                    warn!(record = %id.short(), retry_count, "[mb-03] Retry budget exhausted");
                }
                Some(update)
            }
            Err(err) => {
                self.stats.record_error();
                error!(record = %id.short(), error = %err, "[mb-03] Failed to record failure");
                None
            }
        }
    }
}

fn skipped(record_id: RecordId, reason: String, ledger: Option<LedgerUpdate>) -> ReplyAttempt {
    ReplyAttempt {
        record_id,
        text: None,
        outcome: AttemptOutcome::Skipped { reason },
        ledger,
    }
}
