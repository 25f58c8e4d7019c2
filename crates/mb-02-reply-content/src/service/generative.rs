//! Generative strategy.
//!
//! Asks the generation backend for text unless the backoff governor is
//! cooling down. Every failure path ends in template text, so `generate`
//! never fails.

use super::template::TemplateReplyGenerator;
use crate::domain::{
    BackoffConfig, BackoffGovernor, ChainLabels, GenerationContext, GENERATE_REPLY_ACTION,
};
use crate::ports::{GenerationBackend, GenerationStats, ReplyGenerator, TimeSource};
use async_trait::async_trait;
use shared_types::TransactionRecord;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Length of the hash prefix kept in the audit suffix.
pub const SHORT_HASH_LEN: usize = 18;

/// Label placed before the recipient tag in the audit suffix.
pub const DEFAULT_RECIPIENT_LABEL: &str = "monitag";

/// Settings of the generative strategy.
#[derive(Debug, Clone)]
pub struct GenerativeConfig {
    /// Chain/token labels sent to the backend.
    pub labels: ChainLabels,
    /// Label for the recipient tag in the audit suffix.
    pub recipient_label: String,
    /// Backoff tuning.
    pub backoff: BackoffConfig,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            labels: ChainLabels::default(),
            recipient_label: DEFAULT_RECIPIENT_LABEL.to_string(),
            backoff: BackoffConfig::default(),
        }
    }
}

/// Backend-driven reply generator with template fallback.
pub struct GenerativeReplyGenerator<B: GenerationBackend> {
    backend: Arc<B>,
    governor: BackoffGovernor,
    fallback: TemplateReplyGenerator,
    clock: Arc<dyn TimeSource>,
    config: GenerativeConfig,
    stats: GenerationStats,
}

impl<B: GenerationBackend> GenerativeReplyGenerator<B> {
    /// Create a generator. `fallback` supplies text whenever the backend
    /// is skipped or fails, and takes over `config.labels`.
    pub fn new(
        backend: Arc<B>,
        fallback: TemplateReplyGenerator,
        clock: Arc<dyn TimeSource>,
        config: GenerativeConfig,
    ) -> Self {
        Self {
            backend,
            governor: BackoffGovernor::new(config.backoff),
            fallback: fallback.with_labels(config.labels.clone()),
            clock,
            config,
            stats: GenerationStats::default(),
        }
    }

    /// Backoff governor.
    pub fn governor(&self) -> &BackoffGovernor {
        &self.governor
    }

    /// Asks the backend, honouring the cooldown. `None` means fall back.
    async fn request_text(&mut self, record: &TransactionRecord) -> Option<String> {
        let now = self.clock.now_ms();
        if self.governor.is_cooling_down(now) {
            self.stats.suppressed_calls += 1;
            debug!(
                record = %record.id.short(),
                remaining_secs = self.governor.remaining_ms(now).div_ceil(1000),
                "[mb-02] In backoff period, skipping generation backend"
            );
            return None;
        }

        let category = self.fallback.classifier().classify(record);
        let context = GenerationContext::from_record(record, category, &self.config.labels);

        match self.backend.generate(GENERATE_REPLY_ACTION, &context).await {
            Ok(response) => match response.usable_text() {
                Some(text) => {
                    self.governor.reset();
                    Some(text.to_string())
                }
                None => {
                    debug!(
                        record = %record.id.short(),
                        backend_fallback = response.fallback,
                        "[mb-02] Backend returned no usable text"
                    );
                    None
                }
            },
            Err(err) if err.triggers_backoff() => {
                let duration = self.governor.trigger(now);
                self.stats.backoff_triggers += 1;
                warn!(
                    record = %record.id.short(),
                    error = %err,
                    backoff_secs = duration.div_ceil(1000),
                    "[mb-02] Generation backend throttled, backoff set"
                );
                None
            }
            Err(err) => {
                warn!(
                    record = %record.id.short(),
                    error = %err,
                    "[mb-02] Generation request failed"
                );
                None
            }
        }
    }

    /// ` → <label>: <tag>` plus the truncated hash on a new line.
    fn audit_suffix(&self, record: &TransactionRecord) -> Option<String> {
        let prefix = self.fallback.classifier().success_prefix();
        if !record.is_success_hash(prefix) {
            return None;
        }

        let hash = record.outcome();
        let short_hash: String = hash.chars().take(SHORT_HASH_LEN).collect();
        let recipient = record
            .recipient_tag
            .as_deref()
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(|tag| format!(" → {}: {}", self.config.recipient_label, tag))
            .unwrap_or_default();

        Some(format!("{}\n\nTx: {}...", recipient, short_hash))
    }
}

#[async_trait]
impl<B: GenerationBackend> ReplyGenerator for GenerativeReplyGenerator<B> {
    async fn generate(&mut self, record: &TransactionRecord) -> String {
        let (base, tx_tagged) = match self.request_text(record).await {
            Some(text) => (text, false),
            None => {
                self.stats.fallbacks += 1;
                let pick = self.fallback.pick(record);
                (pick.text, pick.tx_tagged)
            }
        };
        self.stats.generated += 1;

        // An exhausted-bank fallback already names the transaction.
        if tx_tagged {
            return base;
        }

        match self.audit_suffix(record) {
            Some(suffix) => {
                info!(record = %record.id.short(), "[mb-02] Success reply with tx suffix");
                format!("{}{}", base, suffix)
            }
            None => base,
        }
    }

    fn strategy(&self) -> &'static str {
        "generative"
    }

    fn stats(&self) -> GenerationStats {
        self.stats
    }
}
