//! Template strategy.
//!
//! Shuffles the record's bank and takes the first candidate that is not too
//! close to anything in the recent-reply window. When the whole bank is
//! exhausted the first shuffled candidate gets a uniqueness suffix.

use crate::domain::{BankKey, ChainLabels, OutcomeClassifier, RecentReplyWindow};
use crate::ports::{GenerationStats, ReplyGenerator, SystemTimeSource, TimeSource};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use shared_types::TransactionRecord;
use std::sync::Arc;
use tracing::debug;

/// A selected template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatePick {
    /// Text as posted.
    pub text: String,
    /// `text` ends in the ` TX: ...<last 4>` uniqueness suffix.
    pub tx_tagged: bool,
}

/// Template-bank reply generator.
pub struct TemplateReplyGenerator {
    classifier: OutcomeClassifier,
    labels: ChainLabels,
    window: RecentReplyWindow,
    rng: StdRng,
    clock: Arc<dyn TimeSource>,
    stats: GenerationStats,
}

impl TemplateReplyGenerator {
    /// Entropy-seeded generator on the wall clock.
    pub fn new(classifier: OutcomeClassifier) -> Self {
        Self::from_parts(classifier, StdRng::from_entropy(), Arc::new(SystemTimeSource))
    }

    /// Deterministic generator for tests.
    pub fn with_seed(classifier: OutcomeClassifier, seed: u64, clock: Arc<dyn TimeSource>) -> Self {
        Self::from_parts(classifier, StdRng::seed_from_u64(seed), clock)
    }

    fn from_parts(classifier: OutcomeClassifier, rng: StdRng, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            classifier,
            labels: ChainLabels::default(),
            window: RecentReplyWindow::default(),
            rng,
            clock,
            stats: GenerationStats::default(),
        }
    }

    /// Builder: chain and token names filled into the bank texts.
    pub fn with_labels(mut self, labels: ChainLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Classifier in use.
    pub fn classifier(&self) -> &OutcomeClassifier {
        &self.classifier
    }

    /// Chain and token names in use.
    pub fn labels(&self) -> &ChainLabels {
        &self.labels
    }

    /// Recent-reply window.
    pub fn window(&self) -> &RecentReplyWindow {
        &self.window
    }

    /// Picks a reply and records it in the window.
    pub fn select(&mut self, record: &TransactionRecord) -> String {
        self.pick(record).text
    }

    /// Like [`select`](Self::select), also reporting which suffix was used.
    pub fn pick(&mut self, record: &TransactionRecord) -> TemplatePick {
        let category = self.classifier.classify(record);
        let bank = BankKey::for_outcome(category, &record.kind);

        let mut candidates = bank.rendered(&self.labels);
        candidates.shuffle(&mut self.rng);

        let pick = match candidates.iter().find(|c| self.window.is_distinct(c)) {
            Some(candidate) => TemplatePick {
                text: candidate.clone(),
                tx_tagged: false,
            },
            None => {
                let base = candidates
                    .first()
                    .map(String::as_str)
                    .unwrap_or("Transaction processed");
                let (suffix, tx_tagged) = self.uniqueness_suffix(record);
                debug!(
                    record = %record.id.short(),
                    bank = ?bank,
                    "[mb-02] Template bank exhausted, suffix appended"
                );
                TemplatePick {
                    text: format!("{}{}", base, suffix),
                    tx_tagged,
                }
            }
        };

        self.window.push(pick.text.clone());
        self.stats.generated += 1;
        pick
    }

    /// ` TX: ...<last 4>` of the outcome code, or a base-36 timestamp.
    /// The flag is set for the code form.
    fn uniqueness_suffix(&self, record: &TransactionRecord) -> (String, bool) {
        let code = record.outcome().trim();
        if code.is_empty() {
            (format!(" [{}]", to_base36(self.clock.now_ms())), false)
        } else {
            let tail: String = {
                let chars: Vec<char> = code.chars().collect();
                chars[chars.len().saturating_sub(4)..].iter().collect()
            };
            (format!(" TX: ...{}", tail), true)
        }
    }
}

#[async_trait]
impl ReplyGenerator for TemplateReplyGenerator {
    async fn generate(&mut self, record: &TransactionRecord) -> String {
        self.select(record)
    }

    fn strategy(&self) -> &'static str {
        "template"
    }

    fn stats(&self) -> GenerationStats {
        self.stats
    }
}

/// Lower-case base-36 rendering.
pub fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
