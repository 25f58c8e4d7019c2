//! # Test Fixtures
//!
//! Record builders and a fully wired dispatch harness over the in-memory
//! store and scripted poster.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use mb_01_reply_ledger::{InMemoryRecordStore, LedgerConfig, ReplyLedger, ReplyLedgerApi};
use mb_02_reply_content::{MockTimeSource, OutcomeClassifier, ReplyGenerator, TemplateReplyGenerator};
use mb_03_reply_dispatch::{
    AttemptPipeline, CycleObserver, DispatchConfig, DispatchLoop, DispatchStats, MockReplyPoster,
};
use shared_types::{RecordId, TransactionRecord};

/// Base creation time of fixture records (2023-11-14T22:13:20Z).
pub const EPOCH_SECS: i64 = 1_700_000_000;

/// `EPOCH_SECS + offset`.
pub fn at(offset_secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(EPOCH_SECS + offset_secs, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Settled BSC payment owed a reply to `post-<id>`.
pub fn settled(id: &str, offset_secs: i64) -> TransactionRecord {
    TransactionRecord::new(id, "BSC", at(offset_secs))
        .with_outcome(format!("0x{:064x}", offset_secs.unsigned_abs()))
        .with_post(format!("post-{id}"))
}

/// Template generator with a fixed seed and clock.
pub fn seeded_templates(seed: u64) -> TemplateReplyGenerator {
    TemplateReplyGenerator::with_seed(
        OutcomeClassifier::default(),
        seed,
        Arc::new(MockTimeSource::new(at(0).timestamp_millis() as u64)),
    )
}

/// Dispatch settings without pacing, so paused-clock tests stay short.
pub fn unpaced() -> DispatchConfig {
    DispatchConfig {
        post_pacing: std::time::Duration::ZERO,
        ..DispatchConfig::default()
    }
}

/// Ledger, poster and loop wired the way the runtime wires them.
pub struct Scenario {
    /// Backing rows.
    pub store: Arc<InMemoryRecordStore>,
    /// Ledger over `store`.
    pub ledger: Arc<dyn ReplyLedgerApi>,
    /// Scripted poster.
    pub poster: Arc<MockReplyPoster>,
    /// Shared counters.
    pub stats: Arc<DispatchStats>,
    /// The loop under test.
    pub dispatch: DispatchLoop,
}

impl Scenario {
    /// Defaults: BSC, ceiling 3, batch 5, seeded templates.
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        ScenarioBuilder::new(records).build()
    }

    /// Builder for non-default settings.
    pub fn builder(records: Vec<TransactionRecord>) -> ScenarioBuilder {
        ScenarioBuilder::new(records)
    }

    /// Current state of a row.
    pub fn row(&self, id: &str) -> TransactionRecord {
        self.store
            .get(&RecordId::new(id))
            .unwrap_or_else(|| panic!("fixture row {id} missing"))
    }

    /// Post targets in call order.
    pub fn targets(&self) -> Vec<String> {
        self.poster.calls().into_iter().map(|(target, _)| target).collect()
    }
}

/// Builder for [`Scenario`].
pub struct ScenarioBuilder {
    records: Vec<TransactionRecord>,
    ledger: LedgerConfig,
    dispatch: DispatchConfig,
    generator: Option<Box<dyn ReplyGenerator>>,
    observer: Option<Arc<dyn CycleObserver>>,
}

impl ScenarioBuilder {
    fn new(records: Vec<TransactionRecord>) -> Self {
        Self {
            records,
            ledger: LedgerConfig::default(),
            dispatch: DispatchConfig::default(),
            generator: None,
            observer: None,
        }
    }

    /// Ledger settings.
    pub fn ledger(mut self, config: LedgerConfig) -> Self {
        self.ledger = config;
        self
    }

    /// Dispatch settings.
    pub fn dispatch(mut self, config: DispatchConfig) -> Self {
        self.dispatch = config;
        self
    }

    /// Replaces the seeded template generator.
    pub fn generator(mut self, generator: Box<dyn ReplyGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Cycle observer.
    pub fn observer(mut self, observer: Arc<dyn CycleObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Wire everything.
    pub fn build(self) -> Scenario {
        let store = Arc::new(InMemoryRecordStore::with_records(self.records));
        let ledger: Arc<dyn ReplyLedgerApi> =
            Arc::new(ReplyLedger::new(self.ledger, Arc::clone(&store)));
        let poster = Arc::new(MockReplyPoster::new());
        let stats = Arc::new(DispatchStats::new());
        let generator = self
            .generator
            .unwrap_or_else(|| Box::new(seeded_templates(7)));
        let pipeline = AttemptPipeline::new(
            Arc::clone(&ledger),
            generator,
            poster.clone(),
            OutcomeClassifier::default(),
            self.dispatch,
            Arc::clone(&stats),
        );
        let mut dispatch = DispatchLoop::new(Arc::clone(&ledger), pipeline, Arc::clone(&stats));
        if let Some(observer) = self.observer {
            dispatch = dispatch.with_observer(observer);
        }

        Scenario {
            store,
            ledger,
            poster,
            stats,
            dispatch,
        }
    }
}
