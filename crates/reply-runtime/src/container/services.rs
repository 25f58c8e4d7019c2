//! # Service Container
//!
//! Builds the adapters named by [`ReplyConfig`] and wires them into one
//! dispatch loop.
//!
//! ## Wiring
//!
//! ```text
//! RecordStore (supabase | memory[+seed]) → ReplyLedger ─────────────┐
//! GenerationBackend (http) ──→ GenerativeReplyGenerator ─┐      │
//!                          or TemplateReplyGenerator ────┼──→ AttemptPipeline ──→ DispatchLoop
//! ReplyPoster (X API v2) ─────────────────────────────────┘            │
//!                                                     MetricsObserver ←┘
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mb_01_reply_ledger::{
    InMemoryRecordStore, LedgerError, ReplyLedger, ReplyLedgerApi, SupabaseConfig,
    SupabaseRecordStore,
};
use mb_02_reply_content::{
    GenerationError, GenerativeReplyGenerator, HttpBackendConfig, HttpGenerationBackend,
    ReplyGenerator, SystemTimeSource, TemplateReplyGenerator,
};
use mb_03_reply_dispatch::{
    AttemptPipeline, CycleObserver, DispatchLoop, DispatchStats, PostError, ReplyPoster,
    TwitterConfig, TwitterPoster,
};
use shared_types::TransactionRecord;
use thiserror::Error;
use tracing::{info, warn};

use crate::container::config::{LedgerBackend, ReplyConfig, ReplyStrategy};
use crate::observer::MetricsObserver;

/// Adapter construction failures.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Ledger client could not be built.
    #[error("ledger adapter: {0}")]
    Ledger(#[from] LedgerError),
    /// Generation backend client could not be built.
    #[error("generation adapter: {0}")]
    Generation(#[from] GenerationError),
    /// Posting client could not be built.
    #[error("posting adapter: {0}")]
    Posting(#[from] PostError),
    /// A setting required by the selected backend is absent.
    #[error("missing settings for {0}")]
    MissingSettings(&'static str),
    /// Memory ledger seed file could not be loaded.
    #[error("ledger seed {path}: {reason}")]
    Seed {
        /// File that was read.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },
}

/// Fully wired service, ready to run.
pub struct ServiceContainer {
    /// Configuration it was built from.
    pub config: ReplyConfig,
    /// Counters shared with the health surface.
    pub stats: Arc<DispatchStats>,
    /// Ledger, shared with the pipeline.
    pub ledger: Arc<dyn ReplyLedgerApi>,
    dispatch: DispatchLoop,
}

impl ServiceContainer {
    /// Build every adapter named by `config`.
    pub fn build(config: ReplyConfig) -> Result<Self, ContainerError> {
        let ledger = build_ledger(&config)?;
        let generator = build_generator(&config)?;
        let poster: Arc<dyn ReplyPoster> = Arc::new(TwitterPoster::new(
            TwitterConfig::new(config.twitter_access_token.clone())
                .with_api_base(config.twitter_api_base.clone()),
        )?);

        info!(
            chain = %config.chain,
            ledger = ?config.ledger_backend,
            strategy = generator.strategy(),
            "[runtime] Adapters built"
        );

        Ok(Self::assemble(
            config,
            ledger,
            generator,
            poster,
            Arc::new(MetricsObserver::new()),
        ))
    }

    /// Wire already-built parts.
    pub fn assemble(
        config: ReplyConfig,
        ledger: Arc<dyn ReplyLedgerApi>,
        generator: Box<dyn ReplyGenerator>,
        poster: Arc<dyn ReplyPoster>,
        observer: Arc<dyn CycleObserver>,
    ) -> Self {
        let stats = Arc::new(DispatchStats::new());
        let pipeline = AttemptPipeline::new(
            Arc::clone(&ledger),
            generator,
            poster,
            config.classifier(),
            config.dispatch(),
            Arc::clone(&stats),
        );
        let dispatch = DispatchLoop::new(Arc::clone(&ledger), pipeline, Arc::clone(&stats))
            .with_observer(observer);

        Self {
            config,
            stats,
            ledger,
            dispatch,
        }
    }

    /// Mutable access to the loop, e.g. to run single cycles.
    pub fn dispatch_mut(&mut self) -> &mut DispatchLoop {
        &mut self.dispatch
    }

    /// Hands the loop over for running.
    pub fn into_dispatch(self) -> DispatchLoop {
        self.dispatch
    }
}

fn build_ledger(config: &ReplyConfig) -> Result<Arc<dyn ReplyLedgerApi>, ContainerError> {
    let ledger: Arc<dyn ReplyLedgerApi> = match config.ledger_backend {
        LedgerBackend::Memory => {
            let records = match &config.memory_seed {
                Some(path) => load_seed(path)?,
                None => {
                    warn!("[runtime] Memory ledger has no seed file and will stay empty");
                    Vec::new()
                }
            };
            Arc::new(ReplyLedger::new(
                config.ledger(),
                Arc::new(InMemoryRecordStore::with_records(records)),
            ))
        }
        LedgerBackend::Supabase => {
            let settings = config
                .supabase
                .as_ref()
                .ok_or(ContainerError::MissingSettings("supabase ledger"))?;
            let store = SupabaseRecordStore::new(
                SupabaseConfig::new(settings.url.clone(), settings.service_key.clone())
                    .with_table(settings.table.clone()),
            )?;
            Arc::new(ReplyLedger::new(config.ledger(), Arc::new(store)))
        }
    };
    Ok(ledger)
}

/// Reads a JSON array of `monibot_transactions` rows.
fn load_seed(path: &Path) -> Result<Vec<TransactionRecord>, ContainerError> {
    let seed_error = |reason: String| ContainerError::Seed {
        path: path.to_path_buf(),
        reason,
    };
    let raw = std::fs::read_to_string(path).map_err(|e| seed_error(e.to_string()))?;
    let records: Vec<TransactionRecord> =
        serde_json::from_str(&raw).map_err(|e| seed_error(e.to_string()))?;
    info!(
        path = %path.display(),
        records = records.len(),
        "[runtime] Memory ledger seeded"
    );
    Ok(records)
}

fn build_generator(config: &ReplyConfig) -> Result<Box<dyn ReplyGenerator>, ContainerError> {
    let templates = TemplateReplyGenerator::new(config.classifier()).with_labels(config.labels());
    match config.strategy {
        ReplyStrategy::Template => Ok(Box::new(templates)),
        ReplyStrategy::Generative => {
            let settings = config
                .generative
                .as_ref()
                .ok_or(ContainerError::MissingSettings("generative strategy"))?;
            let backend = HttpGenerationBackend::new(HttpBackendConfig::new(
                settings.url.clone(),
                settings.anon_key.clone(),
            ))?;
            Ok(Box::new(GenerativeReplyGenerator::new(
                Arc::new(backend),
                templates,
                Arc::new(SystemTimeSource),
                config.generative_config(),
            )))
        }
    }
}
