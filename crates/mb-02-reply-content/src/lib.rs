//! # MB-02 Reply Content
//!
//! Turns a transaction record into reply text.
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Classify a record's outcome code into a semantic category
//! - Rotate template replies without bot-like repetition
//! - Ask a generation backend for text, backing off on quota/rate-limit
//!   responses and falling back to templates on any failure
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Classification is pure and first-match-wins | `domain/classifier.rs` - `OutcomeClassifier::classify()` |
//! | INVARIANT-2 | No two unsuffixed replies within 50 are > 0.7 similar | `service/template.rs` - `select()` |
//! | INVARIANT-3 | No backend call while cooling down | `service/generative.rs` - `request_text()` |
//! | INVARIANT-4 | Cooldown doubles from 60s and caps at 300s | `domain/backoff.rs` - `BackoffGovernor::trigger()` |
//! | INVARIANT-5 | `generate` never fails and never returns empty text | `ports/inbound.rs` - `ReplyGenerator` |
//!
//! ## Strategies
//!
//! ```text
//! template:    classify → bank → shuffle → first distinct candidate (or suffixed) → window
//! generative:  cooling down? ──yes──→ template
//!                    │no
//!                    └→ backend ──text──→ reset governor
//!                              ├─429/402─→ trigger governor → template
//!                              └─other───→ template
//!              success hash → append " → monitag: <tag>\n\nTx: <hash[..18]>..."
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! mb-02-reply-content/
//! ├── domain/     # classifier, templates, similarity, backoff, context, errors
//! ├── ports/      # ReplyGenerator (inbound), GenerationBackend + TimeSource (outbound)
//! ├── adapters/   # HttpGenerationBackend
//! └── service/    # TemplateReplyGenerator, GenerativeReplyGenerator
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{HttpBackendConfig, HttpGenerationBackend};
pub use domain::{
    classify, is_upstream_code, jaccard, BackoffConfig, BackoffGovernor, BackoffState, BankKey,
    ChainLabels, GenerationContext, GenerationError, OutcomeClassifier, RecentReplyWindow,
    GENERATE_REPLY_ACTION, RECENT_WINDOW_CAPACITY, SIMILARITY_THRESHOLD,
};
pub use ports::{
    GeneratedText, GenerationBackend, GenerationStats, MockGenerationBackend, MockTimeSource,
    ReplyGenerator, SystemTimeSource, TimeSource,
};
pub use service::{
    GenerativeConfig, GenerativeReplyGenerator, TemplatePick, TemplateReplyGenerator,
};
