//! # MB-03 Reply Dispatch
//!
//! Polls the ledger and drives each eligible record through
//! generate → post → ledger update.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Fetch a bounded, oldest-first batch on a fixed interval
//! - Close records that owe no reply without posting
//! - Classify post failures as non-recoverable, recoverable or rate-limited
//! - Pace successive posts and end the cycle early on a rate limit
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | No post without a target post id | `service/pipeline.rs` - `process()` |
//! | INVARIANT-2 | A rate-limited attempt ends the batch | `service/dispatch.rs` - `run_cycle()` |
//! | INVARIANT-3 | Errors never escape the loop | `service/pipeline.rs` - `close()` / `count_failure()` |
//! | INVARIANT-4 | Shutdown never interrupts a cycle | `service/dispatch.rs` - `run()` |
//! | INVARIANT-5 | A record is posted at most once, even when its ledger write fails | `service/pipeline.rs` - `settle()` |
//!
//! ## Attempt Outcomes
//!
//! | Post result | Ledger call | Outcome |
//! |-------------|-------------|---------|
//! | no target post | `mark_replied("NO_TWEET_ID")` | `Skipped` |
//! | silent upstream code | `mark_replied("SKIP_<code>")` | `Skipped` |
//! | success | `mark_replied(None)` | `Posted` |
//! | posted earlier, ledger write failed | `mark_replied(None)` | `Skipped("ALREADY_POSTED")` |
//! | not found / duplicate / unavailable | `mark_replied(reason)` | `NonRecoverable` |
//! | 429 | `record_failure(reason)` | `RateLimited` |
//! | anything else (incl. timeout) | `record_failure(reason)` | `Recoverable` |
//!
//! ## Module Structure
//!
//! ```text
//! mb-03-reply-dispatch/
//! ├── domain/     # DispatchConfig, AttemptOutcome, CycleReport, PostError, DispatchStats
//! ├── ports/      # ReplyPoster, CycleObserver (outbound)
//! ├── adapters/   # TwitterPoster (X API v2)
//! └── service/    # AttemptPipeline, DispatchLoop
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{TwitterConfig, TwitterPoster};
pub use domain::{
    AttemptOutcome, CycleReport, DispatchConfig, DispatchStats, HealthSnapshot, PostError,
    PostedReply, ReplyAttempt, SentinelPolicy,
};
pub use ports::{CycleObserver, MockPostResponse, MockReplyPoster, NoopObserver, ReplyPoster};
pub use service::{AttemptPipeline, DispatchLoop, ALREADY_POSTED};
