//! # Ports Module
//!
//! Outbound (Driven) ports of the dispatch subsystem: `ReplyPoster` and
//! `CycleObserver`. The driving side is the ledger's `ReplyLedgerApi` and the
//! content crate's `ReplyGenerator`, consumed directly.

pub mod outbound;

pub use outbound::*;
