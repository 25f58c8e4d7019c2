//! # Ports Module
//!
//! Hexagonal architecture ports:
//! - Inbound (Driving): `ReplyGenerator`, used by the dispatch pipeline
//! - Outbound (Driven): `GenerationBackend`, `TimeSource`

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
