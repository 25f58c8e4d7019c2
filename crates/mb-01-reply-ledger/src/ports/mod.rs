//! # Ports Module
//!
//! Hexagonal architecture ports:
//! - Inbound (Driving): `ReplyLedgerApi`, used by the dispatch loop
//! - Outbound (Driven): `RecordStore`, the table-like persistence collaborator

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
