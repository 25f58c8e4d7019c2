//! # Reply Runtime Library
//!
//! Exposes the runtime's wiring for tests. The entry point is the
//! `monibot-reply` binary in `main.rs`.
//!
//! ## Modules
//!
//! - `container/` - environment configuration and adapter wiring
//! - `health` - `/health` and `/metrics` over axum
//! - `observer` - cycle reports to Prometheus counters

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod container;
pub mod health;
pub mod observer;

pub use container::{ConfigError, ContainerError, ReplyConfig, ServiceContainer};
pub use observer::MetricsObserver;
