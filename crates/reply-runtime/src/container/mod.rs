//! # Service Container
//!
//! Configuration plus the wiring of ledger, content and dispatch.

pub mod config;
pub mod services;

pub use config::{
    ConfigError, GenerativeSettings, LedgerBackend, ReplyConfig, ReplyStrategy, SupabaseSettings,
    DEFAULT_PORT,
};
pub use services::{ContainerError, ServiceContainer};
