//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the `GenerationBackend` outbound port.

mod http_backend;

pub use http_backend::{HttpBackendConfig, HttpGenerationBackend, EDGE_FUNCTION_PATH};
