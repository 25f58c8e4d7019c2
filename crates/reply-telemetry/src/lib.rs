//! # Reply Telemetry
//!
//! Logging, tracing and metrics for the MoniBot reply service.
//!
//! ## Components
//!
//! - Structured logs: `tracing-subscriber` with pretty or JSON output
//! - Traces: optional OpenTelemetry OTLP export
//! - Metrics: Prometheus counters served by the runtime at `/metrics`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reply_telemetry::{init_telemetry, TelemetryConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).await.expect("telemetry");
//! }
//! ```
//!
//! ## Settings
//!
//! | Env var | Default | Effect |
//! |---------|---------|--------|
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | `http://localhost:4317` | OTLP collector endpoint |
//! | `OTEL_SERVICE_NAME` | `monibot-reply` | Service name in traces |
//! | `MB_OTLP_ENABLED` | `false` | Export spans over OTLP |
//! | `MB_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `MB_JSON_LOGS` | `true` in containers | JSON log output |

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod logging;
pub mod metrics;
mod tracing_setup;

pub use config::{TelemetryConfig, DEFAULT_OTLP_ENDPOINT, DEFAULT_SERVICE_NAME};
pub use metrics::{encode_metrics, metrics_content_type, register_metrics};
pub use tracing_setup::TracingGuard;

use thiserror::Error;

/// Failures while bringing telemetry up.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// OTLP pipeline could not be built.
    #[error("OTLP tracer setup failed: {0}")]
    TracerInit(String),

    /// A global subscriber was already installed, or installation failed.
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    /// Metric registration or encoding failed.
    #[error("Prometheus metrics error: {0}")]
    MetricsInit(String),

    /// Invalid configuration value.
    #[error("bad telemetry setting: {0}")]
    Config(String),
}

/// Register metrics and install the global subscriber.
///
/// Keep the returned guard alive until exit; dropping it flushes pending
/// spans.
pub async fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    let tracing = tracing_setup::init_tracing(&config).await?;
    Ok(TelemetryGuard { _tracing: tracing })
}

/// Holds the tracer provider for the process lifetime.
pub struct TelemetryGuard {
    _tracing: TracingGuard,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry");
    }
}
