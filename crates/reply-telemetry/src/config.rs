//! Logging and export settings, read from the process environment.

use std::env;

/// Default service name reported in traces.
pub const DEFAULT_SERVICE_NAME: &str = "monibot-reply";

/// Default OTLP collector endpoint (gRPC).
pub const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4317";

/// Configuration for logging and tracing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// `service.name` resource attribute.
    pub service_name: String,

    /// OpenTelemetry OTLP endpoint
    pub otlp_endpoint: String,

    /// Whether spans are exported over OTLP
    pub otlp_enabled: bool,

    /// `EnvFilter` directive, e.g. `info` or `mb_03_reply_dispatch=debug`.
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Deployment environment attached to exported spans
    pub environment: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            otlp_endpoint: DEFAULT_OTLP_ENDPOINT.to_string(),
            otlp_enabled: false,
            log_level: "info".to_string(),
            json_logs: false,
            environment: "development".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Reads settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: monibot-reply)
    /// - `OTEL_EXPORTER_OTLP_ENDPOINT`: Collector endpoint (default: http://localhost:4317)
    /// - `MB_OTLP_ENABLED`: Export spans over OTLP (default: false)
    /// - `MB_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `MB_JSON_LOGS`: JSON logs (default: true inside containers)
    /// - `MB_ENVIRONMENT`: Deployment environment (default: development)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let is_container = lookup("KUBERNETES_SERVICE_HOST").is_some()
            || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name),

            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or(defaults.otlp_endpoint),

            otlp_enabled: lookup("MB_OTLP_ENABLED")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),

            log_level: lookup("MB_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            json_logs: lookup("MB_JSON_LOGS")
                .map(|v| is_truthy(&v))
                .unwrap_or(is_container),

            environment: lookup("MB_ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
