//! # MoniBot Reply Service
//!
//! Polls the transaction ledger, generates replies for settled or rejected
//! payments and posts them, until SIGINT/SIGTERM.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (logs, optional OTLP, metrics registry)
//! 2. Load configuration from the environment
//! 3. Build adapters and wire the dispatch loop
//! 4. Start the health server and the dispatch loop
//! 5. On signal, let the current cycle finish, then stop the server

use std::net::SocketAddr;

use anyhow::{Context, Result};
use reply_runtime::container::{ReplyConfig, ServiceContainer};
use reply_runtime::health;
use reply_telemetry::{init_telemetry, log_reply_event, TelemetryConfig};
use tokio::sync::watch;
use tracing::error;

/// Top-level process: the wired service plus its shutdown channel.
struct ReplyRuntime {
    container: ServiceContainer,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl ReplyRuntime {
    fn new(config: ReplyConfig) -> Result<Self> {
        let container =
            ServiceContainer::build(config).context("Failed to build service adapters")?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            container,
            shutdown_tx,
            shutdown_rx,
        })
    }

    async fn run(self) -> Result<()> {
        let config = self.container.config.clone();
        log_reply_event!(
            info,
            "runtime",
            "MoniBot reply service starting",
            version = env!("CARGO_PKG_VERSION"),
            chain = %config.chain,
            strategy = ?config.strategy,
            ledger = ?config.ledger_backend,
            poll_interval_ms = config.poll_interval.as_millis() as u64,
            batch_size = config.batch_size,
            max_retries = config.max_retries
        );

        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let router = health::router(self.container.stats.clone(), &config.chain);
        let mut server = tokio::spawn(health::serve(addr, router, self.shutdown_rx.clone()));
        let dispatch = tokio::spawn(self.container.into_dispatch().run(self.shutdown_rx));

        let early_exit = tokio::select! {
            signal = wait_for_shutdown_signal() => {
                match signal {
                    Ok(name) => {
                        log_reply_event!(info, "runtime", "Shutdown signal received", signal = name)
                    }
                    Err(e) => error!(error = %e, "[runtime] Signal handling failed, stopping"),
                }
                None
            }
            result = &mut server => Some(result),
        };

        // The loop finishes its current cycle before observing this.
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = dispatch.await {
            error!(error = %e, "[runtime] Dispatch task failed");
        }

        let server_result = match early_exit {
            Some(result) => result,
            None => server.await,
        };
        server_result
            .context("Health server task failed")?
            .context("Health server error")?;

        log_reply_event!(info, "runtime", "Shutdown complete");
        Ok(())
    }
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, returning which signal fired.
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to register SIGTERM handler")?;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => Ok("SIGINT"),
            _ = sigterm.recv() => Ok("SIGTERM"),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl+C")?;
        Ok("SIGINT")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())
        .await
        .context("Failed to initialize telemetry")?;

    let config = ReplyConfig::from_env().context("Invalid configuration")?;
    ReplyRuntime::new(config)?.run().await
}
