//! # Runtime Scenarios
//!
//! The container as the binary wires it: configuration from a lookup, the
//! metrics observer, the loop under a shutdown channel, and the health
//! surface reading the same counters.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use mb_01_reply_ledger::{InMemoryRecordStore, ReplyLedger, ReplyLedgerApi};
    use mb_03_reply_dispatch::{MockPostResponse, MockReplyPoster, PostError};
    use reply_runtime::{health, MetricsObserver, ReplyConfig, ServiceContainer};
    use shared_types::TransactionRecord;
    use tokio::sync::watch;
    use tower::ServiceExt;

    use crate::fixtures::{at, seeded_templates, settled};

    fn config(pairs: &[(&str, &str)]) -> ReplyConfig {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ReplyConfig::from_lookup(move |key| {
            pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    struct Running {
        store: Arc<InMemoryRecordStore>,
        poster: Arc<MockReplyPoster>,
        container: ServiceContainer,
    }

    fn running(records: Vec<TransactionRecord>, pairs: &[(&str, &str)]) -> Running {
        let mut all = vec![("LEDGER_BACKEND", "memory"), ("TWITTER_ACCESS_TOKEN", "t")];
        all.extend_from_slice(pairs);
        let cfg = config(&all);

        let store = Arc::new(InMemoryRecordStore::with_records(records));
        let ledger: Arc<dyn ReplyLedgerApi> =
            Arc::new(ReplyLedger::new(cfg.ledger(), Arc::clone(&store)));
        let poster = Arc::new(MockReplyPoster::new());
        let container = ServiceContainer::assemble(
            cfg,
            ledger,
            Box::new(seeded_templates(11)),
            poster.clone(),
            Arc::new(MetricsObserver::new()),
        );
        Running {
            store,
            poster,
            container,
        }
    }

    async fn health_json(container: &ServiceContainer) -> serde_json::Value {
        let app = health::router(Arc::clone(&container.stats), &container.config.chain);
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_drains_backlog_then_stops_on_signal() {
        let Running {
            store,
            poster,
            container,
        } = running(
            vec![settled("a", 1), settled("b", 2), settled("c", 3)],
            &[("POLL_INTERVAL_MS", "10000"), ("BATCH_SIZE", "2"), ("POST_PACING_MS", "0")],
        );
        let stats = Arc::clone(&container.stats);
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(container.into_dispatch().run(rx));
        tokio::time::sleep(Duration::from_secs(15)).await;

        assert_eq!(stats.cycles(), 2);
        assert_eq!(poster.call_count(), 3);
        assert!(store.records().iter().all(|r| r.replied));

        tx.send(true).unwrap();
        handle.await.unwrap();
        assert_eq!(stats.cycles(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_reflects_cycles_and_errors() {
        let mut r = running(
            vec![settled("ok", 1), settled("bad", 2)],
            &[("POST_PACING_MS", "0"), ("CHAIN", "BSC")],
        );
        r.poster.push(MockPostResponse::Success);
        r.poster.fail_next(PostError::Transport("reset".into()));

        r.container.dispatch_mut().run_cycle().await;
        let json = health_json(&r.container).await;

        assert_eq!(json["status"], "ok");
        assert_eq!(json["chain"], "BSC");
        assert_eq!(json["cycleCount"], 1);
        assert_eq!(json["processedCount"], 1);
        assert_eq!(json["errorCount"], 1);
        assert!(json["lastPoll"].is_string());
    }

    #[tokio::test(start_paused = true)]
    async fn test_metrics_observer_feeds_exposition() {
        reply_telemetry::register_metrics().unwrap();
        let record = TransactionRecord::new("m1", "BSC", at(0)).with_outcome("0x01");
        let mut r = running(vec![record], &[]);

        r.container.dispatch_mut().run_cycle().await;

        let app = health::router(Arc::clone(&r.container.stats), "BSC");
        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("mb_dispatch_poll_cycles_total"));
        assert!(body.contains("mb_replies_skipped_total"));
        assert_eq!(r.poster.call_count(), 0);
    }
}
