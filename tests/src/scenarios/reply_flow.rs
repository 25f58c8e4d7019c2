//! # Reply Flow Scenarios
//!
//! One record at a time through fetch → classify → generate → post →
//! ledger, checking the row afterwards.
//!
//! | Record | Post result | Expected row |
//! |--------|-------------|--------------|
//! | no target post | none | replied, `NO_TWEET_ID` |
//! | `ERROR_BALANCE`, retry 2 of 3 | transport error | replied, retry 3, exhaustion reason |
//! | three settled | 429 on first | first retry 1, others untouched |
//! | settled | not found | replied, retry unchanged |
//! | settled | success, ledger down until next cycle | replied once, posted once |

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use mb_01_reply_ledger::{
        InMemoryRecordStore, LedgerConfig, LedgerUpdate, ReplyLedger, ReplyLedgerApi,
    };
    use mb_02_reply_content::OutcomeClassifier;
    use mb_03_reply_dispatch::{
        AttemptOutcome, AttemptPipeline, DispatchConfig, DispatchLoop, DispatchStats,
        MockPostResponse, MockReplyPoster, PostError, PostedReply, ReplyPoster, SentinelPolicy,
        ALREADY_POSTED,
    };
    use shared_types::{PaymentKind, TransactionRecord, REASON_MAX_RETRIES, REASON_NO_TARGET};

    use crate::fixtures::{at, seeded_templates, settled, unpaced, Scenario};

    // =========================================================================
    // TERMINAL WITHOUT POSTING
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_record_without_target_is_closed_without_posting() {
        let record = TransactionRecord::new("a1", "BSC", at(0)).with_outcome("0xabc");
        let mut s = Scenario::new(vec![record]);

        let report = s.dispatch.run_cycle().await;

        assert_eq!(s.poster.call_count(), 0);
        assert_eq!(report.skipped(), 1);
        let row = s.row("a1");
        assert!(row.replied);
        assert_eq!(row.error_reason.as_deref(), Some(REASON_NO_TARGET));
        assert_eq!(row.retry_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silence_all_closes_upstream_codes() {
        let record = TransactionRecord::new("s1", "BSC", at(0))
            .with_outcome("ERROR_BALANCE")
            .with_post("t1");
        let mut s = Scenario::builder(vec![record])
            .dispatch(DispatchConfig {
                sentinel_policy: SentinelPolicy::SilenceAll,
                ..unpaced()
            })
            .build();

        s.dispatch.run_cycle().await;

        assert_eq!(s.poster.call_count(), 0);
        let row = s.row("s1");
        assert!(row.replied);
        assert_eq!(row.error_reason.as_deref(), Some("SKIP_ERROR_BALANCE"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_known_upstream_code_gets_a_reply_by_default() {
        let record = TransactionRecord::new("k1", "BSC", at(0))
            .with_outcome("ERROR_BALANCE")
            .with_post("t1");
        let mut s = Scenario::new(vec![record]);

        let report = s.dispatch.run_cycle().await;

        assert_eq!(report.posted(), 1);
        assert_eq!(s.targets(), vec!["t1"]);
        assert!(s.row("k1").replied);
        assert_eq!(s.row("k1").error_reason, None);
    }

    // =========================================================================
    // RETRY CEILING
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_last_recoverable_failure_exhausts_record() {
        let mut record = TransactionRecord::new("e1", "BSC", at(0))
            .with_outcome("ERROR_BALANCE")
            .with_post("t1");
        record.retry_count = 2;
        let mut s = Scenario::new(vec![record]);
        s.poster
            .fail_next(PostError::Transport("connection reset".into()));

        let report = s.dispatch.run_cycle().await;

        assert_eq!(report.attempts.len(), 1);
        assert!(matches!(
            report.attempts[0].outcome,
            AttemptOutcome::Recoverable { .. }
        ));
        assert_eq!(
            report.attempts[0].ledger,
            Some(LedgerUpdate::Exhausted { retry_count: 3 })
        );
        let row = s.row("e1");
        assert_eq!(row.retry_count, 3);
        assert!(row.replied);
        assert!(row
            .error_reason
            .as_deref()
            .is_some_and(|r| r.starts_with(REASON_MAX_RETRIES)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_record_is_never_fetched_again() {
        let mut record = settled("e2", 0);
        record.retry_count = 2;
        let mut s = Scenario::builder(vec![record]).dispatch(unpaced()).build();
        s.poster.fail_next(PostError::Timeout);

        s.dispatch.run_cycle().await;
        let second = s.dispatch.run_cycle().await;

        assert_eq!(second.fetched, 0);
        assert_eq!(s.poster.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recoverable_failure_is_retried_next_cycle() {
        let mut s = Scenario::builder(vec![settled("r1", 0)])
            .dispatch(unpaced())
            .build();
        s.poster.fail_next(PostError::Service {
            status: 503,
            message: "Service Unavailable".into(),
        });

        s.dispatch.run_cycle().await;
        assert_eq!(s.row("r1").retry_count, 1);
        assert!(!s.row("r1").replied);

        let report = s.dispatch.run_cycle().await;
        assert_eq!(report.posted(), 1);
        let row = s.row("r1");
        assert!(row.replied);
        assert_eq!(row.retry_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_post_timeout_counts_as_recoverable() {
        let mut s = Scenario::builder(vec![settled("slow", 0)])
            .dispatch(DispatchConfig {
                post_timeout: Duration::from_secs(5),
                ..unpaced()
            })
            .build();
        s.poster
            .push(MockPostResponse::Delay(Duration::from_secs(60)));

        let report = s.dispatch.run_cycle().await;

        assert!(matches!(
            report.attempts[0].outcome,
            AttemptOutcome::Recoverable { .. }
        ));
        assert_eq!(s.row("slow").retry_count, 1);
    }

    // =========================================================================
    // RATE LIMITS
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_halts_the_batch() {
        let mut s = Scenario::new(vec![settled("a", 1), settled("b", 2), settled("c", 3)]);
        s.poster.fail_next(PostError::Service {
            status: 400,
            message: "Request failed with code 429".into(),
        });

        let report = s.dispatch.run_cycle().await;

        assert!(report.aborted);
        assert_eq!(s.targets(), vec!["post-a"]);
        assert_eq!(s.row("a").retry_count, 1);
        assert!(!s.row("a").replied);
        for id in ["b", "c"] {
            let row = s.row(id);
            assert_eq!(row.retry_count, 0);
            assert!(!row.replied);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_batch_resumes_next_cycle() {
        let mut s = Scenario::builder(vec![settled("a", 1), settled("b", 2)])
            .dispatch(unpaced())
            .build();
        s.poster.fail_next(PostError::RateLimited { reset_at: None });

        s.dispatch.run_cycle().await;
        let report = s.dispatch.run_cycle().await;

        assert_eq!(report.posted(), 2);
        assert_eq!(s.targets(), vec!["post-a", "post-a", "post-b"]);
    }

    // =========================================================================
    // NON-RECOVERABLE
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_not_found_closes_record_without_counting() {
        let mut record = settled("n1", 0);
        record.retry_count = 1;
        let mut s = Scenario::new(vec![record]);
        s.poster.fail_next(PostError::NotFound);

        let report = s.dispatch.run_cycle().await;

        assert!(matches!(
            report.attempts[0].outcome,
            AttemptOutcome::NonRecoverable { .. }
        ));
        let row = s.row("n1");
        assert!(row.replied);
        assert_eq!(row.retry_count, 1);
        assert!(row.error_reason.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_and_unavailable_close_records() {
        let mut s = Scenario::builder(vec![settled("d1", 1), settled("u1", 2)])
            .dispatch(unpaced())
            .build();
        s.poster.fail_next(PostError::DuplicateContent);
        s.poster
            .fail_next(PostError::TargetUnavailable("tweet deleted".into()));

        let report = s.dispatch.run_cycle().await;

        assert_eq!(report.count("non_recoverable"), 2);
        assert!(s.row("d1").replied);
        assert!(s.row("u1").replied);
        assert_eq!(s.stats.errors(), 2);
    }

    // =========================================================================
    // CONTENT
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_reply_texts_differ_within_a_batch() {
        let records = (0..5)
            .map(|i| {
                settled(&format!("g{i}"), i)
                    .with_kind(PaymentKind::Grant)
                    .with_recipient("alice")
            })
            .collect();
        let mut s = Scenario::builder(records).dispatch(unpaced()).build();

        s.dispatch.run_cycle().await;

        let texts: Vec<String> = s.poster.calls().into_iter().map(|(_, t)| t).collect();
        assert_eq!(texts.len(), 5);
        for (i, a) in texts.iter().enumerate() {
            for b in &texts[i + 1..] {
                assert!(mb_02_reply_content::jaccard(a, b) <= 0.7, "{a:?} vs {b:?}");
            }
        }
    }

    // =========================================================================
    // LEDGER OUTAGE AFTER A SUCCESSFUL POST
    // =========================================================================

    /// Delivers the reply, then takes the store offline before the ledger
    /// write lands.
    struct StoreDropsAfterPost {
        inner: Arc<MockReplyPoster>,
        store: Arc<InMemoryRecordStore>,
    }

    #[async_trait]
    impl ReplyPoster for StoreDropsAfterPost {
        async fn post_reply(
            &self,
            target_post_id: &str,
            text: &str,
        ) -> Result<PostedReply, PostError> {
            let posted = self.inner.post_reply(target_post_id, text).await;
            self.store.set_unavailable(true);
            posted
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_post_is_not_repeated_when_ledger_write_fails() {
        let store = Arc::new(InMemoryRecordStore::with_records(vec![settled("o1", 0)]));
        let ledger: Arc<dyn ReplyLedgerApi> =
            Arc::new(ReplyLedger::new(LedgerConfig::default(), Arc::clone(&store)));
        let inner = Arc::new(MockReplyPoster::new());
        let poster = Arc::new(StoreDropsAfterPost {
            inner: Arc::clone(&inner),
            store: Arc::clone(&store),
        });
        let stats = Arc::new(DispatchStats::new());
        let pipeline = AttemptPipeline::new(
            Arc::clone(&ledger),
            Box::new(seeded_templates(5)),
            poster,
            OutcomeClassifier::default(),
            unpaced(),
            Arc::clone(&stats),
        );
        let mut dispatch = DispatchLoop::new(ledger, pipeline, stats);

        let first = dispatch.run_cycle().await;
        assert_eq!(first.posted(), 1);
        assert_eq!(first.ledger_errors, 1);

        store.set_unavailable(false);
        assert!(!store.records()[0].replied);
        let second = dispatch.run_cycle().await;

        assert_eq!(inner.call_count(), 1);
        assert_eq!(second.attempts.len(), 1);
        assert_eq!(
            second.attempts[0].outcome,
            AttemptOutcome::Skipped {
                reason: ALREADY_POSTED.into()
            }
        );
        assert_eq!(second.ledger_errors, 0);
        let row = store.records().remove(0);
        assert!(row.replied);
        assert_eq!(row.error_reason, None);
        assert_eq!(row.retry_count, 0);

        let third = dispatch.run_cycle().await;
        assert_eq!(third.fetched, 0);
        assert_eq!(inner.call_count(), 1);
    }
}
