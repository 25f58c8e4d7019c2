//! # Generative Strategy Scenarios
//!
//! The backend-driven generator inside the full dispatch loop: fallback to
//! templates, cooldown after throttling, and recovery.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mb_02_reply_content::{
        GeneratedText, GenerationError, GenerativeConfig, GenerativeReplyGenerator,
        MockGenerationBackend, MockTimeSource, OutcomeClassifier, TemplateReplyGenerator,
    };
    use shared_types::{OutcomeCategory, TransactionRecord};

    use crate::fixtures::{at, settled, unpaced, Scenario};

    const AI_TEXT: &str = "Payment landed, enjoy it";

    struct Generative {
        backend: Arc<MockGenerationBackend>,
        clock: Arc<MockTimeSource>,
        scenario: Scenario,
    }

    fn generative(records: Vec<TransactionRecord>) -> Generative {
        let backend = Arc::new(MockGenerationBackend::new(AI_TEXT));
        let clock = Arc::new(MockTimeSource::new(5_000_000));
        let templates =
            TemplateReplyGenerator::with_seed(OutcomeClassifier::default(), 3, clock.clone());
        let generator = GenerativeReplyGenerator::new(
            backend.clone(),
            templates,
            clock.clone(),
            GenerativeConfig::default(),
        );
        let scenario = Scenario::builder(records)
            .dispatch(unpaced())
            .generator(Box::new(generator))
            .build();
        Generative {
            backend,
            clock,
            scenario,
        }
    }

    fn texts(g: &Generative) -> Vec<String> {
        g.scenario
            .poster
            .calls()
            .into_iter()
            .map(|(_, text)| text)
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_text_carries_audit_suffix() {
        let record = settled("a", 0).with_recipient("alice");
        let hash = record.outcome().to_string();
        let mut g = generative(vec![record]);

        g.scenario.dispatch.run_cycle().await;

        let text = &texts(&g)[0];
        assert!(text.starts_with(AI_TEXT));
        assert!(text.contains(" → monitag: alice"));
        assert!(text.ends_with(&format!("\n\nTx: {}...", &hash[..18])));
        assert_eq!(g.backend.last_action().as_deref(), Some("generate-reply"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_codes_get_no_audit_suffix() {
        let record = TransactionRecord::new("b", "BSC", at(0))
            .with_outcome("ERROR_ALLOWANCE")
            .with_post("t-b");
        let mut g = generative(vec![record]);

        g.scenario.dispatch.run_cycle().await;

        assert_eq!(texts(&g), vec![AI_TEXT.to_string()]);
        let context = g.backend.last_context().unwrap();
        assert_eq!(context.tx_hash.as_deref(), Some("ERROR_ALLOWANCE"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttled_backend_suppresses_calls_until_cooldown_ends() {
        let mut g = generative(vec![settled("a", 1), settled("b", 2), settled("c", 3)]);
        g.backend.push_response(Err(GenerationError::RateLimited));

        let report = g.scenario.dispatch.run_cycle().await;

        // First record throttled, the other two never reach the backend.
        assert_eq!(g.backend.call_count(), 1);
        assert_eq!(report.posted(), 3);
        assert_eq!(report.generation.backoff_triggers, 1);
        assert_eq!(report.generation.fallbacks, 3);
        assert_eq!(report.generation.suppressed_calls, 2);
        assert!(texts(&g).iter().all(|t| !t.starts_with(AI_TEXT)));

        g.scenario.store.insert(settled("d", 4));
        g.clock.advance(60_000);
        let report = g.scenario.dispatch.run_cycle().await;

        assert_eq!(g.backend.call_count(), 2);
        assert_eq!(report.generation.fallbacks, 0);
        assert!(texts(&g)[3].starts_with(AI_TEXT));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_and_fallback_flag_use_templates() {
        let mut g = generative(vec![settled("a", 1), settled("b", 2)]);
        g.backend
            .push_response(Ok(GeneratedText::fallback("server-side fallback")));
        g.backend.push_response(Err(GenerationError::QuotaExhausted));

        let report = g.scenario.dispatch.run_cycle().await;

        assert_eq!(report.posted(), 2);
        assert_eq!(report.generation.fallbacks, 2);
        assert_eq!(report.generation.backoff_triggers, 1);
        assert!(texts(&g).iter().all(|t| !t.contains("server-side fallback")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_throttling_doubles_and_caps_cooldown() {
        let mut g = generative(vec![]);
        // (seconds to advance before the cycle, backend reached?)
        let steps = [
            (0, true),     // throttled: 60s
            (60, true),    // throttled: 120s
            (60, false),
            (60, true),    // throttled: 240s
            (239, false),
            (1, true),     // throttled: 300s
            (300, true),   // throttled: 300s, capped
            (299, false),
            (1, true),
        ];

        for (i, (advance_secs, reaches_backend)) in steps.into_iter().enumerate() {
            g.clock.advance(advance_secs * 1_000);
            g.backend.push_response(Err(GenerationError::RateLimited));
            g.scenario.store.insert(settled(&format!("r{i}"), i as i64));
            let before = g.backend.call_count();

            let report = g.scenario.dispatch.run_cycle().await;

            assert_eq!(report.posted(), 1, "step {i}");
            assert_eq!(
                g.backend.call_count() > before,
                reaches_backend,
                "step {i} after {advance_secs}s"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_campaign_limit_is_sent_as_its_own_category() {
        let record = TransactionRecord::new("l1", "BSC", at(0))
            .with_outcome("LIMIT_REACHED")
            .with_post("t-l1");
        let mut g = generative(vec![record]);

        g.scenario.dispatch.run_cycle().await;

        let context = g.backend.last_context().unwrap();
        assert_eq!(context.category, OutcomeCategory::CampaignLimitReached);
        assert_eq!(context.tweet_id.as_deref(), Some("t-l1"));
    }
}
