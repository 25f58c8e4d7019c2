//! # Ledger Properties
//!
//! Randomized end-to-end checks over the real ledger and dispatch loop:
//!
//! - terminal rows are never written again
//! - `retry_count` never decreases, never passes the ceiling, and reaching
//!   the ceiling implies `replied`
//! - a fetch returns at most the limit, oldest first, eligible rows only

#[cfg(test)]
mod tests {
    use mb_01_reply_ledger::{LedgerConfig, LedgerUpdate};
    use mb_03_reply_dispatch::{MockPostResponse, PostError};
    use proptest::prelude::*;
    use shared_types::{ErrorReason, RecordId, TransactionRecord};

    use crate::fixtures::{at, settled, unpaced, Scenario};

    fn paused_runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .start_paused(true)
            .build()
            .unwrap()
    }

    fn response(code: u8) -> MockPostResponse {
        match code % 5 {
            0 => MockPostResponse::Success,
            1 => MockPostResponse::Fail(PostError::Transport("connection reset".into())),
            2 => MockPostResponse::Fail(PostError::NotFound),
            3 => MockPostResponse::Fail(PostError::RateLimited { reset_at: None }),
            _ => MockPostResponse::Fail(PostError::Unauthorized { status: 401 }),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_retry_state_is_monotonic_and_terminal_rows_frozen(
            initial in prop::collection::vec((0u32..4, any::<bool>()), 1..8),
            script in prop::collection::vec(0u8..5, 0..30),
            ceiling in 1u32..5,
        ) {
            paused_runtime().block_on(async {
                let records = initial
                    .iter()
                    .enumerate()
                    .map(|(i, (retry, replied))| {
                        let mut record = settled(&format!("p{i}"), i as i64);
                        record.retry_count = (*retry).min(ceiling - 1);
                        record.replied = *replied;
                        record
                    })
                    .collect();
                let mut s = Scenario::builder(records)
                    .ledger(LedgerConfig { max_retries: ceiling, ..LedgerConfig::default() })
                    .dispatch(unpaced())
                    .build();
                for code in &script {
                    s.poster.push(response(*code));
                }

                let mut previous = s.store.records();
                for _ in 0..40 {
                    s.dispatch.run_cycle().await;
                    let current = s.store.records();
                    for before in &previous {
                        let after = current
                            .iter()
                            .find(|r| r.id == before.id)
                            .expect("rows are never deleted");
                        if before.replied {
                            assert_eq!(after, before, "terminal row {} was written", before.id);
                        }
                        assert!(after.retry_count >= before.retry_count);
                        assert!(after.retry_count <= ceiling);
                        if after.retry_count == ceiling {
                            assert!(after.replied, "row {} hit the ceiling unreplied", after.id);
                        }
                    }
                    previous = current;
                }

                // Every attempt either terminates a row or spends a retry.
                assert!(s.store.records().iter().all(|r| r.replied));
            });
        }

        #[test]
        fn prop_fetch_is_bounded_ordered_and_eligible(
            rows in prop::collection::vec((0i64..1_000, 0u32..6, any::<bool>(), any::<bool>()), 0..20),
            limit in 1usize..8,
        ) {
            paused_runtime().block_on(async {
                let records: Vec<TransactionRecord> = rows
                    .iter()
                    .enumerate()
                    .map(|(i, (offset, retry, replied, other_chain))| {
                        let mut record = settled(&format!("f{i}"), *offset);
                        record.retry_count = *retry;
                        record.replied = *replied;
                        if *other_chain {
                            record.chain = "Base".into();
                        }
                        record
                    })
                    .collect();
                let eligible = records
                    .iter()
                    .filter(|r| !r.replied && r.retry_count < 3 && r.chain == "BSC")
                    .count();
                let s = Scenario::new(records);

                let fetched = s.ledger.fetch_eligible(limit).await.unwrap();

                assert_eq!(fetched.len(), eligible.min(limit));
                assert!(fetched.windows(2).all(|w| w[0].created_at <= w[1].created_at));
                for record in &fetched {
                    assert!(!record.replied);
                    assert!(record.retry_count < 3);
                    assert_eq!(record.chain, "BSC");
                }
            });
        }
    }

    #[tokio::test]
    async fn test_terminal_row_rejects_every_mutation() {
        let mut record = TransactionRecord::new("t1", "BSC", at(0));
        record.replied = true;
        record.retry_count = 1;
        let s = Scenario::new(vec![record.clone()]);
        let id = RecordId::new("t1");

        let replied = s.ledger.mark_replied(&id, None).await.unwrap();
        let failed = s
            .ledger
            .record_failure(&id, ErrorReason::new("late failure"))
            .await
            .unwrap();

        assert_eq!(replied, LedgerUpdate::AlreadyTerminal);
        assert_eq!(failed, LedgerUpdate::AlreadyTerminal);
        assert_eq!(s.store.write_count(), 0);
        assert_eq!(s.row("t1"), record);
    }
}
