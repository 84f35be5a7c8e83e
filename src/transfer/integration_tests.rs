//! Integration Tests for the Transfer Engine
//!
//! Concurrency, atomicity and timeout behaviour against the in-memory store,
//! which takes real per-row locks and stages writes until commit.

#[cfg(test)]
mod integration_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;
    use futures::future::join_all;

    use crate::account::{Account, AccountId};
    use crate::money::{DEFAULT_SCALE, Money};
    use crate::store::{AccountStore, FaultPoint, MemoryStore, TransactionalStore};
    use crate::transfer::engine::{TransferConfig, TransferEngine};
    use crate::transfer::error::TransferError;

    /// Engine + store with seeded accounts
    struct TestHarness {
        engine: Arc<TransferEngine<MemoryStore>>,
        store: Arc<MemoryStore>,
    }

    impl TestHarness {
        async fn new(balances: &[(i64, &str)], timeout: Option<Duration>) -> Self {
            let store = Arc::new(MemoryStore::new());
            for (id, balance) in balances {
                let account = Account::new(AccountId::new(*id), money(balance), Utc::now());
                store.create_account(&account).await.unwrap();
            }
            let engine = Arc::new(TransferEngine::new(
                store.clone(),
                TransferConfig {
                    scale: DEFAULT_SCALE,
                    timeout,
                },
            ));
            Self { engine, store }
        }

        async fn balance(&self, id: i64) -> String {
            self.store
                .get_account(AccountId::new(id))
                .await
                .unwrap()
                .balance
                .to_string()
        }

        async fn total(&self) -> Money {
            self.store
                .accounts()
                .await
                .iter()
                .fold(Money::zero(DEFAULT_SCALE), |acc, a| {
                    acc.checked_add(a.balance).unwrap()
                })
        }
    }

    fn money(s: &str) -> Money {
        Money::parse(s, DEFAULT_SCALE).unwrap()
    }

    // ========================================================================
    // Concurrency
    // ========================================================================

    /// Opposite-direction transfers on the same pair never deadlock
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_opposite_directions_do_not_deadlock() {
        let h = TestHarness::new(&[(1, "10000.00"), (2, "5000.00")], None).await;

        let mut tasks = Vec::new();
        for i in 0..200 {
            let engine = h.engine.clone();
            tasks.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    engine.transfer(1, 2, "50.00").await
                } else {
                    engine.transfer(2, 1, "30.00").await
                }
            }));
        }

        let results = tokio::time::timeout(Duration::from_secs(10), join_all(tasks))
            .await
            .expect("transfers deadlocked");
        for result in results {
            result.unwrap().unwrap();
        }

        // 100 × 50 out of #1, 100 × 30 back in
        assert_eq!(h.balance(1).await, "8000.00");
        assert_eq!(h.balance(2).await, "7000.00");
        assert_eq!(h.store.transfers().await.len(), 200);
    }

    /// Two concurrent opposite transfers end in the same state regardless of
    /// interleaving
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_pair_is_deterministic() {
        for _ in 0..20 {
            let h = TestHarness::new(&[(1, "1000.00"), (2, "500.00")], None).await;

            let (e1, e2) = (h.engine.clone(), h.engine.clone());
            let a = tokio::spawn(async move { e1.transfer(1, 2, "50.00").await });
            let b = tokio::spawn(async move { e2.transfer(2, 1, "30.00").await });
            a.await.unwrap().unwrap();
            b.await.unwrap().unwrap();

            assert_eq!(h.balance(1).await, "980.00");
            assert_eq!(h.balance(2).await, "520.00");
            assert_eq!(h.store.transfers().await.len(), 2);
        }
    }

    /// Total money is conserved and no balance goes negative under mixed load,
    /// including transfers rejected for insufficient funds
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_conservation_under_load() {
        let h = TestHarness::new(
            &[(1, "100.00"), (2, "250.50"), (3, "0"), (4, "75.25")],
            Some(Duration::from_secs(5)),
        )
        .await;
        let before = h.total().await;

        let amounts = ["0.01", "1.00", "12.34", "40.00", "99.99", "150.00"];
        let mut tasks = Vec::new();
        for i in 0..300usize {
            let from = (i % 4) as i64 + 1;
            let to = ((i * 7 + 1) % 4) as i64 + 1;
            let amount = amounts[i % amounts.len()];
            let engine = h.engine.clone();
            tasks.push(tokio::spawn(async move {
                engine.transfer(from, to, amount).await
            }));
        }

        let mut committed = 0;
        for result in join_all(tasks).await {
            match result.unwrap() {
                Ok(_) => committed += 1,
                Err(TransferError::InsufficientBalance { .. }) | Err(TransferError::SameAccount) => {}
                Err(other) => panic!("unexpected failure: {other:?}"),
            }
        }

        assert_eq!(h.total().await, before);
        for account in h.store.accounts().await {
            assert!(!account.balance.is_negative(), "{account:?}");
        }
        // One ledger row per committed transfer, none for rejected ones
        assert_eq!(h.store.transfers().await.len(), committed);
    }

    // ========================================================================
    // Atomicity
    // ========================================================================

    /// A failure at any step leaves balances and the ledger untouched and
    /// releases every lock
    #[tokio::test]
    async fn test_failure_at_each_step_rolls_back() {
        let points = [
            FaultPoint::Begin,
            FaultPoint::LockAccount(AccountId::new(1)),
            FaultPoint::LockAccount(AccountId::new(2)),
            FaultPoint::SaveAccount(AccountId::new(1)),
            FaultPoint::SaveAccount(AccountId::new(2)),
            FaultPoint::AppendTransfer,
            FaultPoint::Commit,
        ];

        for point in points {
            let h = TestHarness::new(&[(1, "1000.00"), (2, "500.00")], None).await;
            h.store.inject_fault(point);

            let err = h.engine.transfer(1, 2, "100.00").await.unwrap_err();
            match point {
                FaultPoint::Commit => {
                    assert!(matches!(err, TransferError::CommitFailure(_)), "{point}: {err:?}")
                }
                _ => assert!(matches!(err, TransferError::Store(_)), "{point}: {err:?}"),
            }

            assert_eq!(h.balance(1).await, "1000.00", "{point}");
            assert_eq!(h.balance(2).await, "500.00", "{point}");
            assert!(h.store.transfers().await.is_empty(), "{point}");

            // Locks were released: the same transfer now goes through promptly
            h.store.clear_faults();
            tokio::time::timeout(Duration::from_secs(1), h.engine.transfer(1, 2, "100.00"))
                .await
                .unwrap_or_else(|_| panic!("{point}: lock leaked"))
                .unwrap();
            assert_eq!(h.balance(1).await, "900.00");
            assert_eq!(h.balance(2).await, "600.00");
        }
    }

    /// A transfer that cannot get its lock in time is rolled back and never
    /// committed later
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timeout_rolls_back() {
        let h = TestHarness::new(
            &[(1, "1000.00"), (2, "500.00")],
            Some(Duration::from_millis(100)),
        )
        .await;

        // Another transaction holds account 2
        let mut blocker = h.store.begin().await.unwrap();
        h.store
            .get_account_for_update(&mut blocker, AccountId::new(2))
            .await
            .unwrap();

        assert_eq!(
            h.engine.transfer(1, 2, "100.00").await,
            Err(TransferError::Timeout)
        );

        drop(blocker);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(h.balance(1).await, "1000.00");
        assert_eq!(h.balance(2).await, "500.00");
        assert!(h.store.transfers().await.is_empty());

        // Account 1's lock was released with the abandoned scope
        h.engine.transfer(1, 2, "100.00").await.unwrap();
        assert_eq!(h.balance(1).await, "900.00");
    }

    // ========================================================================
    // Resubmission
    // ========================================================================

    /// Identical calls are two transfers
    #[tokio::test]
    async fn test_resubmission_is_not_idempotent() {
        let h = TestHarness::new(&[(1, "1000.00"), (2, "200.00")], None).await;

        let first = h.engine.transfer(1, 2, "100.00").await.unwrap();
        let second = h.engine.transfer(1, 2, "100.00").await.unwrap();

        assert_ne!(first.transfer_id, second.transfer_id);
        assert_eq!(h.balance(1).await, "800.00");
        assert_eq!(h.balance(2).await, "400.00");
        assert_eq!(h.store.transfers().await.len(), 2);
    }
}
