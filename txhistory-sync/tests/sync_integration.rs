//! End-to-end history sync tests against an in-memory indexer

mod common;

use common::{cached_tx, raw_tx, server_history, txids, MockBackend, RecordingClock, NOW};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use txhistory_core::{TxAction, TxInputCoin, TxNote};
use txhistory_sync::{
    BackendError, Error, HistorySyncEvent, HistorySyncer, RetryConfig, SyncConfig, SyncOptions,
    SyncState, TxCoins, WalletCredentials, WalletRecord,
};

fn syncer(config: SyncConfig) -> (HistorySyncer, Arc<RecordingClock>) {
    let clock = Arc::new(RecordingClock::default());
    (HistorySyncer::with_clock(config, clock.clone()), clock)
}

fn btc_wallet(backend: Arc<MockBackend>) -> WalletRecord {
    WalletRecord::new("wallet-1", WalletCredentials::new("srv-1", "btc"), backend)
}

fn cached_wallet(
    credentials: WalletCredentials,
    backend: Arc<MockBackend>,
    history: Vec<txhistory_core::Transaction>,
    valid: bool,
) -> WalletRecord {
    WalletRecord::with_state(
        "wallet-1",
        credentials,
        backend,
        SyncState {
            transaction_history: history,
            is_transaction_history_valid: valid,
            transaction_history_on_progress: false,
        },
    )
}

fn page_limits(first: usize, rest: usize) -> SyncConfig {
    SyncConfig {
        first_page_limit: first,
        page_limit: rest,
        ..SyncConfig::default()
    }
}

#[tokio::test]
async fn test_empty_cache_single_page() {
    let backend = MockBackend::with_history(server_history(3));
    let wallet = btc_wallet(backend.clone());
    let (syncer, _) = syncer(SyncConfig::default());

    let history = syncer.sync(&wallet, SyncOptions::default()).await.unwrap();

    assert_eq!(txids(&history), vec!["tx0", "tx1", "tx2"]);
    assert!(history.iter().all(|tx| tx.recent));
    assert_eq!(backend.history_call_count(), 1);
    assert_eq!(wallet.transaction_history(), history);
    assert!(wallet.is_history_cached());
    assert!(!wallet.is_history_in_progress());
    // no anchor, no notes lookup
    assert!(backend.notes_calls.lock().is_empty());
}

#[tokio::test]
async fn test_cursor_stops_at_newest_cached() {
    let backend = MockBackend::with_history(vec![
        raw_tx("xyz", TxAction::Received, 5_000, NOW - 100, 1),
        raw_tx("abc", TxAction::Sent, 7_000, NOW - 1_000, 40),
        raw_tx("older", TxAction::Received, 9_000, NOW - 5_000, 90),
    ]);
    let cache = vec![
        cached_tx("abc", TxAction::Sent, NOW - 1_000, 40),
        cached_tx("older", TxAction::Received, NOW - 5_000, 90),
    ];
    let wallet = cached_wallet(
        WalletCredentials::new("srv-1", "btc"),
        backend.clone(),
        cache,
        false,
    );
    let (syncer, _) = syncer(SyncConfig::default());

    let report = syncer
        .sync_with_report(&wallet, SyncOptions::default())
        .await
        .unwrap();

    assert_eq!(txids(&report.transactions), vec!["xyz", "abc", "older"]);
    assert_eq!(report.new_transactions, 1);
    assert_eq!(*backend.notes_calls.lock(), vec![NOW - 1_000]);
    assert!(report.persisted);
}

#[tokio::test]
async fn test_concurrent_sync_is_rejected() {
    let backend = MockBackend::with_history(server_history(2));
    let gate = Arc::new(Notify::new());
    *backend.gate.lock() = Some(gate.clone());
    let wallet = btc_wallet(backend.clone());
    let (syncer, _) = syncer(SyncConfig::default());

    let first = syncer.sync(&wallet, SyncOptions::forced());
    let second = async {
        backend.entered.notified().await;
        let result = syncer.sync(&wallet, SyncOptions::forced()).await;
        gate.notify_one();
        result
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first.unwrap().len(), 2);
    let err = second.unwrap_err();
    assert!(matches!(err, Error::HistoryInProgress(ref id) if id == "wallet-1"));
    assert!(err.is_retryable());
    assert!(!wallet.is_history_in_progress());
}

#[tokio::test]
async fn test_unconfirmed_btc_rbf_flag() {
    let backend = MockBackend::with_history(vec![raw_tx(
        "pending",
        TxAction::Received,
        50_000,
        NOW - 30,
        0,
    )]);
    backend.coins.lock().insert(
        "pending".to_string(),
        TxCoins {
            inputs: vec![
                TxInputCoin {
                    sequence_number: Some(0xffff_ffff),
                    mint_height: 870_000,
                },
                TxInputCoin {
                    sequence_number: Some(0xffff_fffd),
                    mint_height: -1,
                },
            ],
        },
    );
    let wallet = btc_wallet(backend.clone());
    let (syncer, _) = syncer(SyncConfig::default());

    let history = syncer.sync(&wallet, SyncOptions::default()).await.unwrap();

    assert_eq!(history[0].is_rbf, Some(true));
    assert_eq!(history[0].has_unconfirmed_inputs, Some(true));
    assert_eq!(history[0].safe_confirmed, None);
    let coins_calls = backend.coins_calls.lock();
    assert_eq!(coins_calls.len(), 1);
    assert_eq!(coins_calls[0].txid, "pending");
}

#[tokio::test]
async fn test_confirmed_and_non_btc_skip_coin_lookup() {
    let backend = MockBackend::with_history(vec![raw_tx("c", TxAction::Sent, 1, NOW - 30, 3)]);
    let wallet = btc_wallet(backend.clone());
    let (syncer, _) = syncer(SyncConfig::default());
    let history = syncer.sync(&wallet, SyncOptions::default()).await.unwrap();
    assert_eq!(history[0].is_rbf, None);

    let eth_backend =
        MockBackend::with_history(vec![raw_tx("e", TxAction::Sent, 1, NOW - 30, 0)]);
    let eth_wallet = WalletRecord::new(
        "wallet-eth",
        WalletCredentials::new("srv-eth", "eth"),
        eth_backend.clone(),
    );
    syncer.sync(&eth_wallet, SyncOptions::default()).await.unwrap();

    assert!(backend.coins_calls.lock().is_empty());
    assert!(eth_backend.coins_calls.lock().is_empty());
}

#[tokio::test]
async fn test_resync_is_idempotent() {
    let mut history = server_history(4);
    history[0].confirmations = 3;
    let backend = MockBackend::with_history(history);
    let wallet = btc_wallet(backend.clone());
    let (syncer, _) = syncer(SyncConfig::default());

    let first = syncer.sync(&wallet, SyncOptions::default()).await.unwrap();
    let second = syncer.sync(&wallet, SyncOptions::forced()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[tokio::test]
async fn test_pagination_page_count() {
    let backend = MockBackend::with_history(server_history(25));
    let wallet = btc_wallet(backend.clone());
    let (syncer, _) = syncer(page_limits(10, 10));

    let report = syncer
        .sync_with_report(&wallet, SyncOptions::default())
        .await
        .unwrap();

    assert_eq!(report.transactions.len(), 25);
    assert_eq!(report.pages, 3);
    let skips: Vec<_> = backend.history_calls.lock().iter().map(|q| q.skip).collect();
    assert_eq!(skips, vec![0, 10, 20]);
}

#[tokio::test]
async fn test_first_page_is_small() {
    let backend = MockBackend::with_history(server_history(7));
    let wallet = btc_wallet(backend.clone());
    let (syncer, _) = syncer(SyncConfig::default());

    syncer.sync(&wallet, SyncOptions::default()).await.unwrap();

    let calls: Vec<_> = backend
        .history_calls
        .lock()
        .iter()
        .map(|q| (q.skip, q.limit))
        .collect();
    assert_eq!(calls, vec![(0, 5), (5, 100)]);
}

#[tokio::test]
async fn test_limit_tx_stops_paging() {
    let backend = MockBackend::with_history(server_history(25));
    let wallet = btc_wallet(backend.clone());
    let (syncer, _) = syncer(page_limits(10, 10));

    let history = syncer
        .sync(
            &wallet,
            SyncOptions {
                force: false,
                limit_tx: Some("tx12".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(backend.history_call_count(), 2);
    assert_eq!(history.len(), 20);
}

#[tokio::test]
async fn test_connection_errors_exhaust_retries() {
    let backend = MockBackend::with_history(server_history(3));
    backend.fail_next((0..3).map(|_| BackendError::Connection("reset".to_string())));
    let wallet = btc_wallet(backend.clone());
    let (syncer, clock) = syncer(SyncConfig::default());

    let err = syncer
        .sync(&wallet, SyncOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Backend(BackendError::Connection(_))));
    assert_eq!(backend.history_call_count(), 3);
    assert_eq!(
        *clock.sleeps.lock(),
        vec![Duration::from_secs(2), Duration::from_secs(5)]
    );
    assert!(!wallet.is_history_in_progress());
    assert!(!syncer.leases().is_held("wallet-1"));
    assert!(wallet.transaction_history().is_empty());
}

#[tokio::test]
async fn test_non_transient_error_is_not_retried() {
    let backend = MockBackend::with_history(server_history(3));
    backend.fail_next([BackendError::Status {
        code: 401,
        message: "unauthorized".to_string(),
    }]);
    let wallet = btc_wallet(backend.clone());
    let (syncer, clock) = syncer(SyncConfig::default());

    let err = syncer
        .sync(&wallet, SyncOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Backend(BackendError::Status { code: 401, .. })));
    assert!(!err.is_retryable());
    assert_eq!(backend.history_call_count(), 1);
    assert!(clock.sleeps.lock().is_empty());
}

#[tokio::test]
async fn test_transient_error_recovers_and_is_reported() {
    let backend = MockBackend::with_history(server_history(2));
    backend.fail_next([BackendError::Status {
        code: 503,
        message: "unavailable".to_string(),
    }]);
    let wallet = btc_wallet(backend.clone());
    let (syncer, clock) = syncer(SyncConfig::default());

    let report = syncer
        .sync_with_report(&wallet, SyncOptions::default())
        .await
        .unwrap();

    assert_eq!(report.transactions.len(), 2);
    assert_eq!(*clock.sleeps.lock(), vec![Duration::from_secs(2)]);
    assert!(report.events.contains(&HistorySyncEvent::Retrying {
        operation: "get_tx_history".to_string(),
        attempt: 1,
    }));
}

#[tokio::test]
async fn test_retry_cap_is_configurable() {
    let backend = MockBackend::with_history(server_history(2));
    backend.fail_next([BackendError::Connection("timeout".to_string())]);
    let wallet = btc_wallet(backend.clone());
    let config = SyncConfig {
        retry: RetryConfig {
            max_retries: 0,
            ..RetryConfig::default()
        },
        ..SyncConfig::default()
    };
    let (syncer, _) = syncer(config);

    assert!(syncer.sync(&wallet, SyncOptions::default()).await.is_err());
    assert_eq!(backend.history_call_count(), 1);
}

#[tokio::test]
async fn test_notes_attached_from_anchor() {
    let backend = MockBackend::with_history(vec![
        raw_tx("new", TxAction::Sent, 5_000, NOW - 100, 1),
        raw_tx("anchor", TxAction::Received, 7_000, NOW - 1_000, 40),
    ]);
    *backend.notes.lock() = Some(Ok(vec![TxNote {
        txid: Some("new".to_string()),
        body: Some("coffee".to_string()),
        ..TxNote::default()
    }]));
    let wallet = cached_wallet(
        WalletCredentials::new("srv-1", "btc"),
        backend.clone(),
        vec![cached_tx("anchor", TxAction::Received, NOW - 1_000, 40)],
        false,
    );
    let (syncer, _) = syncer(SyncConfig::default());

    let history = syncer.sync(&wallet, SyncOptions::default()).await.unwrap();

    assert_eq!(history[0].note_body(), Some("coffee"));
    assert!(history[1].note.is_none());
}

#[tokio::test]
async fn test_notes_failure_does_not_abort() {
    let backend = MockBackend::with_history(vec![
        raw_tx("new", TxAction::Sent, 5_000, NOW - 100, 1),
        raw_tx("anchor", TxAction::Received, 7_000, NOW - 1_000, 40),
    ]);
    *backend.notes.lock() = Some(Err(BackendError::Status {
        code: 500,
        message: "notes down".to_string(),
    }));
    let wallet = cached_wallet(
        WalletCredentials::new("srv-1", "btc"),
        backend.clone(),
        vec![cached_tx("anchor", TxAction::Received, NOW - 1_000, 40)],
        false,
    );
    let (syncer, _) = syncer(SyncConfig::default());

    let report = syncer
        .sync_with_report(&wallet, SyncOptions::default())
        .await
        .unwrap();

    assert_eq!(txids(&report.transactions), vec!["new", "anchor"]);
    assert!(report.persisted);
    assert!(report
        .events
        .iter()
        .any(|e| matches!(e, HistorySyncEvent::NotesSkipped { .. })));
    // single attempt only
    assert_eq!(backend.notes_calls.lock().len(), 1);
}

#[tokio::test]
async fn test_wallet_switch_is_not_persisted() {
    let backend = MockBackend::with_history(server_history(3));
    let wallet = Arc::new(btc_wallet(backend.clone()));
    let switched = Arc::clone(&wallet);
    *backend.on_history.lock() = Some(Box::new(move || {
        switched.replace_credentials(WalletCredentials::new("srv-other", "btc"));
    }));
    let (syncer, _) = syncer(SyncConfig::default());

    let report = syncer
        .sync_with_report(&wallet, SyncOptions::default())
        .await
        .unwrap();

    assert_eq!(report.transactions.len(), 3);
    assert!(!report.persisted);
    assert!(wallet.transaction_history().is_empty());
    assert!(!wallet.is_history_cached());
    assert!(report
        .events
        .iter()
        .any(|e| matches!(e, HistorySyncEvent::Discarded { .. })));
}

#[tokio::test]
async fn test_incomplete_wallet_returns_empty() {
    let backend = MockBackend::with_history(server_history(3));
    let mut credentials = WalletCredentials::new("srv-1", "btc");
    credentials.complete = false;
    let wallet = WalletRecord::new("wallet-1", credentials, backend.clone());
    let (syncer, _) = syncer(SyncConfig::default());

    assert!(syncer.sync(&wallet, SyncOptions::forced()).await.unwrap().is_empty());

    let mut unregistered = WalletCredentials::new("srv-1", "btc");
    unregistered.wallet_id = None;
    wallet.replace_credentials(unregistered);
    assert!(syncer.sync(&wallet, SyncOptions::forced()).await.unwrap().is_empty());

    assert_eq!(backend.history_call_count(), 0);
}

#[tokio::test]
async fn test_valid_cache_is_served_without_network() {
    let backend = MockBackend::with_history(server_history(3));
    let cache = vec![cached_tx("tx1", TxAction::Received, NOW - 1_200, 50)];
    let wallet = cached_wallet(
        WalletCredentials::new("srv-1", "btc"),
        backend.clone(),
        cache.clone(),
        true,
    );
    let (syncer, _) = syncer(SyncConfig::default());

    let report = syncer
        .sync_with_report(&wallet, SyncOptions::default())
        .await
        .unwrap();
    assert!(report.from_cache);
    assert_eq!(report.transactions, cache);
    assert_eq!(backend.history_call_count(), 0);

    let refreshed = syncer.sync(&wallet, SyncOptions::forced()).await.unwrap();
    assert_eq!(txids(&refreshed), vec!["tx0", "tx1"]);
    assert_eq!(backend.history_call_count(), 1);
}

#[tokio::test]
async fn test_invalidated_cache_goes_to_network() {
    let backend = MockBackend::with_history(server_history(2));
    let wallet = btc_wallet(backend.clone());
    let (syncer, _) = syncer(SyncConfig::default());

    syncer.sync(&wallet, SyncOptions::default()).await.unwrap();
    syncer.sync(&wallet, SyncOptions::default()).await.unwrap();
    assert_eq!(backend.history_call_count(), 1);

    wallet.invalidate_history();
    syncer.sync(&wallet, SyncOptions::default()).await.unwrap();
    assert_eq!(backend.history_call_count(), 2);
}

#[tokio::test]
async fn test_soft_confirmed_cache_is_refetched() {
    let backend = MockBackend::with_history(vec![
        raw_tx("fresh", TxAction::Received, 5_000, NOW - 100, 8),
        raw_tx("settled", TxAction::Received, 7_000, NOW - 9_000, 40),
    ]);
    let wallet = cached_wallet(
        WalletCredentials::new("srv-1", "btc"),
        backend.clone(),
        vec![
            cached_tx("fresh", TxAction::Received, NOW - 100, 2),
            cached_tx("settled", TxAction::Received, NOW - 9_000, 40),
        ],
        false,
    );
    let (syncer, _) = syncer(SyncConfig::default());

    let history = syncer.sync(&wallet, SyncOptions::default()).await.unwrap();

    assert_eq!(txids(&history), vec!["fresh", "settled"]);
    assert_eq!(history[0].confirmations, 8);
    assert_eq!(history[0].safe_confirmed.as_deref(), Some("6+"));
    assert_eq!(*backend.notes_calls.lock(), vec![NOW - 9_000]);
}

#[tokio::test]
async fn test_fetched_copy_wins_over_cached() {
    let mut fetched = raw_tx("dup", TxAction::Received, 5_000, NOW - 50, 30);
    fetched.message = Some("fresh copy".to_string());
    let backend = MockBackend::with_history(vec![
        fetched,
        raw_tx("anchor", TxAction::Received, 7_000, NOW - 100, 40),
    ]);
    let mut stale = cached_tx("dup", TxAction::Received, NOW - 200, 40);
    stale.message = Some("stale copy".to_string());
    let wallet = cached_wallet(
        WalletCredentials::new("srv-1", "btc"),
        backend.clone(),
        vec![cached_tx("anchor", TxAction::Received, NOW - 100, 40), stale],
        false,
    );
    let (syncer, _) = syncer(SyncConfig::default());

    let history = syncer.sync(&wallet, SyncOptions::default()).await.unwrap();

    assert_eq!(txids(&history), vec!["dup", "anchor"]);
    assert_eq!(history[0].message.as_deref(), Some("fresh copy"));
}

#[tokio::test]
async fn test_duplicate_records_in_page_are_dropped() {
    let backend = MockBackend::with_history(vec![
        raw_tx("a", TxAction::Received, 1_000, NOW - 10, 20),
        raw_tx("a", TxAction::Received, 2_000, NOW - 10, 20),
        raw_tx("b", TxAction::Received, 3_000, NOW - 20, 20),
    ]);
    let wallet = btc_wallet(backend.clone());
    let (syncer, _) = syncer(SyncConfig::default());

    let history = syncer.sync(&wallet, SyncOptions::default()).await.unwrap();

    assert_eq!(txids(&history), vec!["a", "b"]);
    assert_eq!(history[0].amount, 1_000);
}

#[tokio::test]
async fn test_escrow_reclaim_dropped_for_bch() {
    let backend = MockBackend::with_history(Vec::new());
    let cache = vec![
        cached_tx("reclaim", TxAction::Moved, NOW - 950, 40),
        cached_tx("send", TxAction::Sent, NOW - 1_000, 40),
    ];
    let bch = cached_wallet(
        WalletCredentials::new("srv-1", "bch"),
        backend.clone(),
        cache.clone(),
        false,
    );
    let btc = cached_wallet(
        WalletCredentials::new("srv-2", "btc"),
        backend.clone(),
        cache,
        false,
    );
    let (syncer, _) = syncer(SyncConfig::default());

    let bch_history = syncer.sync(&bch, SyncOptions::default()).await.unwrap();
    let btc_history = syncer.sync(&btc, SyncOptions::default()).await.unwrap();

    assert_eq!(txids(&bch_history), vec!["send"]);
    assert_eq!(txids(&btc_history), vec!["reclaim", "send"]);
}

#[tokio::test]
async fn test_bits_cache_is_repaired() {
    let backend = MockBackend::with_history(Vec::new());
    let mut legacy = cached_tx("old", TxAction::Received, NOW - 50_000, 500);
    legacy.amount = 150_000;
    legacy.amount_str = Some("1500 bits".to_string());
    let wallet = cached_wallet(
        WalletCredentials::new("srv-1", "btc"),
        backend.clone(),
        vec![legacy],
        false,
    );
    let (syncer, _) = syncer(SyncConfig::default());

    let history = syncer.sync(&wallet, SyncOptions::default()).await.unwrap();

    assert_eq!(history[0].amount_str.as_deref(), Some("0.0015 BTC"));
    assert_eq!(history[0].amount_unit_str.as_deref(), Some("BTC"));
}

#[tokio::test]
async fn test_low_amount_flagged_for_utxo_only() {
    let history = vec![
        raw_tx("dust", TxAction::Received, 500, NOW - 10, 20),
        raw_tx("ok", TxAction::Received, 5_000, NOW - 20, 20),
    ];
    let btc_backend = MockBackend::with_history(history.clone());
    let eth_backend = MockBackend::with_history(history);
    let btc = btc_wallet(btc_backend);
    let eth = WalletRecord::new(
        "wallet-eth",
        WalletCredentials::new("srv-eth", "eth"),
        eth_backend,
    );
    let (syncer, _) = syncer(SyncConfig::default());

    let btc_history = syncer.sync(&btc, SyncOptions::default()).await.unwrap();
    let eth_history = syncer.sync(&eth, SyncOptions::default()).await.unwrap();

    assert_eq!(btc_history[0].low_amount, Some(true));
    assert_eq!(btc_history[1].low_amount, Some(false));
    assert!(eth_history.iter().all(|tx| tx.low_amount.is_none()));
}

#[tokio::test]
async fn test_future_timestamps_are_clamped() {
    let backend = MockBackend::with_history(vec![raw_tx(
        "skewed",
        TxAction::Received,
        5_000,
        NOW + 3_600,
        1,
    )]);
    let wallet = btc_wallet(backend);
    let (syncer, _) = syncer(SyncConfig::default());

    let history = syncer.sync(&wallet, SyncOptions::default()).await.unwrap();

    assert_eq!(history[0].time, NOW);
}

#[tokio::test]
async fn test_token_wallet_query_and_fee_unit() {
    let mut tx = raw_tx("t", TxAction::Sent, 0, NOW - 10, 20);
    tx.outputs = vec![txhistory_core::TxOutput {
        address: Some("0xdest".to_string()),
        amount: 2_500_000,
        amount_str: None,
    }];
    tx.fee = Some(1_000_000_000_000_000);
    tx.size = None;
    let backend = MockBackend::with_history(vec![tx]);
    let mut credentials = WalletCredentials::new("srv-1", "eth");
    credentials.token = Some(txhistory_sync::TokenInfo {
        address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
        symbol: "USDC".to_string(),
        decimals: 6,
    });
    let wallet = WalletRecord::new("wallet-usdc", credentials, backend.clone());
    let (syncer, _) = syncer(SyncConfig::default());

    let history = syncer.sync(&wallet, SyncOptions::default()).await.unwrap();

    assert_eq!(history[0].amount_str.as_deref(), Some("2.5 USDC"));
    assert_eq!(history[0].fee_str.as_deref(), Some("0.001 ETH"));
    assert_eq!(
        backend.history_calls.lock()[0].token_address,
        "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
    );
}

fn token_send(amount: u128, fee: u128) -> txhistory_core::Transaction {
    let mut tx = raw_tx("t", TxAction::Sent, 0, NOW - 10, 20);
    tx.outputs = vec![txhistory_core::TxOutput {
        address: Some("0xdest".to_string()),
        amount,
        amount_str: None,
    }];
    tx.fee = Some(fee);
    tx.size = None;
    tx
}

#[tokio::test]
async fn test_polygon_token_fee_in_matic() {
    let backend = MockBackend::with_history(vec![token_send(2_500_000, 1_000_000_000_000_000)]);
    let mut credentials = WalletCredentials::new("srv-1", "matic");
    credentials.token = Some(txhistory_sync::TokenInfo {
        address: "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359".to_string(),
        symbol: "USDC".to_string(),
        decimals: 6,
    });
    let wallet = WalletRecord::new("wallet-usdc-matic", credentials, backend);
    let (syncer, _) = syncer(SyncConfig::default());

    let history = syncer.sync(&wallet, SyncOptions::default()).await.unwrap();

    assert_eq!(history[0].amount_str.as_deref(), Some("2.5 USDC"));
    assert_eq!(history[0].fee_str.as_deref(), Some("0.001 MATIC"));
}

#[tokio::test]
async fn test_token_with_more_decimals_than_u128_holds() {
    let backend = MockBackend::with_history(vec![token_send(
        5 * 10u128.pow(35),
        1_000_000_000_000_000,
    )]);
    let mut credentials = WalletCredentials::new("srv-1", "eth");
    credentials.token = Some(txhistory_sync::TokenInfo {
        address: "0x00000000000000000000000000000000000000b1".to_string(),
        symbol: "BIG".to_string(),
        decimals: 40,
    });
    let wallet = WalletRecord::new("wallet-big", credentials, backend);
    let (syncer, _) = syncer(SyncConfig::default());

    let history = syncer.sync(&wallet, SyncOptions::default()).await.unwrap();

    assert_eq!(history[0].amount_str.as_deref(), Some("0.00005 BIG"));
    assert_eq!(history[0].fee_str.as_deref(), Some("0.001 ETH"));
}

#[tokio::test]
async fn test_output_sum_overflow_fails_pass() {
    let mut tx = raw_tx("huge", TxAction::Sent, 0, NOW - 10, 20);
    tx.outputs = vec![
        txhistory_core::TxOutput {
            address: Some("a".to_string()),
            amount: u128::MAX,
            amount_str: None,
        },
        txhistory_core::TxOutput {
            address: Some("b".to_string()),
            amount: 1,
            amount_str: None,
        },
    ];
    let backend = MockBackend::with_history(vec![tx]);
    let wallet = btc_wallet(backend);
    let (syncer, _) = syncer(SyncConfig::default());

    let err = syncer.sync(&wallet, SyncOptions::default()).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Core(txhistory_core::Error::AmountOverflow(_))
    ));
    assert!(!err.is_retryable());
    assert!(!wallet.is_history_in_progress());
    assert!(wallet.transaction_history().is_empty());
}
