//! Shared fixtures for history sync integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use txhistory_core::{Transaction, TxAction, TxNote};
use txhistory_sync::{
    BackendError, Clock, CoinsQuery, HistoryQuery, TxCoins, WalletBackend,
};

/// Fixed "now" used by every scenario
pub const NOW: i64 = 1_800_014_400;

/// In-memory indexer serving a newest-first history by skip/limit
#[derive(Default)]
pub struct MockBackend {
    pub history: Mutex<Vec<Transaction>>,
    pub failures: Mutex<VecDeque<BackendError>>,
    pub coins: Mutex<HashMap<String, TxCoins>>,
    pub notes: Mutex<Option<Result<Vec<TxNote>, BackendError>>>,
    pub history_calls: Mutex<Vec<HistoryQuery>>,
    pub coins_calls: Mutex<Vec<CoinsQuery>>,
    pub notes_calls: Mutex<Vec<i64>>,
    /// Signalled on every history request
    pub entered: Notify,
    /// Holds the first history request until notified
    pub gate: Mutex<Option<Arc<Notify>>>,
    /// Runs once, on the first history request
    pub on_history: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl MockBackend {
    pub fn with_history(history: Vec<Transaction>) -> Arc<Self> {
        let backend = Self::default();
        *backend.history.lock() = history;
        Arc::new(backend)
    }

    pub fn fail_next(&self, errors: impl IntoIterator<Item = BackendError>) {
        self.failures.lock().extend(errors);
    }

    pub fn history_call_count(&self) -> usize {
        self.history_calls.lock().len()
    }
}

#[async_trait]
impl WalletBackend for MockBackend {
    async fn get_tx_history(&self, query: &HistoryQuery) -> Result<Vec<Transaction>, BackendError> {
        self.history_calls.lock().push(query.clone());
        self.entered.notify_one();

        let gate = self.gate.lock().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let hook = self.on_history.lock().take();
        if let Some(hook) = hook {
            hook();
        }

        if let Some(err) = self.failures.lock().pop_front() {
            return Err(err);
        }

        let history = self.history.lock();
        let start = query.skip.min(history.len());
        let end = (query.skip + query.limit).min(history.len());
        Ok(history[start..end].to_vec())
    }

    async fn get_coins_for_tx(&self, query: &CoinsQuery) -> Result<TxCoins, BackendError> {
        self.coins_calls.lock().push(query.clone());
        Ok(self
            .coins
            .lock()
            .get(&query.txid)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_tx_notes(&self, min_ts: i64) -> Result<Vec<TxNote>, BackendError> {
        self.notes_calls.lock().push(min_ts);
        self.notes.lock().clone().unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Clock frozen at [`NOW`] that records sleeps instead of waiting
#[derive(Default)]
pub struct RecordingClock {
    pub sleeps: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Clock for RecordingClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(NOW, 0).single().unwrap_or_default()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
    }
}

/// Raw indexer record
pub fn raw_tx(txid: &str, action: TxAction, amount: u128, time: i64, confirmations: u32) -> Transaction {
    let mut tx = Transaction::new(txid, action, amount, time);
    tx.confirmations = confirmations;
    tx.fee = Some(2_260);
    tx.size = Some(226);
    tx
}

/// `count` confirmed received records, newest first, txids `tx{n}`
pub fn server_history(count: usize) -> Vec<Transaction> {
    (0..count)
        .map(|i| {
            raw_tx(
                &format!("tx{}", i),
                TxAction::Received,
                10_000 + i as u128,
                NOW - 600 * (i as i64 + 1),
                50,
            )
        })
        .collect()
}

/// Previously synced cache entry
pub fn cached_tx(txid: &str, action: TxAction, time: i64, confirmations: u32) -> Transaction {
    let mut tx = raw_tx(txid, action, 10_000, time, confirmations);
    tx.amount_str = Some("0.0001 BTC".to_string());
    tx
}

pub fn txids(transactions: &[Transaction]) -> Vec<&str> {
    transactions.iter().map(|tx| tx.txid.as_str()).collect()
}
