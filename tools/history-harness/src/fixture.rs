//! Recorded indexer fixtures
//!
//! A fixture captures one wallet: its credentials, the cache it starts from
//! and the newest-first history the indexer would serve.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use txhistory_core::{Contact, Transaction, TxNote};
use txhistory_sync::{
    BackendError, Clock, CoinsQuery, HistoryQuery, SyncState, TxCoins, WalletBackend,
    WalletCredentials,
};

/// Fixture file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    /// Wallet credentials
    pub wallet: WalletCredentials,
    /// Cache the wallet starts with
    #[serde(default)]
    pub cached: Vec<Transaction>,
    /// Starting cache is valid
    #[serde(default)]
    pub cache_valid: bool,
    /// Indexer history, newest first
    #[serde(default)]
    pub history: Vec<Transaction>,
    /// Spent inputs per txid
    #[serde(default)]
    pub coins: HashMap<String, TxCoins>,
    /// Notes served by the notes endpoint
    #[serde(default)]
    pub notes: Vec<TxNote>,
    /// Address book
    #[serde(default)]
    pub contacts: Vec<Contact>,
    /// Unix time to replay at (wall clock when absent)
    #[serde(default)]
    pub now: Option<i64>,
}

impl Fixture {
    /// Read and parse a fixture file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse fixture {}", path.display()))
    }

    /// Starting sync state
    pub fn initial_state(&self) -> SyncState {
        SyncState {
            transaction_history: self.cached.clone(),
            is_transaction_history_valid: self.cache_valid,
            transaction_history_on_progress: false,
        }
    }

    /// Replay time
    pub fn now(&self) -> Option<DateTime<Utc>> {
        self.now.and_then(|ts| Utc.timestamp_opt(ts, 0).single())
    }
}

/// Serves a fixture through the wallet transport interface
pub struct FixtureBackend {
    history: Vec<Transaction>,
    coins: HashMap<String, TxCoins>,
    notes: Vec<TxNote>,
    requests: AtomicUsize,
}

impl FixtureBackend {
    pub fn new(fixture: &Fixture) -> Self {
        Self {
            history: fixture.history.clone(),
            coins: fixture.coins.clone(),
            notes: fixture.notes.clone(),
            requests: AtomicUsize::new(0),
        }
    }

    /// Requests served so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl WalletBackend for FixtureBackend {
    async fn get_tx_history(&self, query: &HistoryQuery) -> Result<Vec<Transaction>, BackendError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let start = query.skip.min(self.history.len());
        let end = query.skip.saturating_add(query.limit).min(self.history.len());
        Ok(self.history[start..end].to_vec())
    }

    async fn get_coins_for_tx(&self, query: &CoinsQuery) -> Result<TxCoins, BackendError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        Ok(self.coins.get(&query.txid).cloned().unwrap_or_default())
    }

    async fn get_tx_notes(&self, min_ts: i64) -> Result<Vec<TxNote>, BackendError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .notes
            .iter()
            .filter(|note| note.edited_on.map_or(true, |ts| ts >= min_ts))
            .cloned()
            .collect())
    }
}

/// Clock pinned to the fixture's replay time
pub struct FixtureClock {
    now: Option<DateTime<Utc>>,
}

impl FixtureClock {
    pub fn new(now: Option<DateTime<Utc>>) -> Self {
        Self { now }
    }
}

#[async_trait]
impl Clock for FixtureClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"{
        "wallet": { "walletId": "w", "coin": "btc" },
        "history": [
            { "txid": "b", "action": "received", "amount": 2, "time": 20 },
            { "txid": "a", "action": "received", "amount": 1, "time": 10 }
        ],
        "notes": [
            { "txid": "a", "body": "old", "editedOn": 5 },
            { "txid": "b", "body": "new", "editedOn": 50 }
        ]
    }"#;

    #[test]
    fn test_load_minimal_fixture() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let fixture = Fixture::load(file.path()).unwrap();
        assert_eq!(fixture.history.len(), 2);
        assert!(fixture.cached.is_empty());
        assert!(!fixture.cache_valid);
        assert!(fixture.now().is_none());
        assert_eq!(fixture.wallet.wallet_id.as_deref(), Some("w"));
    }

    #[test]
    fn test_load_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = Fixture::load(&missing).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    #[tokio::test]
    async fn test_backend_pages_and_filters_notes() {
        let fixture: Fixture = serde_json::from_str(MINIMAL).unwrap();
        let backend = FixtureBackend::new(&fixture);

        let page = backend
            .get_tx_history(&HistoryQuery {
                skip: 1,
                limit: 5,
                ..HistoryQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].txid, "a");

        let notes = backend.get_tx_notes(10).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].body.as_deref(), Some("new"));
        assert_eq!(backend.request_count(), 2);
    }
}
