//! Cursor fetcher
//!
//! Pages through the indexer's newest-first history with:
//! - Cursor stop at the newest locally known txid
//! - Retry of transient failures (connection errors, 5xx) with bounded backoff
//! - An injected transport and clock so tests run without network or delays

use crate::clock::Clock;
use crate::error::BackendError;
use crate::sync_logger::HistorySyncLogger;
use crate::wallet::{CoinsQuery, WalletBackend, WalletCredentials};
use crate::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use txhistory_core::{Transaction, TxInputCoin, TxNote};

/// Retry configuration for indexer requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Added to the delay for every further retry
    pub delay_step: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(2_000),
            delay_step: Duration::from_millis(3_000),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `retry` (0-based): `base + step * retry`
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay + self.delay_step * retry
    }
}

/// One page of new history
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryPage {
    /// Records newer than the cursor, newest first
    pub transactions: Vec<Transaction>,
    /// The server may hold more records
    pub load_more: bool,
}

/// Indexer client bound to one wallet transport
#[derive(Clone)]
pub struct HistoryClient {
    backend: Arc<dyn WalletBackend>,
    retry: RetryConfig,
    clock: Arc<dyn Clock>,
    logger: Option<Arc<Mutex<HistorySyncLogger>>>,
}

impl HistoryClient {
    /// Create a client
    pub fn new(backend: Arc<dyn WalletBackend>, retry: RetryConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            retry,
            clock,
            logger: None,
        }
    }

    /// Record retries in `logger`
    pub fn with_logger(mut self, logger: Arc<Mutex<HistorySyncLogger>>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Fetch up to `limit` records starting at `skip`, stopping before `last_known_txid`
    pub async fn fetch_page(
        &self,
        credentials: &WalletCredentials,
        skip: usize,
        limit: usize,
        last_known_txid: Option<&str>,
    ) -> Result<HistoryPage> {
        let query = credentials.history_query(skip, limit);
        let raw = self
            .with_retry("get_tx_history", || self.backend.get_tx_history(&query))
            .await?;

        let transactions: Vec<Transaction> = raw
            .into_iter()
            .take_while(|tx| Some(tx.txid.as_str()) != last_known_txid)
            .collect();
        let load_more = transactions.len() >= limit;

        debug!(
            skip,
            limit,
            fetched = transactions.len(),
            load_more,
            "Fetched history page"
        );

        Ok(HistoryPage {
            transactions,
            load_more,
        })
    }

    /// Inputs spent by `txid`
    pub async fn get_coins_for_tx(
        &self,
        credentials: &WalletCredentials,
        txid: &str,
    ) -> Result<Vec<TxInputCoin>> {
        let query = CoinsQuery {
            coin: credentials.coin.clone(),
            network: credentials.network,
            txid: txid.to_string(),
        };
        let coins = self
            .with_retry("get_coins_for_tx", || self.backend.get_coins_for_tx(&query))
            .await?;
        Ok(coins.inputs)
    }

    /// Notes edited at or after `min_ts` (single attempt)
    pub async fn get_tx_notes(&self, min_ts: i64) -> Result<Vec<TxNote>> {
        Ok(self.backend.get_tx_notes(min_ts).await?)
    }

    /// Execute operation, retrying transient failures up to `max_retries` times
    async fn with_retry<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: std::future::Future<Output = std::result::Result<T, BackendError>> + Send,
    {
        let mut retry = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_transient() && retry < self.retry.max_retries => {
                    let delay = self.retry.delay_for(retry);
                    warn!(
                        "{} failed (attempt {}), retrying in {:?}: {}",
                        operation_name,
                        retry + 1,
                        delay,
                        e
                    );
                    if let Some(logger) = &self.logger {
                        logger.lock().log_retrying(operation_name, retry + 1);
                    }
                    self.clock.sleep(delay).await;
                    retry += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
