//! History merger
//!
//! One pass of [`HistorySyncer::sync`]:
//! 1. Refuse incomplete wallets (empty history) and concurrent passes
//! 2. Serve the cache when it is valid and no refresh was forced
//! 3. Prepare the cache: unit repair, escrow-reclaim filtering, soft-confirmed removal
//! 4. Page through new history from the newest retained txid, normalizing each page
//! 5. Flag low amounts, merge (fetched first), sort, attach notes, mark recent
//! 6. Persist unless the wallet identity changed mid-pass

use crate::client::{HistoryClient, RetryConfig};
use crate::clock::{Clock, SystemClock};
use crate::error::Error;
use crate::lease::HistoryLeases;
use crate::normalize::BatchNormalizer;
use crate::sync_logger::{HistorySyncEvent, HistorySyncLogger};
use crate::wallet::{WalletCredentials, WalletRecord};
use crate::Result;
use parking_lot::Mutex;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};
use txhistory_core::{
    dedup_by_txid, format_amount_str, sort_newest_first, split_amount_str, Currency, Transaction,
    TxAction, TxNote, NOT_AVAILABLE,
};
use txhistory_params::{
    ESCROW_RECLAIM_WINDOW_SECS, FIRST_PAGE_LIMIT, LOW_AMOUNT_RATIO, PAGE_LIMIT,
    SAFE_CONFIRMATIONS, SOFT_CONFIRMATION_LIMIT, TYPICAL_INPUT_SIZE_BYTES,
};

/// Low-amount threshold parameters for UTXO coins
#[derive(Debug, Clone, PartialEq)]
pub struct LowAmountConfig {
    /// Minimum relay fee, smallest unit per byte
    pub min_fee_per_byte: u64,
    /// Size of one spent input
    pub input_size_bytes: u64,
    /// Spend cost to value ratio above which an output is uneconomic
    pub ratio: f64,
}

impl Default for LowAmountConfig {
    fn default() -> Self {
        Self {
            min_fee_per_byte: 1,
            input_size_bytes: TYPICAL_INPUT_SIZE_BYTES,
            ratio: LOW_AMOUNT_RATIO,
        }
    }
}

impl LowAmountConfig {
    /// Amounts below this cost more than `ratio` of their value to spend
    pub fn threshold(&self) -> u128 {
        let spend_cost = (self.min_fee_per_byte * self.input_size_bytes) as f64;
        (spend_cost / self.ratio).ceil() as u128
    }
}

/// Sync engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Size of the first page
    pub first_page_limit: usize,
    /// Size of every later page
    pub page_limit: usize,
    /// Retry policy for indexer requests
    pub retry: RetryConfig,
    /// Confirmations after which a transaction shows as safe
    pub safe_confirmations: u32,
    /// Cached entries below this many confirmations are re-fetched
    pub soft_confirmation_limit: u32,
    /// A `moved` entry this close to a `sent` entry is an escrow reclaim
    pub escrow_reclaim_window_secs: i64,
    /// Low-amount flagging
    pub low_amount: LowAmountConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            first_page_limit: FIRST_PAGE_LIMIT,
            page_limit: PAGE_LIMIT,
            retry: RetryConfig::default(),
            safe_confirmations: SAFE_CONFIRMATIONS,
            soft_confirmation_limit: SOFT_CONFIRMATION_LIMIT,
            escrow_reclaim_window_secs: ESCROW_RECLAIM_WINDOW_SECS,
            low_amount: LowAmountConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Defaults overridden by `TXHISTORY_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(limit) = env_override("TXHISTORY_FIRST_PAGE_LIMIT", |v: &usize| *v > 0) {
            config.first_page_limit = limit;
        }
        if let Some(limit) = env_override("TXHISTORY_PAGE_LIMIT", |v: &usize| *v > 0) {
            config.page_limit = limit;
        }
        if let Some(retries) = env_override("TXHISTORY_MAX_RETRIES", |_: &u32| true) {
            config.retry.max_retries = retries;
        }
        if let Some(fee) = env_override("TXHISTORY_MIN_FEE_PER_BYTE", |v: &u64| *v > 0) {
            config.low_amount.min_fee_per_byte = fee;
        }

        config
    }
}

fn env_override<T: FromStr>(name: &str, valid: impl Fn(&T) -> bool) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => Some(value),
        _ => {
            warn!("Ignoring invalid {}={:?}", name, raw);
            None
        }
    }
}

/// Per-call options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Bypass a valid cache
    pub force: bool,
    /// Stop paging after the page containing this txid
    pub limit_tx: Option<String>,
}

impl SyncOptions {
    /// Forced refresh
    pub fn forced() -> Self {
        Self {
            force: true,
            limit_tx: None,
        }
    }
}

/// Outcome of one pass
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Merged newest-first history
    pub transactions: Vec<Transaction>,
    /// Records fetched and normalized this pass
    pub new_transactions: usize,
    /// History pages requested
    pub pages: usize,
    /// Served from the valid cache without network access
    pub from_cache: bool,
    /// Written back to the wallet record
    pub persisted: bool,
    /// Events recorded during the pass
    pub events: Vec<HistorySyncEvent>,
}

/// Drives history passes for any number of wallets
pub struct HistorySyncer {
    config: SyncConfig,
    clock: Arc<dyn Clock>,
    leases: HistoryLeases,
}

impl Default for HistorySyncer {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}

impl HistorySyncer {
    /// Create a syncer on the system clock
    pub fn new(config: SyncConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a syncer on an injected clock
    pub fn with_clock(config: SyncConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            leases: HistoryLeases::new(),
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Lease registry
    pub fn leases(&self) -> &HistoryLeases {
        &self.leases
    }

    /// Synchronize `wallet` and return its merged history
    pub async fn sync(&self, wallet: &WalletRecord, options: SyncOptions) -> Result<Vec<Transaction>> {
        Ok(self.sync_with_report(wallet, options).await?.transactions)
    }

    /// Synchronize `wallet` and return the pass report
    pub async fn sync_with_report(
        &self,
        wallet: &WalletRecord,
        options: SyncOptions,
    ) -> Result<SyncReport> {
        let credentials = wallet.credentials();
        let wallet_id = match credentials.wallet_id.clone() {
            Some(id) if credentials.is_complete() => id,
            _ => {
                debug!(wallet_id = %wallet.id(), "Wallet incomplete, no history to sync");
                return Ok(SyncReport::default());
            }
        };

        let Some(_lease) = self.leases.try_acquire(wallet) else {
            debug!(wallet_id = %wallet.id(), "History update already in progress");
            return Err(Error::HistoryInProgress(wallet.id().to_string()));
        };

        let logger = Arc::new(Mutex::new(HistorySyncLogger::new()));
        let cached = wallet.transaction_history();
        logger.lock().log_started(wallet.id(), cached.len(), options.force);

        if wallet.is_history_cached() && !options.force {
            logger.lock().log_cache_hit(wallet.id(), cached.len());
            let events = logger.lock().events().to_vec();
            return Ok(SyncReport {
                transactions: cached,
                from_cache: true,
                events,
                ..SyncReport::default()
            });
        }

        let started = self.clock.now();
        let result = self
            .run_pass(wallet, &credentials, &wallet_id, cached, &options, &logger)
            .await;

        match result {
            Ok(mut report) => {
                let duration_ms = (self.clock.now() - started).num_milliseconds().max(0) as u64;
                if report.persisted {
                    logger.lock().log_completed(
                        wallet.id(),
                        report.new_transactions,
                        report.transactions.len(),
                        report.pages,
                        duration_ms,
                    );
                } else {
                    logger
                        .lock()
                        .log_discarded(wallet.id(), report.transactions.len());
                }
                report.events = logger.lock().events().to_vec();
                Ok(report)
            }
            Err(e) => {
                if let Error::Core(core) = &e {
                    warn!(
                        wallet_id = %wallet.id(),
                        category = %core.category(),
                        "History record rejected"
                    );
                }
                logger.lock().log_failed(wallet.id(), &e.to_string());
                Err(e)
            }
        }
    }

    async fn run_pass(
        &self,
        wallet: &WalletRecord,
        credentials: &WalletCredentials,
        wallet_id: &str,
        cached: Vec<Transaction>,
        options: &SyncOptions,
        logger: &Arc<Mutex<HistorySyncLogger>>,
    ) -> Result<SyncReport> {
        let currency = credentials.currency()?;
        let retained = self.prepare_cache(credentials, &currency, cached);
        let cursor = retained.first().map(|tx| tx.txid.clone());
        let anchor_time = retained.first().map(|tx| tx.time);

        let client = HistoryClient::new(
            wallet.backend(),
            self.config.retry.clone(),
            Arc::clone(&self.clock),
        )
        .with_logger(Arc::clone(logger));
        let normalizer = BatchNormalizer::new(
            &client,
            credentials,
            &currency,
            self.config.safe_confirmations,
            self.clock.now_unix(),
        );

        let mut fetched = Vec::new();
        let mut skip = 0;
        let mut limit = self.config.first_page_limit;
        let mut pages = 0;

        loop {
            let page = client
                .fetch_page(credentials, skip, limit, cursor.as_deref())
                .await?;
            pages += 1;
            logger
                .lock()
                .log_page(skip, limit, page.transactions.len(), page.load_more);

            let reached_limit_tx = options
                .limit_tx
                .as_deref()
                .is_some_and(|txid| page.transactions.iter().any(|tx| tx.txid == txid));

            fetched.extend(normalizer.process(page.transactions).await?);

            if !page.load_more || reached_limit_tx {
                break;
            }
            skip += limit;
            limit = self.config.page_limit;
        }

        if currency.is_utxo {
            let threshold = self.config.low_amount.threshold();
            for tx in fetched.iter_mut() {
                tx.low_amount = Some(tx.amount < threshold);
            }
        }

        let new_transactions = fetched.len();
        let mut merged = dedup_by_txid(fetched.into_iter().chain(retained));
        sort_newest_first(&mut merged);

        if let Some(min_ts) = anchor_time {
            match client.get_tx_notes(min_ts).await {
                Ok(notes) => apply_notes(&mut merged, notes),
                Err(e) => {
                    let reason = Error::NotesFetchFailed(e.to_string()).to_string();
                    logger.lock().log_notes_skipped(&reason);
                }
            }
        }

        for tx in merged.iter_mut() {
            tx.recent = true;
        }

        let persisted = wallet.credentials().wallet_id.as_deref() == Some(wallet_id);
        if persisted {
            wallet.store_history(merged.clone());
        }

        Ok(SyncReport {
            transactions: merged,
            new_transactions,
            pages,
            from_cache: false,
            persisted,
            events: Vec::new(),
        })
    }

    fn prepare_cache(
        &self,
        credentials: &WalletCredentials,
        currency: &Currency,
        cached: Vec<Transaction>,
    ) -> Vec<Transaction> {
        let cached: Vec<Transaction> = cached
            .into_iter()
            .filter(|tx| !tx.txid.is_empty())
            .collect();
        let cached = fix_transactions_unit(currency, cached);
        let cached = if credentials.is_zce_compatible() {
            remove_escrow_reclaim(cached, self.config.escrow_reclaim_window_secs)
        } else {
            cached
        };
        remove_soft_confirmed(cached, self.config.soft_confirmation_limit)
    }
}

/// Reformat a cache stored under the retired `bits` unit
///
/// A cache whose first entry carries no amount string predates formatting
/// and is discarded entirely.
pub fn fix_transactions_unit(currency: &Currency, mut txs: Vec<Transaction>) -> Vec<Transaction> {
    let cached_unit = match txs.first().and_then(|tx| tx.amount_str.as_deref()) {
        Some(amount_str) => amount_str.split(' ').nth(1).map(str::to_string),
        None => return Vec::new(),
    };

    if cached_unit.as_deref() == Some("bits") {
        debug!("Fixing cached history unit to {}", currency.unit_label());
        let chain = currency.chain_currency();
        for tx in txs.iter_mut() {
            let amount_str = format_amount_str(currency, tx.amount);
            let (value, unit) = split_amount_str(&amount_str);
            tx.amount_str = Some(amount_str);
            tx.amount_value_str = value;
            tx.amount_unit_str = unit;
            tx.fee_str = Some(match tx.fee_amount() {
                Some(fee) => format_amount_str(&chain, fee),
                None => NOT_AVAILABLE.to_string(),
            });
        }
    }

    txs
}

/// Drop `moved` entries paired with a `sent` entry less than `window_secs` apart
pub fn remove_escrow_reclaim(txs: Vec<Transaction>, window_secs: i64) -> Vec<Transaction> {
    let sent_times: Vec<i64> = txs
        .iter()
        .filter(|tx| tx.action == TxAction::Sent)
        .map(|tx| tx.time)
        .collect();

    txs.into_iter()
        .filter(|tx| {
            tx.action != TxAction::Moved
                || !sent_times.iter().any(|t| (tx.time - t).abs() < window_secs)
        })
        .collect()
}

/// Keep only entries with at least `limit` confirmations
pub fn remove_soft_confirmed(txs: Vec<Transaction>, limit: u32) -> Vec<Transaction> {
    txs.into_iter()
        .filter(|tx| tx.confirmations >= limit)
        .collect()
}

fn apply_notes(transactions: &mut [Transaction], notes: Vec<TxNote>) {
    for note in notes {
        let Some(txid) = note.txid.as_deref() else {
            continue;
        };
        for tx in transactions.iter_mut().filter(|tx| tx.txid == txid) {
            tx.note = Some(note.clone());
        }
    }
}
