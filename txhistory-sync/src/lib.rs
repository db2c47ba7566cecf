//! Wallet transaction history sync engine
//!
//! Fetches a wallet's history from a remote indexer in cursor-bounded pages,
//! normalizes each record, merges the result into the wallet's cached history
//! and persists it. One pass runs per wallet at a time.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod clock;
pub mod error;
pub mod lease;
pub mod normalize;
pub mod sync;
pub mod sync_logger;
pub mod wallet;

pub use client::{HistoryClient, HistoryPage, RetryConfig};
pub use clock::{Clock, SystemClock};
pub use error::{BackendError, Error, Result};
pub use lease::{HistoryLease, HistoryLeases};
pub use normalize::{normalize, signals_rbf, spends_unconfirmed, BatchNormalizer};
pub use sync::{
    fix_transactions_unit, remove_escrow_reclaim, remove_soft_confirmed, HistorySyncer,
    LowAmountConfig, SyncConfig, SyncOptions, SyncReport,
};
pub use sync_logger::{init_history_sync_logging, HistorySyncEvent, HistorySyncLogger};
pub use wallet::{
    CoinsQuery, HistoryQuery, MultisigEthInfo, SyncState, TokenInfo, TxCoins, WalletBackend,
    WalletCredentials, WalletRecord,
};
