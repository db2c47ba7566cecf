//! Wallet collaborator boundary
//!
//! The engine talks to the remote indexer only through [`WalletBackend`],
//! which the wallet record carries. [`WalletRecord`] also owns the
//! per-wallet [`SyncState`]; the engine reads and rewrites it but never
//! creates or deletes it.

use crate::error::BackendError;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use txhistory_core::{Currency, NetworkType, Transaction, TxInputCoin, TxNote};

/// History page request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryQuery {
    /// Offset into the newest-first history
    pub skip: usize,
    /// Page size
    pub limit: usize,
    /// Token contract (empty for the native coin)
    pub token_address: String,
    /// Multisig contract (empty unless an EVM multisig wallet)
    pub multisig_contract_address: String,
}

/// Spent-inputs lookup request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinsQuery {
    /// Coin
    pub coin: String,
    /// Network
    pub network: NetworkType,
    /// Transaction id
    pub txid: String,
}

/// Spent inputs of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TxCoins {
    /// Inputs
    #[serde(default)]
    pub inputs: Vec<TxInputCoin>,
}

/// Transport to the remote indexer
#[async_trait]
pub trait WalletBackend: Send + Sync {
    /// Fetch one newest-first page of raw history
    async fn get_tx_history(&self, query: &HistoryQuery)
        -> Result<Vec<Transaction>, BackendError>;

    /// Fetch the inputs spent by a transaction
    async fn get_coins_for_tx(&self, query: &CoinsQuery) -> Result<TxCoins, BackendError>;

    /// Fetch notes edited at or after `min_ts`
    async fn get_tx_notes(&self, min_ts: i64) -> Result<Vec<TxNote>, BackendError>;
}

/// ERC-20 token a wallet tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    /// Contract address
    pub address: String,
    /// Symbol
    pub symbol: String,
    /// Decimals
    pub decimals: u32,
}

/// EVM multisig metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultisigEthInfo {
    /// Multisig contract address
    pub multisig_contract_address: String,
}

/// Wallet identity and shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletCredentials {
    /// Server-side wallet id; `None` until the wallet is registered
    pub wallet_id: Option<String>,
    /// Display name
    #[serde(default)]
    pub wallet_name: String,
    /// Chain coin
    pub coin: String,
    /// Network
    #[serde(default)]
    pub network: NetworkType,
    /// Tracked token, for token wallets
    #[serde(default)]
    pub token: Option<TokenInfo>,
    /// EVM multisig metadata
    #[serde(default)]
    pub multisig_eth_info: Option<MultisigEthInfo>,
    /// Required signatures
    #[serde(default = "one")]
    pub m: u32,
    /// Total copayers
    #[serde(default = "one")]
    pub n: u32,
    /// All copayers joined
    #[serde(default = "yes")]
    pub complete: bool,
}

fn one() -> u32 {
    1
}

fn yes() -> bool {
    true
}

impl WalletCredentials {
    /// Single-signature, complete wallet
    pub fn new(wallet_id: impl Into<String>, coin: impl Into<String>) -> Self {
        Self {
            wallet_id: Some(wallet_id.into()),
            wallet_name: String::new(),
            coin: coin.into(),
            network: NetworkType::Livenet,
            token: None,
            multisig_eth_info: None,
            m: 1,
            n: 1,
            complete: true,
        }
    }

    /// All copayers have joined
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Abbreviation of the currency shown to the user (token symbol for token wallets)
    pub fn currency_abbreviation(&self) -> String {
        match &self.token {
            Some(token) => token.symbol.to_ascii_lowercase(),
            None => self.coin.to_ascii_lowercase(),
        }
    }

    /// Currency parameters for this wallet
    pub fn currency(&self) -> txhistory_params::Result<Currency> {
        Currency::for_wallet(
            &self.coin,
            self.token.as_ref().map(|t| (t.symbol.as_str(), t.decimals)),
        )
    }

    /// Zero-confirmation escrow capable (BCH single-signature)
    pub fn is_zce_compatible(&self) -> bool {
        self.token.is_none()
            && self.n == 1
            && Currency::lookup(&self.coin).is_some_and(|c| c.is_bch())
    }

    /// Build a history page request
    pub fn history_query(&self, skip: usize, limit: usize) -> HistoryQuery {
        HistoryQuery {
            skip,
            limit,
            token_address: self
                .token
                .as_ref()
                .map(|t| t.address.clone())
                .unwrap_or_default(),
            multisig_contract_address: self
                .multisig_eth_info
                .as_ref()
                .map(|m| m.multisig_contract_address.clone())
                .unwrap_or_default(),
        }
    }
}

/// Per-wallet history cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    /// Newest-first history
    pub transaction_history: Vec<Transaction>,
    /// Cache may be returned without a network pass
    pub is_transaction_history_valid: bool,
    /// A sync pass is running
    pub transaction_history_on_progress: bool,
}

/// Wallet record shared between the UI store and the engine
pub struct WalletRecord {
    id: String,
    backend: Arc<dyn WalletBackend>,
    credentials: RwLock<WalletCredentials>,
    state: RwLock<SyncState>,
}

impl WalletRecord {
    /// Create a record with an empty history
    pub fn new(
        id: impl Into<String>,
        credentials: WalletCredentials,
        backend: Arc<dyn WalletBackend>,
    ) -> Self {
        Self::with_state(id, credentials, backend, SyncState::default())
    }

    /// Create a record from a previously persisted state
    pub fn with_state(
        id: impl Into<String>,
        credentials: WalletCredentials,
        backend: Arc<dyn WalletBackend>,
        mut state: SyncState,
    ) -> Self {
        // A persisted in-progress flag belongs to a pass that no longer exists.
        state.transaction_history_on_progress = false;
        Self {
            id: id.into(),
            backend,
            credentials: RwLock::new(credentials),
            state: RwLock::new(state),
        }
    }

    /// Local wallet identity (lease key)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Transport to the indexer
    pub fn backend(&self) -> Arc<dyn WalletBackend> {
        Arc::clone(&self.backend)
    }

    /// Snapshot of the credentials
    pub fn credentials(&self) -> WalletCredentials {
        self.credentials.read().clone()
    }

    /// Swap credentials (wallet re-import, key rotation)
    pub fn replace_credentials(&self, credentials: WalletCredentials) {
        *self.credentials.write() = credentials;
    }

    /// Snapshot of the sync state
    pub fn state(&self) -> SyncState {
        self.state.read().clone()
    }

    /// Cached history
    pub fn transaction_history(&self) -> Vec<Transaction> {
        self.state.read().transaction_history.clone()
    }

    /// Cache is present and valid
    pub fn is_history_cached(&self) -> bool {
        self.state.read().is_transaction_history_valid
    }

    /// Mark the cache stale so the next sync goes to the network
    pub fn invalidate_history(&self) {
        self.state.write().is_transaction_history_valid = false;
    }

    /// A sync pass is running
    pub fn is_history_in_progress(&self) -> bool {
        self.state.read().transaction_history_on_progress
    }

    /// Set the in-progress flag unless it is already set
    pub(crate) fn try_mark_history_in_progress(&self) -> bool {
        let mut state = self.state.write();
        if state.transaction_history_on_progress {
            return false;
        }
        state.transaction_history_on_progress = true;
        true
    }

    pub(crate) fn set_history_in_progress(&self, in_progress: bool) {
        self.state.write().transaction_history_on_progress = in_progress;
    }

    pub(crate) fn store_history(&self, transactions: Vec<Transaction>) {
        let mut state = self.state.write();
        state.transaction_history = transactions;
        state.is_transaction_history_valid = true;
    }
}

impl std::fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletRecord")
            .field("id", &self.id)
            .field("credentials", &*self.credentials.read())
            .finish_non_exhaustive()
    }
}
