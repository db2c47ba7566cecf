//! Per-wallet sync lease
//!
//! At most one history pass runs per wallet. The registry is keyed by the
//! local wallet id and the lease releases itself on drop, so an early return
//! or error inside a pass cannot leave the wallet locked.

use crate::wallet::WalletRecord;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Registry of wallets with a pass in flight
#[derive(Debug, Clone, Default)]
pub struct HistoryLeases {
    inflight: Arc<Mutex<HashSet<String>>>,
}

impl HistoryLeases {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lease for `wallet`, or `None` if a pass already holds it
    pub fn try_acquire<'a>(&self, wallet: &'a WalletRecord) -> Option<HistoryLease<'a>> {
        let mut inflight = self.inflight.lock();
        if inflight.contains(wallet.id()) || !wallet.try_mark_history_in_progress() {
            return None;
        }
        inflight.insert(wallet.id().to_string());
        drop(inflight);

        Some(HistoryLease {
            inflight: Arc::clone(&self.inflight),
            wallet,
        })
    }

    /// A pass holds the lease for `wallet_id`
    pub fn is_held(&self, wallet_id: &str) -> bool {
        self.inflight.lock().contains(wallet_id)
    }
}

/// Held while a pass runs
pub struct HistoryLease<'a> {
    inflight: Arc<Mutex<HashSet<String>>>,
    wallet: &'a WalletRecord,
}

impl Drop for HistoryLease<'_> {
    fn drop(&mut self) {
        self.wallet.set_history_in_progress(false);
        self.inflight.lock().remove(self.wallet.id());
    }
}
