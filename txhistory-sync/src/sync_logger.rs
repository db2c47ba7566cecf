//! Structured logging for history sync passes
//!
//! Every pass records its events in a [`HistorySyncLogger`] and emits them as
//! `tracing` events tagged `event = "history_sync_*"`.

#![allow(missing_docs)]

use tracing::{debug, error, info, warn, Level};

/// History sync event
#[derive(Debug, Clone, PartialEq)]
pub enum HistorySyncEvent {
    /// Pass started
    Started {
        wallet_id: String,
        cached: usize,
        force: bool,
    },
    /// Valid cache returned without network access
    CacheHit { wallet_id: String, cached: usize },
    /// One history page fetched
    PageFetched {
        skip: usize,
        limit: usize,
        fetched: usize,
        load_more: bool,
    },
    /// A request is being retried
    Retrying { operation: String, attempt: u32 },
    /// Notes could not be attached
    NotesSkipped { reason: String },
    /// Pass completed and persisted
    Completed {
        wallet_id: String,
        new_transactions: usize,
        total: usize,
        pages: usize,
        duration_ms: u64,
    },
    /// Result dropped because the wallet identity changed mid-pass
    Discarded { wallet_id: String, total: usize },
    /// Pass failed
    Failed { wallet_id: String, error: String },
}

/// Per-pass event recorder
#[derive(Debug, Default)]
pub struct HistorySyncLogger {
    events: Vec<HistorySyncEvent>,
}

impl HistorySyncLogger {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log_started(&mut self, wallet_id: &str, cached: usize, force: bool) {
        info!(
            event = "history_sync_started",
            wallet_id = %wallet_id,
            cached = %cached,
            force = %force,
            "History sync started"
        );

        self.events.push(HistorySyncEvent::Started {
            wallet_id: wallet_id.to_string(),
            cached,
            force,
        });
    }

    pub fn log_cache_hit(&mut self, wallet_id: &str, cached: usize) {
        debug!(
            event = "history_sync_cache_hit",
            wallet_id = %wallet_id,
            cached = %cached,
            "History served from cache"
        );

        self.events.push(HistorySyncEvent::CacheHit {
            wallet_id: wallet_id.to_string(),
            cached,
        });
    }

    pub fn log_page(&mut self, skip: usize, limit: usize, fetched: usize, load_more: bool) {
        debug!(
            event = "history_sync_page",
            skip = %skip,
            limit = %limit,
            fetched = %fetched,
            load_more = %load_more,
            "History page fetched"
        );

        self.events.push(HistorySyncEvent::PageFetched {
            skip,
            limit,
            fetched,
            load_more,
        });
    }

    pub fn log_retrying(&mut self, operation: &str, attempt: u32) {
        debug!(
            event = "history_sync_retrying",
            operation = %operation,
            attempt = %attempt,
            "History request retrying"
        );

        self.events.push(HistorySyncEvent::Retrying {
            operation: operation.to_string(),
            attempt,
        });
    }

    pub fn log_notes_skipped(&mut self, reason: &str) {
        warn!(
            event = "history_sync_notes_skipped",
            reason = %reason,
            "Could not fetch transaction notes"
        );

        self.events.push(HistorySyncEvent::NotesSkipped {
            reason: reason.to_string(),
        });
    }

    pub fn log_completed(
        &mut self,
        wallet_id: &str,
        new_transactions: usize,
        total: usize,
        pages: usize,
        duration_ms: u64,
    ) {
        info!(
            event = "history_sync_completed",
            wallet_id = %wallet_id,
            new_transactions = %new_transactions,
            total = %total,
            pages = %pages,
            duration_ms = %duration_ms,
            "History sync completed"
        );

        self.events.push(HistorySyncEvent::Completed {
            wallet_id: wallet_id.to_string(),
            new_transactions,
            total,
            pages,
            duration_ms,
        });
    }

    pub fn log_discarded(&mut self, wallet_id: &str, total: usize) {
        warn!(
            event = "history_sync_discarded",
            wallet_id = %wallet_id,
            total = %total,
            "Wallet changed during sync, result not persisted"
        );

        self.events.push(HistorySyncEvent::Discarded {
            wallet_id: wallet_id.to_string(),
            total,
        });
    }

    pub fn log_failed(&mut self, wallet_id: &str, error_msg: &str) {
        error!(
            event = "history_sync_failed",
            wallet_id = %wallet_id,
            error = %error_msg,
            "History sync failed"
        );

        self.events.push(HistorySyncEvent::Failed {
            wallet_id: wallet_id.to_string(),
            error: error_msg.to_string(),
        });
    }

    pub fn events(&self) -> &[HistorySyncEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<HistorySyncEvent> {
        self.events
    }
}

/// Install a JSON subscriber for history sync events
///
/// Fails if a global subscriber is already set.
pub fn init_history_sync_logging() -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .finish()
        .try_init()?;

    info!("History sync logging initialized");
    Ok(())
}
