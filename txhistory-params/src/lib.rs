//! Currency tables and history constants
//!
//! This crate provides the per-currency formatting parameters, network
//! identifiers and the confirmation/pagination constants shared by the
//! history sync engine.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod currency;
pub mod history;
pub mod network;

pub use currency::{Currency, SUPPORTED_CURRENCIES};
pub use history::{
    DEFAULT_RBF_SEQ_NUMBER, ESCROW_RECLAIM_WINDOW_SECS, FIRST_PAGE_LIMIT, LOW_AMOUNT_RATIO,
    PAGE_LIMIT, SAFE_CONFIRMATIONS, SOFT_CONFIRMATION_LIMIT, TYPICAL_INPUT_SIZE_BYTES,
};
pub use network::NetworkType;

/// Error types for parameter lookups
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid network specified
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    /// Currency not present in the table
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
}

/// Result type for parameter lookups
pub type Result<T> = std::result::Result<T, Error>;
