//! Error types for history core

use std::fmt;

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// History core errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Currency is not in the table and carries no token metadata
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// Invalid address format
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Amount overflow
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    /// Network name not recognized
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),
}

impl Error {
    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::UnknownCurrency(_) => ErrorCategory::Currency,
            Error::InvalidAddress(_) => ErrorCategory::Address,
            Error::AmountOverflow(_) => ErrorCategory::Amount,
            Error::InvalidNetwork(_) => ErrorCategory::Network,
        }
    }
}

impl From<txhistory_params::Error> for Error {
    fn from(e: txhistory_params::Error) -> Self {
        match e {
            txhistory_params::Error::UnknownCurrency(code) => Error::UnknownCurrency(code),
            txhistory_params::Error::InvalidNetwork(name) => Error::InvalidNetwork(name),
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Currency lookup errors
    Currency,
    /// Address-related errors
    Address,
    /// Amount-related errors
    Amount,
    /// Network identifier errors
    Network,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Currency => write!(f, "Currency"),
            ErrorCategory::Address => write!(f, "Address"),
            ErrorCategory::Amount => write!(f, "Amount"),
            ErrorCategory::Network => write!(f, "Network"),
        }
    }
}
