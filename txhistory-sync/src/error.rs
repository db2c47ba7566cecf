//! Error types for history sync operations

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the wallet transport
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Connection-class failure (unreachable, reset, timed out)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Server answered with an HTTP-style status
    #[error("Server error {code}: {message}")]
    Status {
        /// Status code
        code: u16,
        /// Server message
        message: String,
    },

    /// Anything else the transport reports
    #[error("{0}")]
    Other(String),
}

impl BackendError {
    /// Connection errors and 5xx responses are worth retrying
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Connection(_) => true,
            BackendError::Status { code, .. } => (500..=599).contains(code),
            BackendError::Other(_) => false,
        }
    }
}

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport error, propagated unmodified
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A sync pass for this wallet is already running
    #[error("History update already in progress for wallet {0}")]
    HistoryInProgress(String),

    /// Notes lookup failed
    #[error("Could not fetch transaction notes: {0}")]
    NotesFetchFailed(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] txhistory_core::Error),
}

impl Error {
    /// Whether the caller may simply try again later
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Backend(e) => e.is_transient(),
            Error::HistoryInProgress(_) => true,
            Error::NotesFetchFailed(_) | Error::Core(_) => false,
        }
    }
}

impl From<txhistory_params::Error> for Error {
    fn from(e: txhistory_params::Error) -> Self {
        Error::Core(e.into())
    }
}
