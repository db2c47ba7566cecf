//! History sync constants

/// Confirmations after which a transaction is displayed as settled ("6+")
pub const SAFE_CONFIRMATIONS: u32 = 6;

/// Cached transactions below this many confirmations are always re-fetched
pub const SOFT_CONFIRMATION_LIMIT: u32 = 12;

/// Final input sequence number; anything below `DEFAULT_RBF_SEQ_NUMBER - 1` signals RBF
pub const DEFAULT_RBF_SEQ_NUMBER: u32 = 0xffff_ffff;

/// Page size of the first history request (fast first paint)
pub const FIRST_PAGE_LIMIT: usize = 5;

/// Page size of every following history request
pub const PAGE_LIMIT: usize = 100;

/// A `moved` entry this close to a `sent` entry is an escrow reclaim artifact
pub const ESCROW_RECLAIM_WINDOW_SECS: i64 = 100;

/// Fee/amount ratio above which an incoming output is not worth spending
pub const LOW_AMOUNT_RATIO: f64 = 0.15;

/// Approximate size of a P2PKH input, used to price spending an output
pub const TYPICAL_INPUT_SIZE_BYTES: u64 = 148;
