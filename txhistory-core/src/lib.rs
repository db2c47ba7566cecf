//! Wallet transaction history core
//!
//! This crate implements the canonical transaction model shared by the sync
//! engine and the UI layer: amount formatting, address repair and the
//! presentation builder that decorates and groups history for display.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod amount;
pub mod display;
pub mod error;
pub mod transaction;

pub use address::{decode_legacy_address, to_ltc_address};
pub use amount::{
    fee_rate_str, format_amount, format_amount_str, split_amount_str, sum_amounts, NOT_AVAILABLE,
};
pub use display::{
    group_by_month, group_by_month_at, to_display_list, to_display_list_at, Contact, TxGroup,
    TxIcon, POSSIBLE_DOUBLE_SPEND, RECENT_GROUP_TITLE,
};
pub use error::{Error, ErrorCategory, Result};
pub use transaction::{
    dedup_by_txid, sort_newest_first, CustomData, Transaction, TxAction, TxId, TxInputCoin,
    TxNote, TxOutput,
};
pub use txhistory_params::{Currency, NetworkType};
