//! Canonical transaction record
//!
//! The same struct carries the raw indexer fields, the derived fields added
//! during normalization and the presentation-only fields added for display.
//! Field names follow the indexer's camelCase wire contract.

use crate::display::TxIcon;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Transaction identifier
pub type TxId = String;

/// Transaction classification reported by the indexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxAction {
    /// Funds left the wallet
    #[default]
    Sent,
    /// Funds entered the wallet
    Received,
    /// Funds moved between the wallet's own addresses
    Moved,
    /// Transaction was invalidated (double spend)
    Invalid,
}

impl TxAction {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Received => "received",
            Self::Moved => "moved",
            Self::Invalid => "invalid",
        }
    }
}

/// Transaction output
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOutput {
    /// Recipient address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Amount in the smallest unit
    #[serde(default)]
    pub amount: u128,
    /// Formatted amount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_str: Option<String>,
}

/// User note attached to a transaction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxNote {
    /// Transaction the note belongs to (present on notes endpoint records)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<TxId>,
    /// Plain note body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Encrypted body (never cached)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_body: Option<String>,
    /// Encrypted editor name (never cached)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_edited_by_name: Option<String>,
    /// Editor copayer id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_by: Option<String>,
    /// Edit timestamp (unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_on: Option<i64>,
}

impl TxNote {
    /// Drop encrypted sub-fields
    pub fn strip_encrypted(&mut self) {
        self.encrypted_body = None;
        self.encrypted_edited_by_name = None;
    }
}

/// Application metadata attached to a send
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomData {
    /// Service that originated the payment (gift cards, debit card top-up, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Name of the receiving wallet for wallet-to-wallet transfers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_wallet_name: Option<String>,
}

/// Input spent by a transaction, as returned by the coins lookup
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxInputCoin {
    /// Input sequence number
    #[serde(default)]
    pub sequence_number: Option<u32>,
    /// Height the spent output was mined at; negative while unconfirmed
    #[serde(default)]
    pub mint_height: i64,
}

/// A wallet transaction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Transaction id (dedup key)
    pub txid: TxId,
    /// Classification
    #[serde(default)]
    pub action: TxAction,
    /// Amount in the smallest unit
    #[serde(default)]
    pub amount: u128,
    /// Fee in the chain's smallest unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<u128>,
    /// Legacy fee field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<u128>,
    /// Serialized size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Unix timestamp (seconds)
    #[serde(default)]
    pub time: i64,
    /// Confirmation count
    #[serde(default)]
    pub confirmations: u32,
    /// Outputs
    #[serde(default)]
    pub outputs: Vec<TxOutput>,
    /// First recipient address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    /// Legacy recipient address field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_to: Option<String>,
    /// Embedded payment message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Application metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
    /// Execution error (EVM chains)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// User note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<TxNote>,

    /// Formatted amount (`"0.5 BTC"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_str: Option<String>,
    /// Numeric part of `amount_str`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_value_str: Option<String>,
    /// Unit part of `amount_str`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_unit_str: Option<String>,
    /// Formatted fee or `"N/A"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_str: Option<String>,
    /// Fee rate (`"12 sat/byte"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_rate: Option<String>,
    /// Number of recipients of a multi-output send
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_count: Option<usize>,
    /// Multi-output send
    #[serde(default)]
    pub has_multiples_outputs: bool,
    /// Replace-by-fee signalled (BTC, unconfirmed only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_rbf: Option<bool>,
    /// Spends unconfirmed outputs (BTC, unconfirmed only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_unconfirmed_inputs: Option<bool>,
    /// `"6+"` once safely confirmed; written as `false` until then
    #[serde(default, with = "safe_confirmed_label")]
    pub safe_confirmed: Option<String>,
    /// Amount is below the economically spendable threshold (UTXO coins)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_amount: Option<bool>,
    /// Touched by the latest sync pass
    #[serde(default)]
    pub recent: bool,

    /// Display icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_icon: Option<TxIcon>,
    /// Display description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_description: Option<String>,
    /// Display value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_value: Option<String>,
    /// Display time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_time: Option<String>,
}

impl Transaction {
    /// Create a bare record as the indexer would report it
    pub fn new(txid: impl Into<TxId>, action: TxAction, amount: u128, time: i64) -> Self {
        Self {
            txid: txid.into(),
            action,
            amount,
            time,
            ..Default::default()
        }
    }

    /// Fee from `fee`, falling back to the legacy `fees` field
    pub fn fee_amount(&self) -> Option<u128> {
        self.fee.or(self.fees)
    }

    /// Address of the first output
    pub fn first_output_address(&self) -> Option<&str> {
        self.outputs.first().and_then(|o| o.address.as_deref())
    }

    /// Note body, if any
    pub fn note_body(&self) -> Option<&str> {
        self.note.as_ref().and_then(|n| n.body.as_deref())
    }
}

/// Keep the first entry per txid, preserving order
pub fn dedup_by_txid<I>(transactions: I) -> Vec<Transaction>
where
    I: IntoIterator<Item = Transaction>,
{
    let mut seen = HashSet::new();
    transactions
        .into_iter()
        .filter(|tx| seen.insert(tx.txid.clone()))
        .collect()
}

/// Stable newest-first sort by `time`
pub fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.time.cmp(&a.time));
}

/// `safeConfirmed` is either a label such as `"6+"` or `false` on the wire
mod safe_confirmed_label {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Label(String),
        Flag(bool),
    }

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(label) => label.serialize(serializer),
            None => false.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Wire>::deserialize(deserializer)? {
            Some(Wire::Label(label)) => Some(label),
            Some(Wire::Flag(_)) | None => None,
        })
    }
}
