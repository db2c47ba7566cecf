//! Presentation builder
//!
//! Derives the UI-facing fields (`ui_icon`, `ui_description`, `ui_value`,
//! `ui_time`) and groups a time-ordered list into calendar-month buckets.
//! Works on copies; the cached history is never touched.

use crate::transaction::{Transaction, TxAction};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use txhistory_params::{Currency, NetworkType};

/// Value shown for invalidated transactions
pub const POSSIBLE_DOUBLE_SPEND: &str = "(possible double spend)";

/// Title of the group holding the current month
pub const RECENT_GROUP_TITLE: &str = "Recent";

const CONTRACT_INTERACTION: &str = "Interaction with contract";

/// Display icon
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxIcon {
    /// Awaiting first confirmation
    Confirming,
    /// Outgoing
    Sent,
    /// Incoming
    Received,
    /// Self transfer
    Moved,
    /// Failed or invalid
    Error,
    /// Specialized icon of the service that originated a send
    Service(String),
}

/// Address book entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Display name
    pub name: String,
    /// Address
    pub address: String,
    /// Coin the address belongs to; `None` matches any coin
    #[serde(default)]
    pub coin: Option<String>,
    /// Network the address belongs to; `None` matches any network
    #[serde(default)]
    pub network: Option<NetworkType>,
}

impl Contact {
    /// Create a contact valid for any coin
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            coin: None,
            network: None,
        }
    }

    fn matches(&self, address: &str, currency: &Currency) -> bool {
        self.address == address
            && self
                .coin
                .as_deref()
                .map_or(true, |coin| coin.eq_ignore_ascii_case(&currency.code))
    }
}

/// A month bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxGroup {
    /// `"Recent"` or the month name
    pub title: String,
    /// Transactions in list order
    pub data: Vec<Transaction>,
}

fn contact_name<'a>(
    contacts: &'a [Contact],
    address: Option<&str>,
    currency: &Currency,
) -> Option<&'a str> {
    let address = address?;
    contacts
        .iter()
        .find(|c| c.matches(address, currency))
        .map(|c| c.name.as_str())
}

/// Decorate transactions for display using the current time
pub fn to_display_list(
    transactions: &[Transaction],
    currency: &Currency,
    contacts: &[Contact],
) -> Vec<Transaction> {
    to_display_list_at(transactions, currency, contacts, Utc::now())
}

/// Decorate transactions for display relative to `now`
pub fn to_display_list_at(
    transactions: &[Transaction],
    currency: &Currency,
    contacts: &[Contact],
    now: DateTime<Utc>,
) -> Vec<Transaction> {
    transactions
        .iter()
        .map(|tx| decorate(tx.clone(), currency, contacts, now))
        .collect()
}

fn decorate(
    mut tx: Transaction,
    currency: &Currency,
    contacts: &[Contact],
    now: DateTime<Utc>,
) -> Transaction {
    let not_zero_amount_eth = !(tx.amount == 0 && currency.is_evm_native());
    let contact = contact_name(contacts, tx.first_output_address(), currency).map(str::to_string);
    let note_body = tx.note_body().map(str::to_string);
    let (service, to_wallet_name) = match &tx.custom_data {
        Some(data) => (data.service.clone(), data.to_wallet_name.clone()),
        None => (None, None),
    };

    let mut icon = None;
    let mut description = None;

    if tx.confirmations == 0 {
        icon = Some(TxIcon::Confirming);

        if not_zero_amount_eth {
            description = match (tx.action, contact.as_ref()) {
                (TxAction::Sent | TxAction::Moved, Some(name)) => Some(name.clone()),
                (TxAction::Sent, None) => Some("Sending".to_string()),
                (TxAction::Moved, None) => Some("Moving".to_string()),
                (TxAction::Received, _) => Some("Receiving".to_string()),
                _ => None,
            };
        }
    } else if currency.is_evm() && tx.error.is_some() {
        icon = Some(TxIcon::Error);
    } else {
        match tx.action {
            TxAction::Sent => {
                icon = Some(service.map_or(TxIcon::Sent, TxIcon::Service));
                if not_zero_amount_eth {
                    description = note_body
                        .or_else(|| tx.message.clone())
                        .or(contact)
                        .or_else(|| to_wallet_name.map(|name| format!("Sent to {}", name)))
                        .or_else(|| Some("Sent".to_string()));
                }
            }
            TxAction::Received => {
                icon = Some(TxIcon::Received);
                description = note_body
                    .or(contact)
                    .or_else(|| Some("Received".to_string()));
            }
            TxAction::Moved => {
                icon = Some(TxIcon::Moved);
                description = note_body
                    .or_else(|| tx.message.clone())
                    .or_else(|| Some("Sent to self".to_string()));
            }
            TxAction::Invalid => {
                icon = Some(TxIcon::Error);
                description = Some("Invalid".to_string());
            }
        }
    }

    let mut value = None;
    if !not_zero_amount_eth {
        description = Some(match description {
            Some(d) => format!("{} {}", CONTRACT_INTERACTION, d),
            None => CONTRACT_INTERACTION.to_string(),
        });
        value = tx.fee_str.clone();
    }

    if tx.action == TxAction::Invalid {
        value = Some(POSSIBLE_DOUBLE_SPEND.to_string());
    } else if not_zero_amount_eth {
        value = tx.amount_str.clone();
    }

    tx.ui_icon = icon;
    tx.ui_description = description;
    tx.ui_value = value;
    tx.ui_time = Some(format_time(tx.time, now));
    tx
}

fn to_datetime(time: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(time, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn format_time(time: i64, now: DateTime<Utc>) -> String {
    let elapsed = now.timestamp() - time;
    if (0..86_400).contains(&elapsed) {
        return relative_time(elapsed);
    }
    to_datetime(time).format("%b %-d, %Y").to_string()
}

fn relative_time(secs: i64) -> String {
    let minutes = (secs as f64 / 60.0).round() as i64;
    let hours = (secs as f64 / 3600.0).round() as i64;
    match secs {
        s if s < 45 => "a few seconds ago".to_string(),
        s if s < 90 => "a minute ago".to_string(),
        s if s < 45 * 60 => format!("{} minutes ago", minutes),
        s if s < 90 * 60 => "an hour ago".to_string(),
        s if s < 22 * 3600 => format!("{} hours ago", hours),
        _ => "a day ago".to_string(),
    }
}

fn same_month(a: i64, b: i64) -> bool {
    let (a, b) = (to_datetime(a), to_datetime(b));
    a.year() == b.year() && a.month() == b.month()
}

/// Group a newest-first list by calendar month (UTC) using the current time
pub fn group_by_month(transactions: &[Transaction]) -> Vec<TxGroup> {
    group_by_month_at(transactions, Utc::now())
}

/// Group a newest-first list by calendar month (UTC) relative to `now`
pub fn group_by_month_at(transactions: &[Transaction], now: DateTime<Utc>) -> Vec<TxGroup> {
    let mut groups: Vec<Vec<Transaction>> = Vec::new();

    for (index, tx) in transactions.iter().enumerate() {
        let first_in_group = index == 0 || !same_month(tx.time, transactions[index - 1].time);
        match groups.last_mut() {
            Some(group) if !first_in_group => group.push(tx.clone()),
            _ => groups.push(vec![tx.clone()]),
        }
    }

    groups
        .into_iter()
        .map(|data| {
            let first = to_datetime(data[0].time);
            let title = if first.year() == now.year() && first.month() == now.month() {
                RECENT_GROUP_TITLE.to_string()
            } else {
                first.format("%B").to_string()
            };
            TxGroup { title, data }
        })
        .collect()
}
