//! Amount formatting
//!
//! Amounts are integers in the currency's smallest unit. Formatting is done
//! with integer arithmetic so wei-denominated values never lose precision.

use crate::error::{Error, Result};
use txhistory_params::Currency;

/// Placeholder shown when a record carries no fee
pub const NOT_AVAILABLE: &str = "N/A";

/// Format an amount without unit (`"0.0015"`)
pub fn format_amount(currency: &Currency, amount: u128) -> String {
    // Past 38 decimals the divisor exceeds u128::MAX, so every amount is a fraction
    let (whole, fraction) = match 10u128.checked_pow(currency.unit_decimals) {
        Some(divisor) => (amount / divisor, amount % divisor),
        None => (0, amount),
    };

    if currency.unit_decimals == 0 || currency.display_decimals == 0 {
        return whole.to_string();
    }

    let padded = format!("{:0width$}", fraction, width = currency.unit_decimals as usize);
    let shown = &padded[..currency.display_decimals.min(currency.unit_decimals) as usize];
    let trimmed = shown.trim_end_matches('0');

    if trimmed.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, trimmed)
    }
}

/// Format an amount with its unit label (`"0.0015 BTC"`)
pub fn format_amount_str(currency: &Currency, amount: u128) -> String {
    format!("{} {}", format_amount(currency, amount), currency.unit_label())
}

/// Sum output amounts
pub fn sum_amounts<I>(amounts: I) -> Result<u128>
where
    I: IntoIterator<Item = u128>,
{
    amounts.into_iter().try_fold(0u128, |total, amount| {
        total
            .checked_add(amount)
            .ok_or_else(|| Error::AmountOverflow(format!("{} + {}", total, amount)))
    })
}

/// Split `"0.0015 BTC"` into value and unit parts
pub fn split_amount_str(amount_str: &str) -> (Option<String>, Option<String>) {
    let mut parts = amount_str.split(' ');
    let value = parts.next().filter(|v| !v.is_empty()).map(str::to_string);
    let unit = parts.next().filter(|u| !u.is_empty()).map(str::to_string);
    (value, unit)
}

/// Fee rate rounded to the nearest integer (`"12 sat/byte"`)
pub fn fee_rate_str(fee: u128, size: u64) -> Option<String> {
    if size == 0 {
        return None;
    }
    let size = size as u128;
    let rate = fee.saturating_add(size / 2) / size;
    Some(format!("{} sat/byte", rate))
}
