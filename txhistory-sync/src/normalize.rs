//! Transaction normalizer
//!
//! [`normalize`] turns one raw indexer record into the canonical shape and
//! performs no I/O. [`BatchNormalizer`] applies it to a fetched page and adds
//! the pass-level fields: time clamping, RBF inspection of unconfirmed BTC
//! transactions, the safe-confirmation label, note stripping and in-batch dedup.

use crate::client::HistoryClient;
use crate::wallet::WalletCredentials;
use crate::Result;
use std::collections::HashSet;
use tracing::debug;
use txhistory_core::{
    fee_rate_str, format_amount_str, split_amount_str, sum_amounts, to_ltc_address, Currency,
    Transaction, TxAction, TxInputCoin, TxOutput, NOT_AVAILABLE,
};
use txhistory_params::DEFAULT_RBF_SEQ_NUMBER;

/// Normalize a raw record for `currency`
///
/// Fails only when a send's output amounts do not fit in `u128`.
pub fn normalize(
    currency: &Currency,
    mut tx: Transaction,
) -> txhistory_core::Result<Transaction> {
    if tx.action == TxAction::Invalid {
        return Ok(tx);
    }

    if !tx.outputs.is_empty() {
        if tx.action != TxAction::Received {
            if tx.outputs.len() > 1 {
                tx.recipient_count = Some(tx.outputs.len());
                tx.has_multiples_outputs = true;
            }
            for output in tx.outputs.iter_mut() {
                output.amount_str = Some(format_amount_str(currency, output.amount));
            }
            tx.amount = sum_amounts(tx.outputs.iter().map(|o| o.amount))?;
        }
        tx.to_address = tx.outputs[0].address.clone();

        if currency.is_ltc() {
            for output in tx.outputs.iter_mut() {
                if let Some(address) = output.address.as_deref() {
                    output.address = Some(to_ltc_address(address));
                }
            }
            tx.to_address = tx.to_address.as_deref().map(to_ltc_address);
        }
    } else {
        tx.outputs = vec![TxOutput {
            address: tx.to_address.clone(),
            amount: tx.amount,
            amount_str: None,
        }];
    }

    let amount_str = format_amount_str(currency, tx.amount);
    let (value, unit) = split_amount_str(&amount_str);
    tx.amount_str = Some(amount_str);
    tx.amount_value_str = value;
    tx.amount_unit_str = unit;

    let chain = currency.chain_currency();
    tx.fee_str = Some(match tx.fee_amount() {
        Some(fee) => format_amount_str(&chain, fee),
        None => NOT_AVAILABLE.to_string(),
    });

    if let (Some(size), Some(fee), Some(_)) = (tx.size, tx.fee_amount(), &tx.amount_unit_str) {
        tx.fee_rate = fee_rate_str(fee, size);
    }

    if currency.is_ltc() {
        tx.address_to = tx.address_to.as_deref().map(to_ltc_address);
    }

    Ok(tx)
}

/// RBF is signalled by any input sequence below `DEFAULT_RBF_SEQ_NUMBER - 1`
pub fn signals_rbf(inputs: &[TxInputCoin]) -> bool {
    inputs.iter().any(|input| {
        matches!(input.sequence_number, Some(seq) if seq != 0 && seq < DEFAULT_RBF_SEQ_NUMBER - 1)
    })
}

/// Any input spends an output that is itself unconfirmed
pub fn spends_unconfirmed(inputs: &[TxInputCoin]) -> bool {
    inputs.iter().any(|input| input.mint_height < 0)
}

/// Normalizes fetched pages for one wallet
pub struct BatchNormalizer<'a> {
    client: &'a HistoryClient,
    credentials: &'a WalletCredentials,
    currency: &'a Currency,
    safe_confirmations: u32,
    now: i64,
}

impl<'a> BatchNormalizer<'a> {
    /// Create a normalizer; `now` bounds record timestamps
    pub fn new(
        client: &'a HistoryClient,
        credentials: &'a WalletCredentials,
        currency: &'a Currency,
        safe_confirmations: u32,
        now: i64,
    ) -> Self {
        Self {
            client,
            credentials,
            currency,
            safe_confirmations,
            now,
        }
    }

    /// Normalize a page, keeping the first record per txid
    pub async fn process(&self, batch: Vec<Transaction>) -> Result<Vec<Transaction>> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(batch.len());

        for raw in batch {
            let mut tx = normalize(self.currency, raw)?;

            if tx.time > self.now {
                tx.time = self.now;
            }

            if tx.confirmations == 0 && self.currency.is_btc() {
                let inputs = self.client.get_coins_for_tx(self.credentials, &tx.txid).await?;
                tx.is_rbf = Some(signals_rbf(&inputs));
                tx.has_unconfirmed_inputs = Some(spends_unconfirmed(&inputs));
            }

            tx.safe_confirmed = (tx.confirmations >= self.safe_confirmations)
                .then(|| format!("{}+", self.safe_confirmations));

            if let Some(note) = tx.note.as_mut() {
                note.strip_encrypted();
            }

            if seen.insert(tx.txid.clone()) {
                out.push(tx);
            } else {
                debug!("Ignoring duplicate TX in history: {}", tx.txid);
            }
        }

        Ok(out)
    }
}
