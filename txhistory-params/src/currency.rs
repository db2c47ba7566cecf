//! Currency definitions
//!
//! Each wallet currency maps to the chain its fees are paid on, the number of
//! decimals of its smallest unit and a few classification flags used while
//! normalizing history.

use once_cell::sync::Lazy;
use std::borrow::Cow;
use std::collections::HashMap;

/// Currency parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    /// Lowercase abbreviation (`btc`, `usdc`, ...)
    pub code: Cow<'static, str>,
    /// Chain the currency lives on; fees are denominated in this chain's coin
    pub chain: &'static str,
    /// Decimals between the smallest unit and one whole coin
    pub unit_decimals: u32,
    /// Maximum decimals shown in formatted amounts
    pub display_decimals: u32,
    /// UTXO-based coin
    pub is_utxo: bool,
    /// ERC-20 token on an EVM chain
    pub is_erc_token: bool,
}

impl Currency {
    const fn coin(
        code: &'static str,
        unit_decimals: u32,
        display_decimals: u32,
        is_utxo: bool,
    ) -> Self {
        Self {
            code: Cow::Borrowed(code),
            chain: code,
            unit_decimals,
            display_decimals,
            is_utxo,
            is_erc_token: false,
        }
    }

    const fn token(code: &'static str, chain: &'static str, unit_decimals: u32) -> Self {
        Self {
            code: Cow::Borrowed(code),
            chain,
            unit_decimals,
            display_decimals: if unit_decimals < 6 { unit_decimals } else { 6 },
            is_utxo: false,
            is_erc_token: true,
        }
    }

    /// Bitcoin parameters
    pub const fn btc() -> Self {
        Self::coin("btc", 8, 8, true)
    }

    /// Ethereum parameters
    pub const fn eth() -> Self {
        Self::coin("eth", 18, 8, false)
    }

    /// Look up a currency by abbreviation (case-insensitive)
    pub fn lookup(code: &str) -> Option<Currency> {
        CURRENCY_INDEX.get(code.to_ascii_lowercase().as_str()).cloned()
    }

    /// Look up a currency, falling back to a custom ERC-20 token when the
    /// abbreviation is unknown but the token's decimals are provided.
    pub fn lookup_or_token(code: &str, token_decimals: Option<u32>) -> crate::Result<Currency> {
        if let Some(currency) = Self::lookup(code) {
            return Ok(currency);
        }
        match token_decimals {
            Some(decimals) => Ok(Self::custom_token(code, decimals)),
            None => Err(crate::Error::UnknownCurrency(code.to_string())),
        }
    }

    /// Currency of a wallet on `coin`, or of its token when one is set.
    ///
    /// Tokens on an EVM chain pay fees in that chain's coin, so a USDC wallet
    /// on `matic` formats its fees in MATIC.
    pub fn for_wallet(coin: &str, token: Option<(&str, u32)>) -> crate::Result<Currency> {
        let Some((symbol, decimals)) = token else {
            return Self::lookup_or_token(coin, None);
        };
        let mut currency = Self::lookup_or_token(symbol, Some(decimals))?;
        if let Some(chain) = Self::lookup(coin).filter(|c| c.is_evm_native()) {
            currency.chain = chain.chain;
        }
        Ok(currency)
    }

    /// Custom ERC-20 token (not part of the built-in table)
    pub fn custom_token(code: &str, unit_decimals: u32) -> Currency {
        Currency {
            code: Cow::Owned(code.to_ascii_lowercase()),
            ..Self::token("", "eth", unit_decimals)
        }
    }

    /// Parameters of the chain this currency lives on
    pub fn chain_currency(&self) -> Currency {
        Self::lookup(self.chain).unwrap_or_else(Self::eth)
    }

    /// Unit label used in formatted amounts (`BTC`, `USDC`)
    pub fn unit_label(&self) -> String {
        self.code.to_ascii_uppercase()
    }

    /// Native coin of an EVM chain (contract interactions carry zero amount)
    pub fn is_evm_native(&self) -> bool {
        !self.is_erc_token && EVM_CHAINS.contains(&self.chain) && self.code == self.chain
    }

    /// Coin or token living on an EVM chain
    pub fn is_evm(&self) -> bool {
        EVM_CHAINS.contains(&self.chain)
    }

    /// Bitcoin itself (the only chain where RBF inputs are inspected)
    pub fn is_btc(&self) -> bool {
        self.code == "btc"
    }

    /// Litecoin (legacy output addresses are rewritten)
    pub fn is_ltc(&self) -> bool {
        self.code == "ltc"
    }

    /// Bitcoin Cash (zero-confirmation escrow support)
    pub fn is_bch(&self) -> bool {
        self.code == "bch"
    }
}

const EVM_CHAINS: &[&str] = &["eth", "matic"];

/// Built-in currency table
pub static SUPPORTED_CURRENCIES: &[Currency] = &[
    Currency::coin("btc", 8, 8, true),
    Currency::coin("bch", 8, 8, true),
    Currency::coin("ltc", 8, 8, true),
    Currency::coin("doge", 8, 8, true),
    Currency::coin("eth", 18, 8, false),
    Currency::coin("matic", 18, 8, false),
    Currency::coin("xrp", 6, 6, false),
    Currency::token("usdc", "eth", 6),
    Currency::token("usdt", "eth", 6),
    Currency::token("pax", "eth", 18),
    Currency::token("gusd", "eth", 2),
    Currency::token("busd", "eth", 18),
    Currency::token("dai", "eth", 18),
    Currency::token("wbtc", "eth", 8),
    Currency::token("shib", "eth", 18),
    Currency::token("ape", "eth", 18),
    Currency::token("euroc", "eth", 6),
];

static CURRENCY_INDEX: Lazy<HashMap<&'static str, Currency>> = Lazy::new(|| {
    SUPPORTED_CURRENCIES
        .iter()
        .map(|currency| {
            let code: &'static str = match currency.code {
                Cow::Borrowed(code) => code,
                Cow::Owned(_) => unreachable!("built-in currencies use static codes"),
            };
            (code, currency.clone())
        })
        .collect()
});
