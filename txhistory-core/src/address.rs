//! Legacy address repair
//!
//! Litecoin P2SH outputs used to be reported with Bitcoin's `0x05` script
//! version (`3...`). Those are re-encoded with Litecoin's `0x32` version
//! (`M...`) so they match what the user sees elsewhere.

use crate::{Error, Result};

/// Bitcoin-style P2SH version byte historically reused by Litecoin
pub const LEGACY_P2SH_VERSION: u8 = 0x05;

/// Litecoin P2SH version byte
pub const LTC_P2SH_VERSION: u8 = 0x32;

/// Decode a base58check address into its version byte and hash payload
pub fn decode_legacy_address(address: &str) -> Result<(u8, Vec<u8>)> {
    let data = bs58::decode(address)
        .with_check(None)
        .into_vec()
        .map_err(|e| Error::InvalidAddress(format!("{}: {}", address, e)))?;

    match data.split_first() {
        Some((version, payload)) => Ok((*version, payload.to_vec())),
        None => Err(Error::InvalidAddress(format!("{}: empty payload", address))),
    }
}

/// Rewrite a legacy Litecoin P2SH address; any other address is returned unchanged
pub fn to_ltc_address(address: &str) -> String {
    match decode_legacy_address(address) {
        Ok((LEGACY_P2SH_VERSION, payload)) => {
            let mut data = Vec::with_capacity(payload.len() + 1);
            data.push(LTC_P2SH_VERSION);
            data.extend_from_slice(&payload);
            let converted = bs58::encode(data).with_check().into_string();
            tracing::debug!("Translated legacy LTC address {} -> {}", address, converted);
            converted
        }
        _ => address.to_string(),
    }
}
