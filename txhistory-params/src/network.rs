//! Network identifiers as reported by wallet credentials

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Network type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    /// Main network
    #[default]
    Livenet,
    /// Public test network
    Testnet,
    /// Regtest (local development)
    Regtest,
}

impl NetworkType {
    /// Wire name used by the indexer
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Livenet => "livenet",
            Self::Testnet => "testnet",
            Self::Regtest => "regtest",
        }
    }

    /// Check if this is the main network
    pub const fn is_mainnet(&self) -> bool {
        matches!(self, Self::Livenet)
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkType {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "livenet" | "mainnet" => Ok(Self::Livenet),
            "testnet" => Ok(Self::Testnet),
            "regtest" => Ok(Self::Regtest),
            other => Err(crate::Error::InvalidNetwork(other.to_string())),
        }
    }
}
