use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

pub const ETHEREUM_CHAIN_ID: u64 = 1;

/// Semantic identity of a token. `decimals` may be missing for assets whose
/// metadata was never fully populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub identifier: String,
    #[serde(default)]
    pub address: Option<Address>,
    pub symbol: String,
    #[serde(default)]
    pub decimals: Option<u8>,
}

impl Asset {
    pub fn evm_token(address: Address, symbol: impl Into<String>, decimals: Option<u8>) -> Self {
        Self {
            identifier: evm_token_identifier(address),
            address: Some(address),
            symbol: symbol.into(),
            decimals,
        }
    }
}

/// `eip155:<chain>/erc20:<checksummed address>`
pub fn evm_token_identifier(address: Address) -> String {
    format!("eip155:{ETHEREUM_CHAIN_ID}/erc20:{}", address.to_checksum(None))
}

/// Asset entry as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetEntry {
    pub address: Address,
    pub symbol: String,
    #[serde(default)]
    pub decimals: Option<u8>,
}

impl From<AssetEntry> for Asset {
    fn from(entry: AssetEntry) -> Self {
        Asset::evm_token(entry.address, entry.symbol, entry.decimals)
    }
}
