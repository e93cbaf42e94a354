use alloy_primitives::{Address, B256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimal transaction context handed to decoders for reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmTransaction {
    pub tx_hash: B256,
    pub block_number: u64,
    #[serde(default)]
    pub block_time: Option<DateTime<Utc>>,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
}
