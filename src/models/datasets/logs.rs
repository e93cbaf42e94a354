use alloy_primitives::{Address, B256, Bytes, Log};
use serde::{Deserialize, Serialize};

/// A single log emitted during a transaction, as handed over by the chain client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceiptLog {
    #[serde(default)]
    pub log_index: u64,
    pub address: Address,
    pub topics: Vec<B256>,
    #[serde(default)]
    pub data: Bytes,
}

impl TxReceiptLog {
    pub fn new(log_index: u64, address: Address, topics: Vec<B256>, data: Bytes) -> Self {
        Self {
            log_index,
            address,
            topics,
            data,
        }
    }

    pub fn from_primitive(log_index: u64, log: Log) -> Self {
        Self {
            log_index,
            address: log.address,
            topics: log.data.topics().to_vec(),
            data: log.data.data,
        }
    }
}

// Logs fetched from a node carry their own position within the block
impl From<alloy_rpc_types_eth::Log> for TxReceiptLog {
    fn from(log: alloy_rpc_types_eth::Log) -> Self {
        let log_index = log.log_index.unwrap_or_default();
        Self::from_primitive(log_index, log.inner)
    }
}
