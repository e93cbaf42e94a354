use std::collections::HashMap;
use std::path::PathBuf;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::models::accounting::{AccountingContext, EventTypeIdentifier, TxEventSettings};
use crate::models::datasets::assets::AssetEntry;
use crate::models::datasets::events::HistoryEvent;
use crate::models::datasets::logs::TxReceiptLog;
use crate::models::datasets::transactions::EvmTransaction;
use crate::models::errors::DecodeError;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub address: String,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: "0.0.0.0".to_string(),
            port: 9100,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub chain_name: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    #[serde(default)]
    pub assets: Vec<AssetEntry>,
    #[serde(default)]
    pub accounting: AccountingContext,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Everything known about one transaction before protocol decoders run: its
/// context, all of its logs and the events the generic pipeline produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionInput {
    pub transaction: EvmTransaction,
    pub logs: Vec<TxReceiptLog>,
    #[serde(default)]
    pub events: Vec<HistoryEvent>,
}

/// A malformed log recorded against its transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogDecodeFailure {
    pub log_index: u64,
    pub decoder: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: DecodeError,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecodedTransaction {
    pub tx_hash: B256,
    pub events: Vec<HistoryEvent>,
    pub failures: Vec<LogDecodeFailure>,
}

#[derive(Debug, Serialize)]
pub struct DecodingReport {
    pub event_settings: HashMap<EventTypeIdentifier, TxEventSettings>,
    pub transactions: Vec<DecodedTransaction>,
}

fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: std::fmt::Display,
    S: serde::Serializer,
{
    serializer.collect_str(value)
}
