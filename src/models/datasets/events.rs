use std::fmt;

use alloy_primitives::{Address, B256};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::accounting::EventTypeIdentifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryEventType {
    Trade,
    Staking,
    Deposit,
    Withdrawal,
    Transfer,
    Spend,
    Receive,
    Adjustment,
    Informational,
    Migrate,
    Renew,
    Unknown,
}

impl HistoryEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trade => "trade",
            Self::Staking => "staking",
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Transfer => "transfer",
            Self::Spend => "spend",
            Self::Receive => "receive",
            Self::Adjustment => "adjustment",
            Self::Informational => "informational",
            Self::Migrate => "migrate",
            Self::Renew => "renew",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HistoryEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryEventSubType {
    #[default]
    None,
    Reward,
    DepositAsset,
    RemoveAsset,
    Fee,
    Spend,
    Receive,
    Approve,
    Deploy,
    Airdrop,
    Bridge,
    Governance,
    GenerateDebt,
    PaybackDebt,
    ReceiveWrapped,
    ReturnWrapped,
    Donate,
    Nft,
}

impl HistoryEventSubType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Reward => "reward",
            Self::DepositAsset => "deposit_asset",
            Self::RemoveAsset => "remove_asset",
            Self::Fee => "fee",
            Self::Spend => "spend",
            Self::Receive => "receive",
            Self::Approve => "approve",
            Self::Deploy => "deploy",
            Self::Airdrop => "airdrop",
            Self::Bridge => "bridge",
            Self::Governance => "governance",
            Self::GenerateDebt => "generate_debt",
            Self::PaybackDebt => "payback_debt",
            Self::ReceiveWrapped => "receive_wrapped",
            Self::ReturnWrapped => "return_wrapped",
            Self::Donate => "donate",
            Self::Nft => "nft",
        }
    }
}

impl fmt::Display for HistoryEventSubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generic financial effect of a transaction, materialized upstream before
/// protocol decoders run. Decoders only touch `event_subtype`, `counterparty`
/// and `notes`; `asset` and `amount` are match keys and stay as they came in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub tx_hash: B256,
    pub sequence_index: u32,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location_label: Option<Address>,
    pub event_type: HistoryEventType,
    #[serde(default)]
    pub event_subtype: HistoryEventSubType,
    pub asset: String,
    pub amount: BigDecimal,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub counterparty: Option<String>,
}

impl HistoryEvent {
    pub fn type_identifier(&self) -> EventTypeIdentifier {
        EventTypeIdentifier::new(
            self.event_type,
            self.event_subtype,
            self.counterparty.as_deref(),
        )
    }
}
