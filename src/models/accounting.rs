use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize, Serializer};

use crate::models::datasets::events::{HistoryEventSubType, HistoryEventType};

/// Composite `(type, subtype, counterparty)` key used to tag events and to
/// index their accounting treatment. Its string form is
/// `{type}__{subtype}__{counterparty}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventTypeIdentifier {
    pub event_type: HistoryEventType,
    pub event_subtype: HistoryEventSubType,
    pub counterparty: Option<String>,
}

impl EventTypeIdentifier {
    pub fn new(
        event_type: HistoryEventType,
        event_subtype: HistoryEventSubType,
        counterparty: Option<&str>,
    ) -> Self {
        Self {
            event_type,
            event_subtype,
            counterparty: counterparty.map(str::to_owned),
        }
    }
}

impl fmt::Display for EventTypeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}__{}__{}",
            self.event_type,
            self.event_subtype,
            self.counterparty.as_deref().unwrap_or_default()
        )
    }
}

impl Serialize for EventTypeIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountingMethod {
    Acquisition,
    Spend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultitakeTreatment {
    Swap,
}

/// How the accounting engine should treat events of one type identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxEventSettings {
    pub taxable: bool,
    pub count_entire_amount_spend: bool,
    pub count_cost_basis_pnl: bool,
    pub method: AccountingMethod,
    /// Number of consecutive matching events this setting governs
    pub take: NonZeroU32,
    pub multitake_treatment: Option<MultitakeTreatment>,
}

/// Accounting configuration that decoders may consult when declaring their
/// event settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingContext {
    pub include_crypto2crypto: bool,
    pub include_gas_costs: bool,
    /// Seconds after which a disposal is tax free, if ever
    #[serde(default)]
    pub taxfree_after_period: Option<i64>,
}

impl Default for AccountingContext {
    fn default() -> Self {
        Self {
            include_crypto2crypto: true,
            include_gas_costs: true,
            taxfree_after_period: None,
        }
    }
}
