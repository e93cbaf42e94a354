use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::models::datasets::events::{HistoryEvent, HistoryEventSubType, HistoryEventType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Rewrite the matching event with the `to_*` fields
    Transform,
    /// Drop the matching event
    Skip,
}

/// Deferred instruction left by one decoder for an event that a later log of
/// the same transaction will produce. Never outlives the transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub action: ActionType,
    pub sequence_index: u32,
    pub from_event_type: HistoryEventType,
    pub from_event_subtype: HistoryEventSubType,
    pub asset: String,
    pub amount: BigDecimal,
    #[serde(default)]
    pub to_event_type: Option<HistoryEventType>,
    #[serde(default)]
    pub to_event_subtype: Option<HistoryEventSubType>,
    #[serde(default)]
    pub to_notes: Option<String>,
    #[serde(default)]
    pub to_counterparty: Option<String>,
}

impl ActionItem {
    pub fn matches(&self, event: &HistoryEvent) -> bool {
        event.event_type == self.from_event_type
            && event.event_subtype == self.from_event_subtype
            && event.asset == self.asset
            && event.amount == self.amount
    }

    /// Applies a `Transform` item to `event`. `Skip` items leave it untouched.
    pub fn apply(&self, event: &mut HistoryEvent) {
        if self.action == ActionType::Skip {
            return;
        }
        if let Some(event_type) = self.to_event_type {
            event.event_type = event_type;
        }
        if let Some(event_subtype) = self.to_event_subtype {
            event.event_subtype = event_subtype;
        }
        if let Some(notes) = &self.to_notes {
            event.notes = Some(notes.clone());
        }
        if let Some(counterparty) = &self.to_counterparty {
            event.counterparty = Some(counterparty.clone());
        }
    }
}

/// Removes and returns the first pending item that matches `event`.
pub fn take_matching_action_item(
    action_items: &mut Vec<ActionItem>,
    event: &HistoryEvent,
) -> Option<ActionItem> {
    let idx = action_items.iter().position(|item| item.matches(event))?;
    Some(action_items.remove(idx))
}

/// Result of running one decode function over one log. Both fields empty
/// means the log was not relevant to the decoder, or it only annotated
/// existing events in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeOutput {
    pub event: Option<HistoryEvent>,
    pub action_item: Option<ActionItem>,
}

impl DecodeOutput {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_event(event: HistoryEvent) -> Self {
        Self {
            event: Some(event),
            action_item: None,
        }
    }

    pub fn with_action_item(action_item: ActionItem) -> Self {
        Self {
            event: None,
            action_item: Some(action_item),
        }
    }

    pub fn is_none(&self) -> bool {
        self.event.is_none() && self.action_item.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;

    fn spend_event(amount: i64) -> HistoryEvent {
        HistoryEvent {
            tx_hash: B256::ZERO,
            sequence_index: 3,
            timestamp: None,
            location_label: None,
            event_type: HistoryEventType::Spend,
            event_subtype: HistoryEventSubType::None,
            asset: "eip155:1/erc20:0xD533a949740bb3306d119CC777fa900bA034cd52".to_string(),
            amount: BigDecimal::from(amount),
            notes: None,
            counterparty: None,
        }
    }

    fn transform_item() -> ActionItem {
        ActionItem {
            action: ActionType::Transform,
            sequence_index: 1,
            from_event_type: HistoryEventType::Spend,
            from_event_subtype: HistoryEventSubType::None,
            asset: "eip155:1/erc20:0xD533a949740bb3306d119CC777fa900bA034cd52".to_string(),
            amount: BigDecimal::from(10),
            to_event_type: Some(HistoryEventType::Deposit),
            to_event_subtype: Some(HistoryEventSubType::DepositAsset),
            to_notes: Some("Deposit 10 CRV".to_string()),
            to_counterparty: Some("votium".to_string()),
        }
    }

    #[test]
    fn test_transform_applies_target_fields() {
        let mut event = spend_event(10);
        let item = transform_item();
        assert!(item.matches(&event));

        item.apply(&mut event);
        assert_eq!(event.event_type, HistoryEventType::Deposit);
        assert_eq!(event.event_subtype, HistoryEventSubType::DepositAsset);
        assert_eq!(event.notes.as_deref(), Some("Deposit 10 CRV"));
        assert_eq!(event.counterparty.as_deref(), Some("votium"));
        assert_eq!(event.amount, BigDecimal::from(10));
    }

    #[test]
    fn test_take_matching_removes_only_matching() {
        let mut items = vec![transform_item()];
        assert!(take_matching_action_item(&mut items, &spend_event(11)).is_none());
        assert_eq!(items.len(), 1);

        let taken = take_matching_action_item(&mut items, &spend_event(10));
        assert!(taken.is_some());
        assert!(items.is_empty());
    }

    #[test]
    fn test_skip_leaves_event_untouched() {
        let mut event = spend_event(10);
        let item = ActionItem {
            action: ActionType::Skip,
            ..transform_item()
        };
        item.apply(&mut event);
        assert_eq!(event, spend_event(10));
    }
}
