//! Contract every protocol decoder implements.
//!
//! A protocol decoder is registered, not subclassed: it hands the registry a
//! table of plain decode functions keyed by the contract addresses it
//! understands, the counterparty tags it may attach to events, and the
//! accounting treatment of every event type it can produce.

use std::collections::HashMap;

use alloy_primitives::Address;

use crate::assets::AssetResolver;
use crate::decoding::structures::{ActionItem, DecodeOutput};
use crate::models::accounting::{AccountingContext, EventTypeIdentifier, TxEventSettings};
use crate::models::datasets::events::HistoryEvent;
use crate::models::datasets::logs::TxReceiptLog;
use crate::models::datasets::transactions::EvmTransaction;
use crate::models::errors::DecodeError;

/// Everything a decode function sees while processing one log.
///
/// `decoded_events` and `action_items` are borrowed exclusively for the
/// duration of the call; nothing else touches them until it returns.
pub struct DecoderContext<'a> {
    pub tx_log: &'a TxReceiptLog,
    pub transaction: &'a EvmTransaction,
    pub decoded_events: &'a mut Vec<HistoryEvent>,
    pub all_logs: &'a [TxReceiptLog],
    pub action_items: &'a mut Vec<ActionItem>,
    pub assets: &'a dyn AssetResolver,
}

/// Decodes a single log.
///
/// Returns an empty [`DecodeOutput`] when the log is not the decoder's, and a
/// [`DecodeError`] only for logs whose layout is broken.
pub type DecodeFn = fn(&mut DecoderContext<'_>) -> Result<DecodeOutput, DecodeError>;

pub trait DecoderInterface: Send + Sync {
    /// Unique, stable decoder name used in logs, metrics and failure reports.
    fn name(&self) -> &'static str;

    /// Decode functions per contract address, in the order they should run.
    fn addresses_to_decoders(&self) -> HashMap<Address, Vec<DecodeFn>>;

    /// Counterparty tags this decoder may attach to events.
    fn counterparties(&self) -> Vec<&'static str>;

    /// Accounting treatment of each event type this decoder can produce.
    ///
    /// Called whenever the accounting configuration may have changed, so it
    /// must be computed from `ctx` each time rather than cached.
    fn event_settings(
        &self,
        ctx: &AccountingContext,
    ) -> HashMap<EventTypeIdentifier, TxEventSettings>;
}
