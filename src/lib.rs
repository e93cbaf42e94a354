//! Protocol-specific annotation of decoded EVM transaction history.
//!
//! Upstream, a generic pipeline turns every transaction receipt into a list
//! of [`HistoryEvent`](models::datasets::events::HistoryEvent)s. The decoders
//! in this crate then walk the raw logs of the transaction, recognize the ones
//! emitted by known protocol contracts and tag the matching events with a
//! subtype, counterparty and notes. Each decoder also declares how the events
//! it tags should be treated by the accounting engine.

pub mod assets;
pub mod decoding;
pub mod metrics;
pub mod models;
pub mod utils;
