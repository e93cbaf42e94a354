pub mod interfaces;
pub mod protocols;
pub mod registry;
pub mod structures;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Result, anyhow};
use tracing::{debug, warn};

use crate::assets::AssetResolver;
use crate::decoding::interfaces::DecoderContext;
use crate::decoding::registry::DecoderRegistry;
use crate::decoding::structures::{ActionItem, ActionType, take_matching_action_item};
use crate::metrics::Metrics;
use crate::models::common::{DecodedTransaction, LogDecodeFailure, TransactionInput};
use crate::models::datasets::events::HistoryEvent;
use crate::models::datasets::transactions::EvmTransaction;

/// Runs the registered protocol decoders over the logs of a transaction.
///
/// Holds no per-transaction state: one instance can decode many transactions
/// concurrently, each with its own event list and pending action items.
pub struct TransactionDecoder {
    registry: DecoderRegistry,
    assets: Arc<dyn AssetResolver>,
    metrics: Option<Arc<Metrics>>,
}

impl TransactionDecoder {
    pub fn new(registry: DecoderRegistry, assets: Arc<dyn AssetResolver>) -> Self {
        Self {
            registry,
            assets,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn registry(&self) -> &DecoderRegistry {
        &self.registry
    }

    /// Decodes one transaction. Logs are visited in the order given; for each
    /// log the decode functions registered for its emitter run in
    /// registration order until one of them produces an event.
    ///
    /// A malformed log is recorded in `failures` and does not stop the
    /// remaining logs from being decoded.
    pub fn decode_transaction(&self, input: TransactionInput) -> DecodedTransaction {
        let start = Instant::now();
        let TransactionInput {
            transaction,
            logs,
            mut events,
        } = input;
        let mut action_items: Vec<ActionItem> = Vec::new();
        let mut failures = Vec::new();

        for tx_log in &logs {
            let decoders = self.registry.decoders_for(&tx_log.address);
            if decoders.is_empty() {
                continue;
            }

            debug!(
                "Routing log {} of {} to {} decode functions",
                tx_log.log_index,
                transaction.tx_hash,
                decoders.len()
            );
            if let Some(metrics) = &self.metrics {
                metrics.logs_routed.add(1, &[metrics.chain_label()]);
            }

            for entry in decoders {
                if let Some(metrics) = &self.metrics {
                    metrics
                        .decoder_invocations
                        .add(1, &metrics.decoder_labels(entry.decoder));
                }

                let result = {
                    let mut ctx = DecoderContext {
                        tx_log,
                        transaction: &transaction,
                        decoded_events: &mut events,
                        all_logs: &logs,
                        action_items: &mut action_items,
                        assets: self.assets.as_ref(),
                    };
                    (entry.func)(&mut ctx)
                };

                match result {
                    Ok(output) => {
                        let produced_event = output.event.is_some();
                        if let Some(event) = output.event {
                            if let Some(metrics) = &self.metrics {
                                metrics
                                    .events_synthesized
                                    .add(1, &metrics.decoder_labels(entry.decoder));
                            }
                            insert_event(&mut events, &mut action_items, event);
                        }
                        // Queued after the event so it only applies to later logs
                        if let Some(item) = output.action_item {
                            debug!(
                                "Decoder '{}' left a {:?} action item for {}",
                                entry.decoder, item.action, transaction.tx_hash
                            );
                            if let Some(metrics) = &self.metrics {
                                metrics
                                    .action_items_created
                                    .add(1, &metrics.decoder_labels(entry.decoder));
                            }
                            action_items.push(item);
                        }
                        if produced_event {
                            break;
                        }
                    }
                    Err(e) if e.is_malformed() => {
                        warn!(
                            "Malformed log {} in {} (decoder '{}'): {}",
                            tx_log.log_index, transaction.tx_hash, entry.decoder, e
                        );
                        if let Some(metrics) = &self.metrics {
                            metrics
                                .malformed_logs
                                .add(1, &metrics.decoder_labels(entry.decoder));
                        }
                        failures.push(LogDecodeFailure {
                            log_index: tx_log.log_index,
                            decoder: entry.decoder.to_string(),
                            error: e,
                        });
                        break;
                    }
                    Err(e) => {
                        warn!(
                            "Decoder '{}' skipped log {} in {}: {}",
                            entry.decoder, tx_log.log_index, transaction.tx_hash, e
                        );
                    }
                }
            }
        }

        if !action_items.is_empty() {
            debug!(
                "Discarding {} unconsumed action items of {}",
                action_items.len(),
                transaction.tx_hash
            );
        }

        events.sort_by_key(|event| event.sequence_index);
        self.check_counterparties(&transaction, &events);

        if let Some(metrics) = &self.metrics {
            metrics.transactions_decoded.add(1, &[metrics.chain_label()]);
            metrics
                .transaction_decode_time
                .record(start.elapsed().as_secs_f64(), &[metrics.chain_label()]);
        }

        DecodedTransaction {
            tx_hash: transaction.tx_hash,
            events,
            failures,
        }
    }

    fn check_counterparties(&self, transaction: &EvmTransaction, events: &[HistoryEvent]) {
        for event in events {
            if let Some(counterparty) = &event.counterparty {
                if !self.registry.is_known_counterparty(counterparty) {
                    warn!(
                        "Event {} of {} has unknown counterparty '{}'",
                        event.sequence_index, transaction.tx_hash, counterparty
                    );
                }
            }
        }
    }
}

/// Adds a decoder-synthesized event, letting a pending action item drop or
/// rewrite it first.
fn insert_event(
    events: &mut Vec<HistoryEvent>,
    action_items: &mut Vec<ActionItem>,
    mut event: HistoryEvent,
) {
    if let Some(item) = take_matching_action_item(action_items, &event) {
        match item.action {
            ActionType::Skip => {
                debug!(
                    "Action item dropped event {} of {}",
                    event.sequence_index, event.tx_hash
                );
                return;
            }
            ActionType::Transform => item.apply(&mut event),
        }
    }
    events.push(event);
}

/// Decodes independent transactions in parallel on the blocking pool. Output
/// order matches input order.
pub async fn decode_batch(
    decoder: Arc<TransactionDecoder>,
    inputs: Vec<TransactionInput>,
) -> Result<Vec<DecodedTransaction>> {
    let tasks = inputs
        .into_iter()
        .map(|input| {
            let decoder = Arc::clone(&decoder);
            tokio::task::spawn_blocking(move || decoder.decode_transaction(input))
        })
        .collect::<Vec<_>>();

    futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|result| result.map_err(|e| anyhow!("Decoding task failed: {}", e)))
        .collect()
}
