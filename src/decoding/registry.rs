//! Registry routing logs to decode functions by emitter address.
//!
//! Built once at startup and read-only afterwards, so it can be shared
//! between threads decoding different transactions.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use alloy_primitives::Address;
use tracing::{info, warn};

use crate::decoding::interfaces::{DecodeFn, DecoderInterface};
use crate::models::accounting::{AccountingContext, EventTypeIdentifier, TxEventSettings};
use crate::models::errors::RegistryError;

/// A decode function together with the decoder that contributed it.
#[derive(Clone, Copy)]
pub struct RegisteredDecodeFn {
    pub decoder: &'static str,
    pub func: DecodeFn,
}

pub struct DecoderRegistry {
    decoders: Vec<Arc<dyn DecoderInterface>>,
    /// Decode functions per contract, in registration order
    address_index: HashMap<Address, Vec<RegisteredDecodeFn>>,
    /// Counterparty -> owning decoder
    counterparty_index: HashMap<&'static str, &'static str>,
    /// Event type identifier -> owning decoder
    settings_index: HashMap<EventTypeIdentifier, &'static str>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self {
            decoders: Vec::new(),
            address_index: HashMap::new(),
            counterparty_index: HashMap::new(),
            settings_index: HashMap::new(),
        }
    }

    /// Registers a decoder, rejecting it if its name, one of its
    /// counterparties or one of its event type identifiers is already taken.
    pub fn register(&mut self, decoder: Arc<dyn DecoderInterface>) -> Result<(), RegistryError> {
        let name = decoder.name();
        if self.decoders.iter().any(|existing| existing.name() == name) {
            return Err(RegistryError::DuplicateDecoder {
                decoder: name.to_string(),
            });
        }

        let counterparties = decoder.counterparties();
        for counterparty in &counterparties {
            if let Some(existing) = self.counterparty_index.get(counterparty) {
                return Err(RegistryError::DuplicateCounterparty {
                    counterparty: counterparty.to_string(),
                    decoder: name.to_string(),
                    existing: existing.to_string(),
                });
            }
        }

        let identifiers: Vec<EventTypeIdentifier> = decoder
            .event_settings(&AccountingContext::default())
            .into_keys()
            .collect();
        for identifier in &identifiers {
            if let Some(existing) = self.settings_index.get(identifier) {
                return Err(RegistryError::DuplicateEventSettings {
                    identifier: identifier.to_string(),
                    decoder: name.to_string(),
                    existing: existing.to_string(),
                });
            }
        }

        let routes = decoder.addresses_to_decoders();
        info!(
            "Registered decoder '{}' ({} addresses, {} counterparties)",
            name,
            routes.len(),
            counterparties.len()
        );

        for (address, funcs) in routes {
            self.address_index
                .entry(address)
                .or_default()
                .extend(funcs.into_iter().map(|func| RegisteredDecodeFn {
                    decoder: name,
                    func,
                }));
        }
        for counterparty in counterparties {
            self.counterparty_index.insert(counterparty, name);
        }
        for identifier in identifiers {
            self.settings_index.insert(identifier, name);
        }
        self.decoders.push(decoder);
        Ok(())
    }

    /// Decode functions registered for logs emitted by `address`.
    pub fn decoders_for(&self, address: &Address) -> &[RegisteredDecodeFn] {
        self.address_index
            .get(address)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn counterparties(&self) -> BTreeSet<&'static str> {
        self.counterparty_index.keys().copied().collect()
    }

    pub fn is_known_counterparty(&self, counterparty: &str) -> bool {
        self.counterparty_index.contains_key(counterparty)
    }

    /// Accounting settings of all registered decoders, computed for `ctx`.
    pub fn event_settings(
        &self,
        ctx: &AccountingContext,
    ) -> HashMap<EventTypeIdentifier, TxEventSettings> {
        let mut merged = HashMap::new();
        for decoder in &self.decoders {
            for (identifier, settings) in decoder.event_settings(ctx) {
                if merged.contains_key(&identifier) {
                    warn!(
                        "Decoder '{}' redeclares settings for {}, keeping the first",
                        decoder.name(),
                        identifier
                    );
                    continue;
                }
                merged.insert(identifier, settings);
            }
        }
        merged
    }

    pub fn decoder_count(&self) -> usize {
        self.decoders.len()
    }

    pub fn address_count(&self) -> usize {
        self.address_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the registry with every built-in protocol decoder.
pub fn build_registry() -> Result<DecoderRegistry, RegistryError> {
    let mut registry = DecoderRegistry::new();

    super::protocols::register_decoders(&mut registry)?;

    info!(
        "Built decoder registry with {} decoders over {} contract addresses",
        registry.decoder_count(),
        registry.address_count()
    );

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoding::interfaces::DecoderContext;
    use crate::decoding::protocols::votium::{CPT_VOTIUM, VOTIUM_CONTRACT, VotiumDecoder};
    use crate::decoding::structures::DecodeOutput;
    use crate::models::accounting::AccountingMethod;
    use crate::models::datasets::events::{HistoryEventSubType, HistoryEventType};
    use crate::models::errors::DecodeError;
    use alloy_primitives::address;
    use std::num::NonZeroU32;

    fn noop(_ctx: &mut DecoderContext<'_>) -> Result<DecodeOutput, DecodeError> {
        Ok(DecodeOutput::none())
    }

    /// Decoder with configurable name and counterparty, sharing Votium's contract.
    struct FakeDecoder {
        name: &'static str,
        counterparty: &'static str,
    }

    impl DecoderInterface for FakeDecoder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn addresses_to_decoders(&self) -> HashMap<Address, Vec<DecodeFn>> {
            HashMap::from([(VOTIUM_CONTRACT, vec![noop as DecodeFn, noop as DecodeFn])])
        }

        fn counterparties(&self) -> Vec<&'static str> {
            vec![self.counterparty]
        }

        fn event_settings(
            &self,
            _ctx: &AccountingContext,
        ) -> HashMap<EventTypeIdentifier, TxEventSettings> {
            HashMap::from([(
                EventTypeIdentifier::new(
                    HistoryEventType::Receive,
                    HistoryEventSubType::Reward,
                    Some(self.counterparty),
                ),
                TxEventSettings {
                    taxable: false,
                    count_entire_amount_spend: false,
                    count_cost_basis_pnl: false,
                    method: AccountingMethod::Acquisition,
                    take: NonZeroU32::MIN,
                    multitake_treatment: None,
                },
            )])
        }
    }

    #[test]
    fn test_build_registry_routes_votium() {
        let registry = build_registry().unwrap();
        assert_eq!(registry.decoder_count(), 1);
        assert_eq!(registry.decoders_for(&VOTIUM_CONTRACT).len(), 1);
        assert_eq!(registry.decoders_for(&VOTIUM_CONTRACT)[0].decoder, "votium");
        assert!(
            registry
                .decoders_for(&address!("D533a949740bb3306d119CC777fa900bA034cd52"))
                .is_empty()
        );
        assert!(registry.is_known_counterparty(CPT_VOTIUM));
        assert!(!registry.is_known_counterparty("convex"));
    }

    #[test]
    fn test_functions_keep_registration_order() {
        let mut registry = DecoderRegistry::new();
        registry.register(Arc::new(VotiumDecoder)).unwrap();
        registry
            .register(Arc::new(FakeDecoder {
                name: "fake",
                counterparty: "fake",
            }))
            .unwrap();

        let names: Vec<_> = registry
            .decoders_for(&VOTIUM_CONTRACT)
            .iter()
            .map(|entry| entry.decoder)
            .collect();
        assert_eq!(names, vec!["votium", "fake", "fake"]);
        assert_eq!(registry.address_count(), 1);
        assert_eq!(
            registry.counterparties().into_iter().collect::<Vec<_>>(),
            vec!["fake", "votium"]
        );
        assert_eq!(registry.event_settings(&AccountingContext::default()).len(), 2);
    }

    #[test]
    fn test_rejects_duplicate_decoder() {
        let mut registry = DecoderRegistry::new();
        registry.register(Arc::new(VotiumDecoder)).unwrap();
        assert_eq!(
            registry.register(Arc::new(VotiumDecoder)),
            Err(RegistryError::DuplicateDecoder {
                decoder: "votium".to_string()
            })
        );
    }

    #[test]
    fn test_rejects_colliding_counterparty() {
        let mut registry = DecoderRegistry::new();
        registry.register(Arc::new(VotiumDecoder)).unwrap();
        let err = registry
            .register(Arc::new(FakeDecoder {
                name: "impostor",
                counterparty: CPT_VOTIUM,
            }))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateCounterparty {
                counterparty: "votium".to_string(),
                decoder: "impostor".to_string(),
                existing: "votium".to_string(),
            }
        );
        // a rejected decoder leaves no routes behind
        assert_eq!(registry.decoders_for(&VOTIUM_CONTRACT).len(), 1);
        assert_eq!(registry.decoder_count(), 1);
    }

    /// Own name and counterparty, but declares Votium's reward settings.
    struct RewardCopycat;

    impl DecoderInterface for RewardCopycat {
        fn name(&self) -> &'static str {
            "copycat"
        }

        fn addresses_to_decoders(&self) -> HashMap<Address, Vec<DecodeFn>> {
            HashMap::from([(VOTIUM_CONTRACT, vec![noop as DecodeFn])])
        }

        fn counterparties(&self) -> Vec<&'static str> {
            vec!["copycat"]
        }

        fn event_settings(
            &self,
            ctx: &AccountingContext,
        ) -> HashMap<EventTypeIdentifier, TxEventSettings> {
            VotiumDecoder.event_settings(ctx)
        }
    }

    #[test]
    fn test_rejects_colliding_event_settings() {
        let mut registry = DecoderRegistry::new();
        registry.register(Arc::new(VotiumDecoder)).unwrap();

        let err = registry.register(Arc::new(RewardCopycat)).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateEventSettings {
                identifier: "receive__reward__votium".to_string(),
                decoder: "copycat".to_string(),
                existing: "votium".to_string(),
            }
        );

        assert_eq!(registry.decoders_for(&VOTIUM_CONTRACT).len(), 1);
        assert_eq!(registry.decoder_count(), 1);
        assert!(!registry.is_known_counterparty("copycat"));
        assert_eq!(registry.event_settings(&AccountingContext::default()).len(), 1);
    }
}
