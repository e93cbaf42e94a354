//! Votium bribe claims.
//!
//! The MultiMerkleStash contract emits
//! `Claimed(address indexed token, uint256 index, uint256 amount, address indexed account, uint256 update)`
//! after the token transfer to the claimer. The transfer itself is already a
//! RECEIVE event by then; this decoder only tags it as a reward.
//!
//! Layout:
//! - topics[0]: event signature
//! - topics[1]: claimed token
//! - topics[2]: receiver
//! - data[0..32]: merkle index
//! - data[32..64]: claimed amount
//! - data[64..96]: update round

use std::collections::HashMap;
use std::num::NonZeroU32;

use alloy_primitives::{Address, B256, address, b256};
use tracing::{debug, warn};

use crate::decoding::interfaces::{DecodeFn, DecoderContext, DecoderInterface};
use crate::decoding::structures::DecodeOutput;
use crate::models::accounting::{
    AccountingContext, AccountingMethod, EventTypeIdentifier, TxEventSettings,
};
use crate::models::datasets::events::{HistoryEventSubType, HistoryEventType};
use crate::models::errors::DecodeError;
use crate::utils::amounts::{asset_normalized_value, format_amount};
use crate::utils::bytes::{data_to_u256, log_topic, topic_to_address};

pub const VOTIUM_CLAIM: B256 =
    b256!("4766921f5c59646d22d7d266a29164c8e9623684d8dfdbd931731dfdca025238");
pub const VOTIUM_CONTRACT: Address = address!("378Ba9B73309bE80BF4C2c027aAD799766a7ED5A");

pub const CPT_VOTIUM: &str = "votium";

const CLAIMED_AMOUNT_RANGE: (usize, usize) = (32, 64);

pub struct VotiumDecoder;

impl VotiumDecoder {
    fn decode_claim(ctx: &mut DecoderContext<'_>) -> Result<DecodeOutput, DecodeError> {
        let tx_log = ctx.tx_log;
        if tx_log.topics.first() != Some(&VOTIUM_CLAIM) {
            return Ok(DecodeOutput::none());
        }

        let claimed_token_address = topic_to_address(log_topic(tx_log, 1)?);
        let Some(claimed_token) = ctx.assets.resolve_evm_token(&claimed_token_address) else {
            debug!(
                "Votium claim of unknown token {} in {}",
                claimed_token_address, ctx.transaction.tx_hash
            );
            return Ok(DecodeOutput::none());
        };

        let receiver = topic_to_address(log_topic(tx_log, 2)?);
        let (start, end) = CLAIMED_AMOUNT_RANGE;
        let claimed_amount_raw = data_to_u256(&tx_log.data, start, end)?;
        let amount = match asset_normalized_value(claimed_amount_raw, &claimed_token) {
            Ok(amount) => amount,
            Err(e) => {
                warn!("Skipping Votium claim in {}: {}", ctx.transaction.tx_hash, e);
                return Ok(DecodeOutput::none());
            }
        };

        // The first matching receive is the claim transfer. Any further
        // identical receives in the same transaction stay untouched.
        let matched = ctx.decoded_events.iter().position(|event| {
            event.event_type == HistoryEventType::Receive
                && event.location_label == Some(receiver)
                && event.amount == amount
                && event.asset == claimed_token.identifier
        });

        if let Some(idx) = matched {
            let event = &mut ctx.decoded_events[idx];
            event.event_subtype = HistoryEventSubType::Reward;
            event.counterparty = Some(CPT_VOTIUM.to_string());
            event.notes = Some(format!(
                "Receive {} {} from votium bribe",
                format_amount(&event.amount),
                claimed_token.symbol
            ));
            debug!(
                "Annotated event {} of {} as votium bribe",
                event.sequence_index, ctx.transaction.tx_hash
            );
        }

        Ok(DecodeOutput::none())
    }
}

impl DecoderInterface for VotiumDecoder {
    fn name(&self) -> &'static str {
        "votium"
    }

    fn addresses_to_decoders(&self) -> HashMap<Address, Vec<DecodeFn>> {
        HashMap::from([(VOTIUM_CONTRACT, vec![Self::decode_claim as DecodeFn])])
    }

    fn counterparties(&self) -> Vec<&'static str> {
        vec![CPT_VOTIUM]
    }

    fn event_settings(
        &self,
        _ctx: &AccountingContext,
    ) -> HashMap<EventTypeIdentifier, TxEventSettings> {
        HashMap::from([(
            EventTypeIdentifier::new(
                HistoryEventType::Receive,
                HistoryEventSubType::Reward,
                Some(CPT_VOTIUM),
            ),
            TxEventSettings {
                taxable: true,
                count_entire_amount_spend: false,
                count_cost_basis_pnl: false,
                method: AccountingMethod::Acquisition,
                take: NonZeroU32::MIN,
                multitake_treatment: None,
            },
        )])
    }
}
