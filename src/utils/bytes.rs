use alloy_primitives::{Address, B256, U256};

use crate::models::datasets::logs::TxReceiptLog;
use crate::models::errors::DecodeError;

const WORD_SIZE: usize = 32;
const ADDRESS_SIZE: usize = 20;

/// Address held in the low-order 20 bytes of a topic. The upper 12 bytes are
/// not validated.
pub fn topic_to_address(topic: &B256) -> Address {
    Address::from_slice(&topic[WORD_SIZE - ADDRESS_SIZE..])
}

/// Big-endian unsigned integer held in a topic.
pub fn topic_to_u256(topic: &B256) -> U256 {
    U256::from_be_bytes(topic.0)
}

pub fn log_topic(log: &TxReceiptLog, index: usize) -> Result<&B256, DecodeError> {
    log.topics.get(index).ok_or(DecodeError::MissingTopic {
        index,
        topics: log.topics.len(),
    })
}

/// Bytes `[start, end)` of a log's data.
pub fn data_range(data: &[u8], start: usize, end: usize) -> Result<&[u8], DecodeError> {
    if start >= end {
        return Err(DecodeError::InvalidRange { start, end });
    }
    if end > data.len() {
        return Err(DecodeError::DataOutOfRange {
            start,
            end,
            len: data.len(),
        });
    }
    Ok(&data[start..end])
}

/// Big-endian unsigned integer held in bytes `[start, end)` of a log's data.
pub fn data_to_u256(data: &[u8], start: usize, end: usize) -> Result<U256, DecodeError> {
    if end.saturating_sub(start) > WORD_SIZE {
        return Err(DecodeError::InvalidRange { start, end });
    }
    let bytes = data_range(data, start, end)?;
    Ok(U256::from_be_slice(bytes))
}

/// Address held in the rightmost 20 bytes of `[start, end)`.
pub fn data_to_address(data: &[u8], start: usize, end: usize) -> Result<Address, DecodeError> {
    let len = end.saturating_sub(start);
    if !(ADDRESS_SIZE..=WORD_SIZE).contains(&len) {
        return Err(DecodeError::InvalidRange { start, end });
    }
    let bytes = data_range(data, start, end)?;
    Ok(Address::from_slice(&bytes[len - ADDRESS_SIZE..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};

    #[test]
    fn test_topic_to_address_ignores_leading_bytes() {
        let expected = address!("378Ba9B73309bE80BF4C2c027aAD799766a7ED5A");
        let clean = b256!("000000000000000000000000378ba9b73309be80bf4c2c027aad799766a7ed5a");
        let dirty = b256!("ffffffffffffffffffffffff378ba9b73309be80bf4c2c027aad799766a7ed5a");

        assert_eq!(topic_to_address(&clean), expected);
        assert_eq!(topic_to_address(&dirty), expected);
    }

    #[test]
    fn test_topic_to_u256() {
        let topic = b256!("0000000000000000000000000000000000000000000000000de0b6b3a7640000");
        assert_eq!(topic_to_u256(&topic), U256::from(1_000_000_000_000_000_000u64));
    }

    #[test]
    fn test_data_to_u256_second_word() {
        let mut data = vec![0u8; 96];
        data[63] = 0x2a;
        data[31] = 0xff; // first word must not leak into the second
        assert_eq!(data_to_u256(&data, 32, 64).unwrap(), U256::from(42u64));
    }

    #[test]
    fn test_data_range_out_of_bounds() {
        let data = vec![0u8; 40];
        assert_eq!(
            data_to_u256(&data, 32, 64),
            Err(DecodeError::DataOutOfRange {
                start: 32,
                end: 64,
                len: 40
            })
        );
        assert!(data_to_u256(&data, 32, 64).unwrap_err().is_malformed());
    }

    #[test]
    fn test_invalid_ranges() {
        let data = vec![0u8; 128];
        assert_eq!(
            data_range(&data, 10, 10),
            Err(DecodeError::InvalidRange { start: 10, end: 10 })
        );
        assert_eq!(
            data_to_u256(&data, 0, 64),
            Err(DecodeError::InvalidRange { start: 0, end: 64 })
        );
        assert_eq!(
            data_to_address(&data, 0, 8),
            Err(DecodeError::InvalidRange { start: 0, end: 8 })
        );
    }

    #[test]
    fn test_data_to_address() {
        let mut data = vec![0u8; 64];
        let crv = address!("D533a949740bb3306d119CC777fa900bA034cd52");
        data[44..64].copy_from_slice(crv.as_slice());
        assert_eq!(
            data_to_address(&data, 32, 64).unwrap(),
            address!("D533a949740bb3306d119CC777fa900bA034cd52")
        );
    }

    #[test]
    fn test_log_topic_missing() {
        let log = TxReceiptLog::new(0, Address::ZERO, vec![B256::ZERO], Default::default());
        assert!(log_topic(&log, 0).is_ok());
        assert_eq!(
            log_topic(&log, 2),
            Err(DecodeError::MissingTopic { index: 2, topics: 1 })
        );
    }
}
