use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use bigdecimal::num_bigint::{BigInt, Sign};

use crate::models::datasets::assets::Asset;
use crate::models::errors::DecodeError;

/// Converts a raw on-chain amount of `asset` into a decimal quantity.
pub fn asset_normalized_value(amount: U256, asset: &Asset) -> Result<BigDecimal, DecodeError> {
    let decimals = asset.decimals.ok_or_else(|| DecodeError::UnknownPrecision {
        asset: asset.identifier.clone(),
    })?;
    Ok(token_normalized_value(amount, decimals))
}

/// `amount / 10^decimals`, exact.
pub fn token_normalized_value(amount: U256, decimals: u8) -> BigDecimal {
    let digits = BigInt::from_bytes_be(Sign::Plus, &amount.to_be_bytes::<32>());
    BigDecimal::new(digits, i64::from(decimals))
}

/// Renders a quantity for human readable notes in plain notation: trailing
/// zeros trimmed, but always with at least one fractional digit (`500.0`,
/// `0.25`, `0.000000000000000001`).
pub fn format_amount(amount: &BigDecimal) -> String {
    let normalized = amount.normalized();
    let (_, scale) = normalized.as_bigint_and_exponent();
    if scale < 1 {
        normalized.with_scale(1).to_plain_string()
    } else {
        normalized.to_plain_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use std::str::FromStr;

    #[test]
    fn test_one_token_with_18_decimals() {
        let value = token_normalized_value(U256::from(1_000_000_000_000_000_000u64), 18);
        assert_eq!(value, BigDecimal::from(1));
        assert_eq!(value, BigDecimal::from_str("1.0").unwrap());
    }

    #[test]
    fn test_fractional_and_zero_decimals() {
        assert_eq!(
            token_normalized_value(U256::from(1_500_000u64), 6),
            BigDecimal::from_str("1.5").unwrap()
        );
        assert_eq!(token_normalized_value(U256::from(42u64), 0), BigDecimal::from(42));
        assert_eq!(token_normalized_value(U256::ZERO, 18), BigDecimal::from(0));
    }

    #[test]
    fn test_max_u256_is_exact() {
        let value = token_normalized_value(U256::MAX, 18);
        let expected = BigDecimal::from_str(
            "115792089237316195423570985008687907853269984665640564039457.584007913129639935",
        )
        .unwrap();
        assert_eq!(value, expected);
    }

    #[test]
    fn test_unknown_precision() {
        let crv = address!("D533a949740bb3306d119CC777fa900bA034cd52");
        let asset = Asset::evm_token(crv, "CRV", None);
        let err = asset_normalized_value(U256::from(1u64), &asset).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnknownPrecision {
                asset: "eip155:1/erc20:0xD533a949740bb3306d119CC777fa900bA034cd52".to_string()
            }
        );
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(&BigDecimal::from(500)), "500.0");
        assert_eq!(
            format_amount(&token_normalized_value(U256::from(500_000_000u64), 6)),
            "500.0"
        );
        assert_eq!(format_amount(&BigDecimal::from_str("0.250").unwrap()), "0.25");
    }

    #[test]
    fn test_format_amount_small_values_stay_plain() {
        assert_eq!(
            format_amount(&token_normalized_value(U256::from(1u64), 18)),
            "0.000000000000000001"
        );
        assert_eq!(
            format_amount(&token_normalized_value(U256::from(100_000_000_000u64), 18)),
            "0.0000001"
        );
        assert_eq!(
            format_amount(&BigDecimal::from(10u64.pow(12))),
            "1000000000000.0"
        );
    }
}
