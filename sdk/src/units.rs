//! Conversion between stable-unit decimals and token base units

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Largest scale `rust_decimal` can represent
const MAX_SCALE: u32 = 28;

/// Convert a decimal amount into integer base units for a token with `decimals`.
///
/// Digits beyond the token's precision are truncated toward zero. Returns `None`
/// for negative amounts or when the result does not fit.
pub fn to_base_units(amount: Decimal, decimals: u32) -> Option<u128> {
    if amount.is_sign_negative() || decimals > MAX_SCALE {
        return None;
    }
    let factor = Decimal::from_i128_with_scale(10i128.checked_pow(decimals)?, 0);
    amount.checked_mul(factor)?.trunc().to_u128()
}

/// Convert integer base units back into a decimal amount.
///
/// Returns `None` when the raw value exceeds the range of a decimal.
pub fn from_base_units(raw: u128, decimals: u32) -> Option<Decimal> {
    if decimals > MAX_SCALE {
        return None;
    }
    let raw = i128::try_from(raw).ok()?;
    Decimal::try_from_i128_with_scale(raw, decimals)
        .ok()
        .map(|d| d.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_base_units() {
        assert_eq!(to_base_units(dec!(5000), 6), Some(5_000_000_000));
        assert_eq!(to_base_units(dec!(1.5), 18), Some(1_500_000_000_000_000_000));
        assert_eq!(to_base_units(dec!(0.0000001), 6), Some(0));
        assert_eq!(to_base_units(dec!(-1), 6), None);
    }

    #[test]
    fn test_from_base_units() {
        assert_eq!(from_base_units(5_000_000_000, 6), Some(dec!(5000)));
        assert_eq!(from_base_units(1, 6), Some(dec!(0.000001)));
        assert_eq!(from_base_units(u128::MAX, 6), None);
    }

    proptest! {
        #[test]
        fn test_cents_survive_conversion(cents in 0u64..10_000_000_000u64) {
            let amount = Decimal::new(cents as i64, 2);
            let raw = to_base_units(amount, 6).unwrap();
            prop_assert_eq!(from_base_units(raw, 6).unwrap(), amount.normalize());
        }
    }
}
