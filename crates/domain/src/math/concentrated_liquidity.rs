use crate::error::{DomainError, DomainResult};
use crate::math::fixed_point::{
    Q96_RESOLUTION, apply_decimal_shift, ratio_to_decimal, relative_change_percent,
};
use crate::value_objects::PriceImpact;
use primitive_types::{U256, U512};
use rust_decimal::Decimal;

/// Converts a Q64.96 square-root price into the decimal-normalized price of
/// token_in expressed in token_out.
///
/// raw = (sqrt_price / 2^96)^2 is token1 per token0. Selling token0 uses raw,
/// selling token1 uses 1 / raw; both are then scaled by 10^(decimals_in - decimals_out).
pub fn sqrt_price_to_price(
    sqrt_price_x96: U256,
    decimals_in: u8,
    decimals_out: u8,
    zero_for_one: bool,
) -> DomainResult<Decimal> {
    if sqrt_price_x96.is_zero() {
        return Err(DomainError::DivisionByZero("sqrt_price_x96"));
    }

    let squared = sqrt_price_x96.full_mul(sqrt_price_x96);
    let q192 = U512::one() << (2 * Q96_RESOLUTION);
    let (numerator, denominator) = if zero_for_one {
        (squared, q192)
    } else {
        (q192, squared)
    };

    let shift = i32::from(decimals_in) - i32::from(decimals_out);
    let (numerator, denominator) = apply_decimal_shift(numerator, denominator, shift)?;
    ratio_to_decimal(numerator, denominator)
}

/// Price impact from the pool's square-root price before and after a swap.
///
/// The direction-normalized price moves by (after / before)^2 when selling
/// token0 and by (before / after)^2 when selling token1; decimal scaling cancels.
/// A pool with no active liquidity has an unbounded impact.
pub fn calculate_price_impact(
    sqrt_price_before_x96: U256,
    sqrt_price_after_x96: U256,
    liquidity: u128,
    zero_for_one: bool,
) -> DomainResult<PriceImpact> {
    if liquidity == 0 {
        return Ok(PriceImpact::Unbounded);
    }
    if sqrt_price_before_x96.is_zero() || sqrt_price_after_x96.is_zero() {
        return Err(DomainError::DivisionByZero("sqrt_price_x96"));
    }

    let before = sqrt_price_before_x96.full_mul(sqrt_price_before_x96);
    let after = sqrt_price_after_x96.full_mul(sqrt_price_after_x96);
    let (numerator, denominator) = if zero_for_one {
        (after, before)
    } else {
        (before, after)
    };

    relative_change_percent(numerator, denominator).map(PriceImpact::percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::fixed_point::q96;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_at_unit_sqrt_price() {
        let p = sqrt_price_to_price(q96(), 18, 18, true).unwrap();
        assert_eq!(p, dec!(1));
    }

    #[test]
    fn test_price_follows_direction() {
        // sqrt price 2 -> raw price 4 token1 per token0
        let sqrt = q96() * U256::from(2u8);
        assert_eq!(sqrt_price_to_price(sqrt, 18, 18, true).unwrap(), dec!(4));
        assert_eq!(sqrt_price_to_price(sqrt, 18, 18, false).unwrap(), dec!(0.25));
    }

    #[test]
    fn test_price_is_decimal_adjusted() {
        // raw 1:1 between an 18-decimal token0 and a 6-decimal token1
        let p = sqrt_price_to_price(q96(), 18, 6, true).unwrap();
        assert_eq!(p, dec!(1000000000000));
        let inverse = sqrt_price_to_price(q96(), 6, 18, false).unwrap();
        assert_eq!(inverse, dec!(0.000000000001));
    }

    #[test]
    fn test_impact_from_sqrt_prices() {
        // sqrt price moves 10 -> 9.95 (0.5%); price moves by 0.995^2 = 0.990025
        let before = q96() * U256::from(1_000u64);
        let after = q96() * U256::from(995u64);
        let impact = calculate_price_impact(before, after, 1_000_000, true).unwrap();
        assert_eq!(impact, PriceImpact::Bounded(dec!(0.9975)));

        // Selling token1 pushes the sqrt price up; same magnitude reading from the other side
        let impact = calculate_price_impact(after, before, 1_000_000, false).unwrap();
        assert_eq!(impact, PriceImpact::Bounded(dec!(0.9975)));
    }

    #[test]
    fn test_zero_liquidity_is_unbounded() {
        let impact = calculate_price_impact(q96(), q96(), 0, true).unwrap();
        assert_eq!(impact, PriceImpact::Unbounded);
    }

    #[test]
    fn test_zero_sqrt_price_rejected() {
        assert!(sqrt_price_to_price(U256::zero(), 18, 18, true).is_err());
        assert!(calculate_price_impact(U256::zero(), q96(), 1, true).is_err());
    }
}
