//! Integer and fixed-point helpers shared by the quote calculators.
//!
//! Amount arithmetic stays in `U256`, widening to `U512` for products.
//! Ratios are only turned into `Decimal` at the very end, for percentages
//! and human-facing prices.

use crate::error::{DomainError, DomainResult};
use primitive_types::{U256, U512};
use rust_decimal::Decimal;

/// Binary scale of a Q64.96 square-root price.
pub const Q96_RESOLUTION: usize = 96;

/// Largest mantissa a `Decimal` can hold (2^96 - 1).
const DECIMAL_MAX_MANTISSA: u128 = (1u128 << 96) - 1;

/// Largest scale a `Decimal` can hold.
const DECIMAL_MAX_SCALE: u32 = 28;

/// `2^96` as a `U256`.
pub fn q96() -> U256 {
    U256::one() << Q96_RESOLUTION
}

/// `10^exp` at 512-bit width.
pub fn pow10(exp: u32) -> U512 {
    U512::from(10u8).pow(U512::from(exp))
}

/// `a * b / denominator`, truncating, with a 512-bit intermediate.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> DomainResult<U256> {
    if denominator.is_zero() {
        return Err(DomainError::DivisionByZero("mul_div"));
    }
    let wide = a.full_mul(b) / U512::from(denominator);
    U256::try_from(wide).map_err(|_| DomainError::Overflow("mul_div"))
}

/// Renders `numerator / denominator` as a `Decimal`, truncating toward zero.
///
/// Keeps as many fractional digits as the `Decimal` mantissa allows.
pub fn ratio_to_decimal(numerator: U512, denominator: U512) -> DomainResult<Decimal> {
    if denominator.is_zero() {
        return Err(DomainError::DivisionByZero("ratio_to_decimal"));
    }

    let max = U512::from(DECIMAL_MAX_MANTISSA);
    let integral = numerator / denominator;
    if integral > max {
        return Err(DomainError::Overflow("ratio_to_decimal"));
    }

    // Widest scale whose scaled quotient still fits the mantissa.
    for scale in (0..=DECIMAL_MAX_SCALE).rev() {
        let Some(scaled) = scaled_quotient(numerator, denominator, scale) else {
            continue;
        };
        if scaled > max {
            continue;
        }
        let mantissa = i128::try_from(scaled.low_u128())
            .map_err(|_| DomainError::Overflow("ratio_to_decimal"))?;
        return Decimal::try_from_i128_with_scale(mantissa, scale)
            .map(|d| d.normalize())
            .map_err(|_| DomainError::Overflow("ratio_to_decimal"));
    }
    Err(DomainError::Overflow("ratio_to_decimal"))
}

fn scaled_quotient(numerator: U512, denominator: U512, scale: u32) -> Option<U512> {
    let (scaled, overflow) = numerator.overflowing_mul(pow10(scale));
    (!overflow).then(|| scaled / denominator)
}

/// Absolute relative change `|numerator / denominator - 1|` in percent.
///
/// Saturates at `Decimal::MAX` when the percentage does not fit a `Decimal`.
pub fn relative_change_percent(numerator: U512, denominator: U512) -> DomainResult<Decimal> {
    if denominator.is_zero() {
        return Err(DomainError::DivisionByZero("relative_change_percent"));
    }
    let diff = if numerator >= denominator {
        numerator - denominator
    } else {
        denominator - numerator
    };
    let (scaled, overflow) = diff.overflowing_mul(U512::from(100u8));
    if overflow || scaled / denominator > U512::from(DECIMAL_MAX_MANTISSA) {
        return Ok(Decimal::MAX);
    }
    ratio_to_decimal(scaled, denominator)
}

/// Scales a ratio by `10^exp10`, moving the factor to the denominator when
/// the exponent is negative.
pub fn apply_decimal_shift(
    numerator: U512,
    denominator: U512,
    exp10: i32,
) -> DomainResult<(U512, U512)> {
    let factor = pow10(exp10.unsigned_abs());
    let overflow = DomainError::Overflow("apply_decimal_shift");
    if exp10 >= 0 {
        let (n, o) = numerator.overflowing_mul(factor);
        if o {
            return Err(overflow);
        }
        Ok((n, denominator))
    } else {
        let (d, o) = denominator.overflowing_mul(factor);
        if o {
            return Err(overflow);
        }
        Ok((numerator, d))
    }
}
