use crate::error::{DomainError, DomainResult};
use crate::math::fixed_point::{apply_decimal_shift, ratio_to_decimal, relative_change_percent};
use crate::token::TokenAmount;
use crate::value_objects::PriceImpact;
use primitive_types::{U256, U512};
use rust_decimal::Decimal;

/// Denominator of a constant-product fee expressed per mille.
pub const FEE_DENOMINATOR: u32 = 1_000;

/// Calculates the output amount for a given input amount in a constant product pool (x * y = k).
///
/// formula with the fee taken from the input side:
/// amount_in_with_fee = amount_in * (1000 - fee)
/// amount_out = amount_in_with_fee * reserve_out / (reserve_in * 1000 + amount_in_with_fee)
///
/// An empty reserve on either side yields zero rather than an error.
pub fn calculate_out_amount(
    amount_in: TokenAmount,
    reserve_in: TokenAmount,
    reserve_out: TokenAmount,
    fee_per_mille: u32,
) -> DomainResult<TokenAmount> {
    if fee_per_mille >= FEE_DENOMINATOR {
        return Err(DomainError::InvalidFee(fee_per_mille));
    }

    let amount_in = amount_in.0;
    let reserve_in = reserve_in.0;
    let reserve_out = reserve_out.0;

    if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return Ok(TokenAmount::zero());
    }

    let amount_in_with_fee = amount_in
        .checked_mul(U256::from(FEE_DENOMINATOR - fee_per_mille))
        .ok_or(DomainError::Overflow("amount_in_with_fee"))?;
    let denominator = reserve_in
        .checked_mul(U256::from(FEE_DENOMINATOR))
        .ok_or(DomainError::Overflow("reserve_in"))?
        .checked_add(amount_in_with_fee)
        .ok_or(DomainError::Overflow("denominator"))?;

    let numerator = amount_in_with_fee.full_mul(reserve_out);
    let amount_out = numerator / U512::from(denominator);

    // denominator > amount_in_with_fee, so amount_out < reserve_out
    U256::try_from(amount_out)
        .map(TokenAmount)
        .map_err(|_| DomainError::Overflow("amount_out"))
}

/// Fee charged on the input side, in input token units.
pub fn calculate_fee_amount(amount_in: TokenAmount, fee_per_mille: u32) -> TokenAmount {
    let wide = amount_in.0.full_mul(U256::from(fee_per_mille)) / U512::from(FEE_DENOMINATOR);
    TokenAmount(U256::try_from(wide).unwrap_or(amount_in.0))
}

/// Price impact of a trade relative to the pool's spot price.
///
/// Compares the fee-net execution price `(amount_in * (1000 - fee) / 1000) / amount_out`
/// with the spot price `reserve_in / reserve_out`. Token decimals cancel in the
/// ratio. Returns `Unbounded` when the pool is empty or the trade returns nothing.
pub fn calculate_price_impact(
    amount_in: TokenAmount,
    amount_out: TokenAmount,
    reserve_in: TokenAmount,
    reserve_out: TokenAmount,
    fee_per_mille: u32,
) -> DomainResult<PriceImpact> {
    if reserve_in.is_zero() || reserve_out.is_zero() || amount_out.is_zero() {
        return Ok(PriceImpact::Unbounded);
    }
    if fee_per_mille >= FEE_DENOMINATOR {
        return Err(DomainError::InvalidFee(fee_per_mille));
    }

    let amount_in_with_fee = amount_in
        .0
        .checked_mul(U256::from(FEE_DENOMINATOR - fee_per_mille))
        .ok_or(DomainError::Overflow("amount_in_with_fee"))?;
    let scaled_out = amount_out
        .0
        .checked_mul(U256::from(FEE_DENOMINATOR))
        .ok_or(DomainError::Overflow("amount_out"))?;

    // execution / spot = amount_in_with_fee * reserve_out / (amount_out * 1000 * reserve_in)
    let numerator = amount_in_with_fee.full_mul(reserve_out.0);
    let denominator = scaled_out.full_mul(reserve_in.0);

    relative_change_percent(numerator, denominator).map(PriceImpact::percent)
}

/// Spot price of token_in expressed in token_out, decimal-normalized.
/// Price = reserve_out / reserve_in * 10^(decimals_in - decimals_out)
pub fn calculate_spot_price(
    reserve_in: TokenAmount,
    reserve_out: TokenAmount,
    decimals_in: u8,
    decimals_out: u8,
) -> DomainResult<Decimal> {
    if reserve_in.is_zero() {
        return Err(DomainError::DivisionByZero("reserve_in"));
    }
    let shift = i32::from(decimals_in) - i32::from(decimals_out);
    let (numerator, denominator) =
        apply_decimal_shift(U512::from(reserve_out.0), U512::from(reserve_in.0), shift)?;
    ratio_to_decimal(numerator, denominator)
}
