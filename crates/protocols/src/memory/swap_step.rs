//! Exact-input swap inside the current tick.
//!
//! Liquidity is treated as constant over the whole move, so large trades are
//! quoted as if the active range extended indefinitely. Good enough for an
//! offline provider; a chain-backed provider asks the quoter contract instead.

use primitive_types::{U256, U512};
use swap_router_domain::fees::{PIPS_DENOMINATOR, fee_amount_pips};
use swap_router_domain::math::fixed_point::{Q96_RESOLUTION, mul_div, q96};
use swap_router_domain::{DomainError, DomainResult, TokenAmount};

/// Lowest representable sqrt price (at `MIN_TICK`).
pub const MIN_SQRT_RATIO: u128 = 4_295_128_739;

/// Highest representable sqrt price (at `MAX_TICK`).
pub fn max_sqrt_ratio() -> U256 {
    U256::from_dec_str("1461446703485210103287273052203988822378723970342").unwrap_or(U256::MAX)
}

/// Returns `(amount_out, sqrt_price_after_x96)` for selling `amount_in`.
pub fn exact_input_within_tick(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount_in: TokenAmount,
    fee_pips: u32,
    zero_for_one: bool,
) -> DomainResult<(TokenAmount, U256)> {
    if liquidity == 0 {
        return Err(DomainError::DivisionByZero("liquidity"));
    }
    if fee_pips >= PIPS_DENOMINATOR {
        return Err(DomainError::InvalidFee(fee_pips));
    }
    if sqrt_price_x96.is_zero() {
        return Err(DomainError::DivisionByZero("sqrt_price_x96"));
    }

    let fee = fee_amount_pips(amount_in, fee_pips);
    let amount = amount_in.0 - fee.0;
    let liquidity = U256::from(liquidity);
    let liquidity_x96 = liquidity << Q96_RESOLUTION;

    if zero_for_one {
        // sqrt_next = L * Q96 * sqrtP / (L * Q96 + amount * sqrtP), rounded up
        let denominator = U512::from(liquidity_x96) + amount.full_mul(sqrt_price_x96);
        let numerator = liquidity_x96.full_mul(sqrt_price_x96);
        let (quotient, remainder) = numerator.div_mod(denominator);
        let quotient = if remainder.is_zero() {
            quotient
        } else {
            quotient + U512::one()
        };
        let sqrt_next =
            U256::try_from(quotient).map_err(|_| DomainError::Overflow("sqrt_next"))?;
        if sqrt_next < U256::from(MIN_SQRT_RATIO) {
            return Err(DomainError::Overflow("sqrt price below minimum"));
        }

        // token1 out = L * (sqrtP - sqrt_next) / Q96
        let amount_out = mul_div(liquidity, sqrt_price_x96 - sqrt_next, q96())?;
        Ok((TokenAmount(amount_out), sqrt_next))
    } else {
        // sqrt_next = sqrtP + amount * Q96 / L, rounded down
        let delta = mul_div(amount, q96(), liquidity)?;
        let sqrt_next = sqrt_price_x96
            .checked_add(delta)
            .ok_or(DomainError::Overflow("sqrt_next"))?;
        if sqrt_next > max_sqrt_ratio() {
            return Err(DomainError::Overflow("sqrt price above maximum"));
        }

        // token0 out = L * Q96 * (sqrt_next - sqrtP) / sqrt_next / sqrtP
        let scaled = mul_div(liquidity_x96, sqrt_next - sqrt_price_x96, sqrt_next)?;
        let amount_out = scaled / sqrt_price_x96;
        Ok((TokenAmount(amount_out), sqrt_next))
    }
}
