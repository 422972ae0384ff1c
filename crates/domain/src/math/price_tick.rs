use crate::error::{DomainError, DomainResult};
use crate::math::concentrated_liquidity::sqrt_price_to_price;
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Lowest tick a concentrated-liquidity pool can reach.
pub const MIN_TICK: i32 = -887_272;
/// Highest tick a concentrated-liquidity pool can reach.
pub const MAX_TICK: i32 = 887_272;

/// Returns the tick corresponding to a given price.
/// tick = log_1.0001(P)
pub fn price_to_tick(price: Decimal) -> DomainResult<i32> {
    if price <= Decimal::ZERO {
        return Err(DomainError::DivisionByZero("price_to_tick"));
    }
    let price_f64 = price.to_f64().ok_or(DomainError::Overflow("price_to_tick"))?;
    let base = 1.0001f64;
    let tick = price_f64.log(base).round() as i32;
    Ok(tick.clamp(MIN_TICK, MAX_TICK))
}

/// Tick of a raw Q64.96 square-root price (token1 per token0, no decimal adjustment).
///
/// Informational only; amounts never depend on it.
pub fn sqrt_price_x96_to_tick(sqrt_price_x96: U256) -> DomainResult<i32> {
    let price = sqrt_price_to_price(sqrt_price_x96, 0, 0, true)?;
    price_to_tick(price)
}
