/// Concentrated-liquidity price conversion and price impact.
pub mod concentrated_liquidity;
/// Constant-product output, fee and price impact.
pub mod constant_product;
/// Wide integer helpers and ratio rendering.
pub mod fixed_point;
/// Tick and price conversions.
pub mod price_tick;
/// Minimum-received under a slippage tolerance.
pub mod slippage;
