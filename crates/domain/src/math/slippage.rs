use crate::token::TokenAmount;
use crate::value_objects::SlippageTolerance;
use crate::value_objects::slippage::MAX_SLIPPAGE_BPS;
use primitive_types::{U256, U512};

/// Minimum amount a trade may return under the given tolerance.
///
/// minimum_received = output_amount * (10000 - slippage_bps) / 10000, truncating.
pub fn minimum_received(output_amount: TokenAmount, slippage: SlippageTolerance) -> TokenAmount {
    let keep = MAX_SLIPPAGE_BPS - slippage.bps();
    let wide = output_amount.0.full_mul(U256::from(keep)) / U512::from(MAX_SLIPPAGE_BPS);
    // keep <= 10000, so the result never exceeds output_amount
    TokenAmount(U256::try_from(wide).unwrap_or(output_amount.0))
}
