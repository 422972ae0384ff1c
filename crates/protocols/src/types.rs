//! Strongly-typed answers of the external pool capabilities.
//!
//! Each answer is validated by the caller before it reaches the quote math;
//! a failed check becomes [`ProviderError::Malformed`].

use crate::error::{Capability, ProviderError};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use swap_router_domain::math::price_tick::{MAX_TICK, MIN_TICK};
use swap_router_domain::{
    ConcentratedPool, ConstantProductPool, FeeTier, Token, TokenAmount, TokenPair,
};

/// Sentinel returned by factories for a pool that was never deployed.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Whether an address is empty or all zeros.
pub fn is_zero_address(address: &str) -> bool {
    let digits = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);
    digits.chars().all(|c| c == '0')
}

/// Maps a resolver answer to `None` when it is absent or the zero sentinel.
pub fn existing_pool(resolved: Option<String>) -> Option<String> {
    resolved.filter(|address| !is_zero_address(address))
}

/// Live reserves of a constant-product pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantProductState {
    pub reserve0: TokenAmount,
    pub reserve1: TokenAmount,
    /// Address of the token held in `reserve0`.
    pub token0: String,
}

impl ConstantProductState {
    /// Rejects an answer whose `token0` is not part of the pair being quoted.
    pub fn validate(&self, pair: &TokenPair) -> Result<(), ProviderError> {
        if !pair.contains(&self.token0) {
            return Err(ProviderError::malformed(
                Capability::ReadConstantProduct,
                format!("token0 {} is not part of {}", self.token0, pair),
            ));
        }
        Ok(())
    }

    pub fn into_pool(self, address: impl Into<String>, fee_per_mille: u32) -> ConstantProductPool {
        ConstantProductPool {
            address: address.into(),
            token0: self.token0,
            reserve0: self.reserve0,
            reserve1: self.reserve1,
            fee_per_mille,
        }
    }
}

/// Live price and liquidity of a concentrated-liquidity pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcentratedState {
    pub sqrt_price_x96: U256,
    pub tick: i32,
    pub liquidity: u128,
}

impl ConcentratedState {
    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.sqrt_price_x96.is_zero() {
            return Err(ProviderError::malformed(
                Capability::ReadConcentrated,
                "sqrt price is zero",
            ));
        }
        if !(MIN_TICK..=MAX_TICK).contains(&self.tick) {
            return Err(ProviderError::malformed(
                Capability::ReadConcentrated,
                format!("tick {} outside [{MIN_TICK}, {MAX_TICK}]", self.tick),
            ));
        }
        Ok(())
    }

    pub fn into_pool(self, address: impl Into<String>, fee_tier: FeeTier) -> ConcentratedPool {
        ConcentratedPool {
            address: address.into(),
            fee_tier,
            sqrt_price_x96: self.sqrt_price_x96,
            tick: self.tick,
            liquidity: self.liquidity,
        }
    }
}

/// Request for a single-pool exact-input swap simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactInputSingle {
    pub token_in: Token,
    pub token_out: Token,
    pub amount_in: TokenAmount,
    pub fee: FeeTier,
}

impl ExactInputSingle {
    /// Selling token0 for token1.
    pub fn zero_for_one(&self) -> bool {
        self.token_in.sorts_before(&self.token_out)
    }

    pub fn pair(&self) -> TokenPair {
        TokenPair::new(&self.token_in, &self.token_out)
    }
}

/// Outcome of a simulated swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatedSwap {
    pub amount_out: TokenAmount,
    pub sqrt_price_after_x96: U256,
}

impl SimulatedSwap {
    /// Rejects a zero post-trade price or one that moved against the trade direction.
    pub fn validate(
        &self,
        sqrt_price_before_x96: U256,
        zero_for_one: bool,
    ) -> Result<(), ProviderError> {
        if self.sqrt_price_after_x96.is_zero() {
            return Err(ProviderError::malformed(
                Capability::SimulateExactInput,
                "post-trade sqrt price is zero",
            ));
        }
        let moved_backwards = if zero_for_one {
            self.sqrt_price_after_x96 > sqrt_price_before_x96
        } else {
            self.sqrt_price_after_x96 < sqrt_price_before_x96
        };
        if moved_backwards {
            return Err(ProviderError::malformed(
                Capability::SimulateExactInput,
                format!(
                    "sqrt price moved from {} to {} against the trade direction",
                    sqrt_price_before_x96, self.sqrt_price_after_x96
                ),
            ));
        }
        Ok(())
    }
}
