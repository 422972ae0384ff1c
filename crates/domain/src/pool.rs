use crate::error::DomainError;
use crate::fees::FeeTier;
use crate::token::{Token, TokenAmount};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// AMM family a pool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolVersion {
    /// Paired reserves, `x * y = k`.
    ConstantProduct,
    /// Square-root price, tick and active liquidity.
    ConcentratedLiquidity,
}

impl fmt::Display for PoolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolVersion::ConstantProduct => write!(f, "v2"),
            PoolVersion::ConcentratedLiquidity => write!(f, "v3"),
        }
    }
}

impl FromStr for PoolVersion {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v2" | "constant_product" | "cp" => Ok(PoolVersion::ConstantProduct),
            "v3" | "concentrated_liquidity" | "cl" => Ok(PoolVersion::ConcentratedLiquidity),
            _ => Err(DomainError::UnknownPoolVersion(s.to_string())),
        }
    }
}

/// Reserve snapshot of a constant-product pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantProductPool {
    pub address: String,
    /// Address of the token whose reserve is `reserve0`.
    pub token0: String,
    pub reserve0: TokenAmount,
    pub reserve1: TokenAmount,
    /// Fee in parts per thousand, 3 for 0.3%.
    pub fee_per_mille: u32,
}

impl ConstantProductPool {
    /// Returns `(reserve_in, reserve_out)` for a trade selling `token_in`.
    pub fn reserves_for(&self, token_in: &Token) -> (TokenAmount, TokenAmount) {
        if token_in.same_address(&self.token0) {
            (self.reserve0, self.reserve1)
        } else {
            (self.reserve1, self.reserve0)
        }
    }

    pub fn has_liquidity(&self) -> bool {
        !self.reserve0.is_zero() && !self.reserve1.is_zero()
    }
}

/// Point-in-time state of a concentrated-liquidity pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcentratedPool {
    pub address: String,
    pub fee_tier: FeeTier,
    /// Square-root price as a Q64.96 fixed-point number.
    pub sqrt_price_x96: U256,
    pub tick: i32,
    /// Active liquidity at the current tick.
    pub liquidity: u128,
}

impl ConcentratedPool {
    pub fn has_liquidity(&self) -> bool {
        self.liquidity > 0
    }
}

/// Snapshot of either pool family, as read for one quote computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolSnapshot {
    ConstantProduct(ConstantProductPool),
    Concentrated(ConcentratedPool),
}

impl PoolSnapshot {
    pub fn version(&self) -> PoolVersion {
        match self {
            PoolSnapshot::ConstantProduct(_) => PoolVersion::ConstantProduct,
            PoolSnapshot::Concentrated(_) => PoolVersion::ConcentratedLiquidity,
        }
    }

    pub fn address(&self) -> &str {
        match self {
            PoolSnapshot::ConstantProduct(pool) => &pool.address,
            PoolSnapshot::Concentrated(pool) => &pool.address,
        }
    }

    pub fn fee_tier(&self) -> Option<FeeTier> {
        match self {
            PoolSnapshot::ConstantProduct(_) => None,
            PoolSnapshot::Concentrated(pool) => Some(pool.fee_tier),
        }
    }

    /// Fee of the pool in pips.
    pub fn fee_pips(&self) -> u32 {
        match self {
            PoolSnapshot::ConstantProduct(pool) => pool.fee_per_mille * 1_000,
            PoolSnapshot::Concentrated(pool) => pool.fee_tier.pips(),
        }
    }

    pub fn has_liquidity(&self) -> bool {
        match self {
            PoolSnapshot::ConstantProduct(pool) => pool.has_liquidity(),
            PoolSnapshot::Concentrated(pool) => pool.has_liquidity(),
        }
    }
}
