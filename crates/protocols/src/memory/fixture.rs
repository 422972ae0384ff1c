//! JSON pool fixtures for the in-memory provider.
//!
//! ```json
//! {
//!   "tokens": [{ "address": "0xa0b8...", "symbol": "USDC", "decimals": 6 }],
//!   "pools": [
//!     { "kind": "constant_product", "address": "0x01", "token_a": "0xa0b8...",
//!       "token_b": "0xc02a...", "reserve_a": "1000000", "reserve_b": "20000000" },
//!     { "kind": "concentrated", "address": "0x02", "token_a": "0xa0b8...",
//!       "token_b": "0xc02a...", "fee": 500,
//!       "sqrt_price_x96": "79228162514264337593543950336", "liquidity": "1000000000" }
//!   ]
//! }
//! ```
//!
//! `sqrt_price_x96` is always token1 per token0, token0 being the smaller address.

use crate::error::FixtureError;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::path::Path;
use swap_router_domain::math::price_tick::sqrt_price_x96_to_tick;
use swap_router_domain::{FeeTier, Token, TokenAmount};

fn default_fee_per_mille() -> u32 {
    3
}

/// One pool entry of a fixture file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PoolEntry {
    ConstantProduct {
        address: String,
        token_a: String,
        token_b: String,
        reserve_a: TokenAmount,
        reserve_b: TokenAmount,
        #[serde(default = "default_fee_per_mille")]
        fee_per_mille: u32,
    },
    Concentrated {
        address: String,
        token_a: String,
        token_b: String,
        fee: FeeTier,
        sqrt_price_x96: String,
        liquidity: String,
        #[serde(default)]
        tick: Option<i32>,
    },
}

impl PoolEntry {
    pub fn address(&self) -> &str {
        match self {
            PoolEntry::ConstantProduct { address, .. }
            | PoolEntry::Concentrated { address, .. } => address,
        }
    }

    pub fn tokens(&self) -> (&str, &str) {
        match self {
            PoolEntry::ConstantProduct {
                token_a, token_b, ..
            }
            | PoolEntry::Concentrated {
                token_a, token_b, ..
            } => (token_a, token_b),
        }
    }
}

/// Parsed concentrated-liquidity numbers of a [`PoolEntry::Concentrated`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcentratedNumbers {
    pub sqrt_price_x96: U256,
    pub liquidity: u128,
    pub tick: i32,
}

/// A set of tokens and pools loaded from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolFixture {
    #[serde(default)]
    pub tokens: Vec<Token>,
    pub pools: Vec<PoolEntry>,
}

impl PoolFixture {
    pub fn from_json_str(json: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Finds a token by symbol (case-sensitive) or address (case-insensitive).
    pub fn find_token(&self, needle: &str) -> Option<&Token> {
        self.tokens
            .iter()
            .find(|t| t.symbol == needle)
            .or_else(|| self.tokens.iter().find(|t| t.same_address(needle)))
    }
}

/// Parses and checks the numeric fields of a concentrated pool entry.
pub(crate) fn parse_concentrated(
    address: &str,
    sqrt_price_x96: &str,
    liquidity: &str,
    tick: Option<i32>,
) -> Result<ConcentratedNumbers, FixtureError> {
    let invalid = |reason: String| FixtureError::InvalidPool {
        address: address.to_string(),
        reason,
    };

    let sqrt_price_x96 = U256::from_dec_str(sqrt_price_x96.trim())
        .map_err(|_| invalid(format!("sqrt_price_x96 {sqrt_price_x96:?} is not an integer")))?;
    if sqrt_price_x96.is_zero() {
        return Err(invalid("sqrt_price_x96 is zero".to_string()));
    }
    let liquidity = liquidity
        .trim()
        .replace('_', "")
        .parse::<u128>()
        .map_err(|_| invalid(format!("liquidity {liquidity:?} is not a u128")))?;
    let tick = match tick {
        Some(tick) => tick,
        None => sqrt_price_x96_to_tick(sqrt_price_x96).map_err(|e| invalid(e.to_string()))?,
    };

    Ok(ConcentratedNumbers {
        sqrt_price_x96,
        liquidity,
        tick,
    })
}
