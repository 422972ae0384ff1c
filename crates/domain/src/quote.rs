use crate::fees::FeeTier;
use crate::pool::{PoolSnapshot, PoolVersion};
use crate::token::TokenAmount;
use crate::value_objects::{PriceImpact, SlippageTolerance};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of probing one pool for one input amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteCandidate {
    pub amount_out: TokenAmount,
    /// Fee charged, in input token units.
    pub fee_amount: TokenAmount,
    pub price_impact: PriceImpact,
    /// Pre-trade price of token_in in token_out, when it can be represented.
    pub spot_price: Option<Decimal>,
    /// State the quote was computed from.
    pub snapshot: PoolSnapshot,
}

impl QuoteCandidate {
    pub fn version(&self) -> PoolVersion {
        self.snapshot.version()
    }

    pub fn fee_tier(&self) -> Option<FeeTier> {
        self.snapshot.fee_tier()
    }

    pub fn fee_pips(&self) -> u32 {
        self.snapshot.fee_pips()
    }

    pub fn pool_address(&self) -> &str {
        self.snapshot.address()
    }

    /// A candidate that returns something at a finite price impact.
    pub fn is_viable(&self) -> bool {
        !self.amount_out.is_zero() && self.price_impact.is_bounded()
    }

    pub fn route(&self) -> Route {
        Route {
            version: self.version(),
            fee_tier: self.fee_tier(),
            pool_address: self.pool_address().to_string(),
        }
    }
}

/// The pool chosen to execute a trade.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    pub version: PoolVersion,
    /// Tier of a concentrated-liquidity pool; `None` for constant-product.
    pub fee_tier: Option<FeeTier>,
    pub pool_address: String,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fee_tier {
            Some(tier) => write!(f, "{} {} @ {}", self.version, tier, self.pool_address),
            None => write!(f, "{} @ {}", self.version, self.pool_address),
        }
    }
}

/// Final answer to a quote request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub amount_in: TokenAmount,
    pub output_amount: TokenAmount,
    /// Output after applying the slippage tolerance.
    pub minimum_received: TokenAmount,
    pub price_impact: PriceImpact,
    pub fee_amount: TokenAmount,
    pub route: Route,
    pub spot_price: Option<Decimal>,
    pub slippage: SlippageTolerance,
    /// Set when the tolerance is at or above the advisory threshold.
    pub high_slippage_warning: bool,
    /// Whether the route came from the route cache instead of a full fan-out.
    pub cached_route: bool,
}

impl Quote {
    pub fn chosen_fee_tier(&self) -> Option<FeeTier> {
        self.route.fee_tier
    }

    pub fn chosen_pool_version(&self) -> PoolVersion {
        self.route.version
    }

    /// Price impact for display.
    pub fn price_impact_percent(&self) -> f64 {
        self.price_impact.to_f64()
    }
}
