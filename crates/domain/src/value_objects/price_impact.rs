use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deviation between execution price and pre-trade spot price, in percent.
///
/// `Unbounded` sorts above every bounded value and marks a pool without
/// usable liquidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceImpact {
    Bounded(Decimal),
    Unbounded,
}

impl PriceImpact {
    /// Builds a bounded impact from a signed percentage.
    pub fn percent(value: Decimal) -> Self {
        PriceImpact::Bounded(value.abs())
    }

    pub fn is_bounded(&self) -> bool {
        matches!(self, PriceImpact::Bounded(_))
    }

    pub fn as_percent(&self) -> Option<Decimal> {
        match self {
            PriceImpact::Bounded(value) => Some(*value),
            PriceImpact::Unbounded => None,
        }
    }

    /// Strictly below `bps` basis points (100 bps = 1%).
    pub fn is_below_bps(&self, bps: u32) -> bool {
        match self {
            PriceImpact::Bounded(value) => *value < Decimal::new(i64::from(bps), 2),
            PriceImpact::Unbounded => false,
        }
    }

    /// Float rendering for display only.
    pub fn to_f64(&self) -> f64 {
        match self {
            PriceImpact::Bounded(value) => value.to_f64().unwrap_or(f64::INFINITY),
            PriceImpact::Unbounded => f64::INFINITY,
        }
    }
}

impl fmt::Display for PriceImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceImpact::Bounded(value) => write!(f, "{}%", value.round_dp(4)),
            PriceImpact::Unbounded => write!(f, "inf"),
        }
    }
}
