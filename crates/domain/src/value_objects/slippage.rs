use crate::error::{DomainError, DomainResult};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Exclusive upper bound on slippage, 100% in basis points.
pub const MAX_SLIPPAGE_BPS: u32 = 10_000;

/// Tolerance applied when deriving the minimum amount a trade must return.
///
/// Stored in basis points, which keeps two decimal places of a percentage
/// (0.50% is 50 bps) without floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SlippageTolerance {
    bps: u32,
}

impl SlippageTolerance {
    pub const ZERO: SlippageTolerance = SlippageTolerance { bps: 0 };

    pub fn from_bps(bps: u32) -> DomainResult<Self> {
        if bps >= MAX_SLIPPAGE_BPS {
            return Err(DomainError::InvalidSlippage(format!(
                "{bps} bps is not below 100%"
            )));
        }
        Ok(Self { bps })
    }

    /// Builds a tolerance from a percentage, flooring to two decimal places.
    pub fn from_percent(percent: Decimal) -> DomainResult<Self> {
        if percent.is_sign_negative() && !percent.is_zero() {
            return Err(DomainError::InvalidSlippage(format!(
                "{percent}% is negative"
            )));
        }
        let bps = (percent * Decimal::ONE_HUNDRED)
            .floor()
            .to_u32()
            .ok_or_else(|| DomainError::InvalidSlippage(format!("{percent}% is out of range")))?;
        Self::from_bps(bps)
    }

    pub fn bps(&self) -> u32 {
        self.bps
    }

    pub fn as_percent(&self) -> Decimal {
        Decimal::new(i64::from(self.bps), 2)
    }

    /// Advisory check against a warning threshold in bps.
    pub fn is_high_risk(&self, threshold_bps: u32) -> bool {
        self.bps >= threshold_bps
    }
}

impl Default for SlippageTolerance {
    fn default() -> Self {
        Self { bps: 50 }
    }
}

impl TryFrom<u32> for SlippageTolerance {
    type Error = DomainError;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        Self::from_bps(bps)
    }
}

impl From<SlippageTolerance> for u32 {
    fn from(value: SlippageTolerance) -> u32 {
        value.bps
    }
}

impl fmt::Display for SlippageTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percent())
    }
}
