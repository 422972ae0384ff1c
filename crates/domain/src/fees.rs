use crate::error::DomainError;
use crate::token::TokenAmount;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Denominator of a concentrated-liquidity fee expressed in pips (hundredths of a bip).
pub const PIPS_DENOMINATOR: u32 = 1_000_000;

/// Fee tiers a concentrated-liquidity pool may be deployed with.
///
/// Variant order is the probe enumeration order and the tie-break order used by
/// the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum FeeTier {
    /// 0.01%
    Lowest,
    /// 0.05%
    Low,
    /// 0.30%
    Medium,
    /// 1.00%
    High,
}

impl FeeTier {
    pub const ALL: [FeeTier; 4] = [
        FeeTier::Lowest,
        FeeTier::Low,
        FeeTier::Medium,
        FeeTier::High,
    ];

    /// Fee in pips, e.g. 3000 for 0.3%.
    pub const fn pips(self) -> u32 {
        match self {
            FeeTier::Lowest => 100,
            FeeTier::Low => 500,
            FeeTier::Medium => 3_000,
            FeeTier::High => 10_000,
        }
    }

    pub fn from_pips(pips: u32) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.pips() == pips)
            .ok_or(DomainError::InvalidFee(pips))
    }

    /// Fee as a percentage, e.g. `0.3` for the medium tier.
    pub fn as_percent(self) -> Decimal {
        Decimal::new(i64::from(self.pips()), 4).normalize()
    }

    /// Fee charged on `amount_in`, truncating.
    pub fn fee_amount(self, amount_in: TokenAmount) -> TokenAmount {
        fee_amount_pips(amount_in, self.pips())
    }
}

/// `amount * pips / 1_000_000` computed at 512-bit width.
pub fn fee_amount_pips(amount: TokenAmount, pips: u32) -> TokenAmount {
    let wide = amount.0.full_mul(U256::from(pips)) / PIPS_DENOMINATOR;
    // pips < denominator, so the quotient never exceeds `amount`
    TokenAmount(U256::try_from(wide).unwrap_or(amount.0))
}

impl TryFrom<u32> for FeeTier {
    type Error = DomainError;

    fn try_from(pips: u32) -> Result<Self, Self::Error> {
        Self::from_pips(pips)
    }
}

impl From<FeeTier> for u32 {
    fn from(tier: FeeTier) -> u32 {
        tier.pips()
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percent())
    }
}
