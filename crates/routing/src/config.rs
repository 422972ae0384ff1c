//! Router configuration.

use crate::error::{RouterError, RouterResult};
use std::time::Duration;
use swap_router_domain::FeeTier;
use swap_router_domain::math::constant_product::FEE_DENOMINATOR;

/// Environment variable holding the route cache TTL in seconds.
pub const ENV_CACHE_TTL_SECS: &str = "SWAP_ROUTER_CACHE_TTL_SECS";
/// Environment variable holding the probed fee tiers, comma separated pips.
pub const ENV_FEE_TIERS: &str = "SWAP_ROUTER_FEE_TIERS";
/// Environment variable holding the selection price impact threshold in bps.
pub const ENV_MAX_IMPACT_BPS: &str = "SWAP_ROUTER_MAX_IMPACT_BPS";
/// Environment variable holding the constant-product fee per mille.
pub const ENV_V2_FEE_PER_MILLE: &str = "SWAP_ROUTER_V2_FEE_PER_MILLE";
/// Environment variable holding the high slippage advisory threshold in bps.
pub const ENV_HIGH_SLIPPAGE_BPS: &str = "SWAP_ROUTER_HIGH_SLIPPAGE_BPS";

/// Configuration for the swap router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// How long a winning route is reused for a pair.
    pub cache_ttl: Duration,
    /// Concentrated-liquidity tiers to probe, in tie-break order.
    pub fee_tiers: Vec<FeeTier>,
    /// Candidates at or above this impact are only used as a fallback.
    pub max_price_impact_bps: u32,
    /// Highest tier still considered "low/medium" by the selector.
    pub preferred_max_fee: FeeTier,
    /// Fee of constant-product pools in parts per thousand.
    pub constant_product_fee_per_mille: u32,
    /// Slippage tolerance at which quotes carry a warning.
    pub high_slippage_bps: u32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(20),
            fee_tiers: FeeTier::ALL.to_vec(),
            max_price_impact_bps: 100, // 1%
            preferred_max_fee: FeeTier::Medium,
            constant_product_fee_per_mille: 3, // 0.3%
            high_slippage_bps: 500,            // 5%
        }
    }
}

impl RouterConfig {
    /// Defaults overlaid with `SWAP_ROUTER_*` environment variables.
    pub fn from_env() -> RouterResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`, then validated.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> RouterResult<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_CACHE_TTL_SECS) {
            config.cache_ttl = Duration::from_secs(parse_number(ENV_CACHE_TTL_SECS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_FEE_TIERS) {
            config.fee_tiers = parse_fee_tiers(&raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_IMPACT_BPS) {
            config.max_price_impact_bps = parse_number(ENV_MAX_IMPACT_BPS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_V2_FEE_PER_MILLE) {
            config.constant_product_fee_per_mille = parse_number(ENV_V2_FEE_PER_MILLE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_HIGH_SLIPPAGE_BPS) {
            config.high_slippage_bps = parse_number(ENV_HIGH_SLIPPAGE_BPS, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RouterResult<()> {
        if self.fee_tiers.is_empty() {
            return Err(RouterError::InvalidConfig(
                "at least one fee tier must be probed".to_string(),
            ));
        }
        for (i, tier) in self.fee_tiers.iter().enumerate() {
            if self.fee_tiers[..i].contains(tier) {
                return Err(RouterError::InvalidConfig(format!(
                    "fee tier {tier} listed twice"
                )));
            }
        }
        if self.constant_product_fee_per_mille >= FEE_DENOMINATOR {
            return Err(RouterError::InvalidConfig(format!(
                "constant-product fee of {} per mille",
                self.constant_product_fee_per_mille
            )));
        }
        if self.max_price_impact_bps == 0 {
            return Err(RouterError::InvalidConfig(
                "price impact threshold must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> RouterResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| RouterError::InvalidConfig(format!("{key}={raw:?} is not a number")))
}

fn parse_fee_tiers(raw: &str) -> RouterResult<Vec<FeeTier>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let pips: u32 = parse_number(ENV_FEE_TIERS, part)?;
            FeeTier::from_pips(pips)
                .map_err(|e| RouterError::InvalidConfig(format!("{ENV_FEE_TIERS}: {e}")))
        })
        .collect()
}
