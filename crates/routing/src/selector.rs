//! Pool selection policy.
//!
//! Applied in order:
//! 1. keep candidates whose price impact is strictly below the threshold;
//! 2. within those, prefer tiers at or below the preferred maximum fee;
//! 3. take the greatest output, the first in tier order winning ties;
//! 4. if nothing passed step 1, take the minimum price impact, preferring a
//!    low fee among equally low impacts.
//!
//! Candidates are put in canonical order (tier order, then pool address) before
//! the policy runs, so the winner does not depend on input order.

use crate::config::RouterConfig;
use swap_router_domain::{FeeTier, QuoteCandidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
    pub max_price_impact_bps: u32,
    pub preferred_max_fee_pips: u32,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::from_config(&RouterConfig::default())
    }
}

impl SelectionPolicy {
    pub fn new(max_price_impact_bps: u32, preferred_max_fee: FeeTier) -> Self {
        Self {
            max_price_impact_bps,
            preferred_max_fee_pips: preferred_max_fee.pips(),
        }
    }

    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(config.max_price_impact_bps, config.preferred_max_fee)
    }

    fn is_preferred_fee(&self, candidate: &QuoteCandidate) -> bool {
        candidate.fee_pips() <= self.preferred_max_fee_pips
    }

    /// Picks the winning candidate. Non-viable candidates are ignored; `None`
    /// when nothing viable remains.
    ///
    /// `tier_order` is the probe enumeration order; tiers missing from it and
    /// constant-product candidates rank after every listed tier.
    pub fn select(
        &self,
        candidates: &[QuoteCandidate],
        tier_order: &[FeeTier],
    ) -> Option<QuoteCandidate> {
        let rank = |candidate: &QuoteCandidate| {
            candidate
                .fee_tier()
                .and_then(|tier| tier_order.iter().position(|t| *t == tier))
                .unwrap_or(tier_order.len())
        };

        let mut ordered: Vec<&QuoteCandidate> =
            candidates.iter().filter(|c| c.is_viable()).collect();
        ordered.sort_by(|a, b| {
            rank(a)
                .cmp(&rank(b))
                .then_with(|| a.fee_pips().cmp(&b.fee_pips()))
                .then_with(|| a.pool_address().cmp(b.pool_address()))
        });

        let safe: Vec<&QuoteCandidate> = ordered
            .iter()
            .copied()
            .filter(|c| c.price_impact.is_below_bps(self.max_price_impact_bps))
            .collect();

        if !safe.is_empty() {
            let preferred: Vec<&QuoteCandidate> = safe
                .iter()
                .copied()
                .filter(|c| self.is_preferred_fee(c))
                .collect();
            let working = if preferred.is_empty() { safe } else { preferred };
            return greatest_output(&working).cloned();
        }

        let min_impact = ordered.iter().map(|c| c.price_impact).min()?;
        let tied: Vec<&QuoteCandidate> = ordered
            .iter()
            .copied()
            .filter(|c| c.price_impact == min_impact)
            .collect();
        tied.iter()
            .copied()
            .find(|c| self.is_preferred_fee(c))
            .or_else(|| tied.first().copied())
            .cloned()
    }
}

/// First candidate with the strictly greatest output.
fn greatest_output<'a>(candidates: &[&'a QuoteCandidate]) -> Option<&'a QuoteCandidate> {
    let mut best: Option<&QuoteCandidate> = None;
    for &candidate in candidates {
        if best.is_none_or(|current| candidate.amount_out > current.amount_out) {
            best = Some(candidate);
        }
    }
    best
}
