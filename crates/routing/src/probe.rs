//! Per-pool quote probes.
//!
//! A probe reads live state for one pool and turns it into a [`QuoteCandidate`].
//! Probes never write shared state, so any number can run concurrently.

use crate::error::ProbeError;
use swap_router_domain::math::{concentrated_liquidity, constant_product};
use swap_router_domain::{
    FeeTier, PoolSnapshot, PriceImpact, QuoteCandidate, Token, TokenAmount, TokenPair,
};
use swap_router_protocols::PoolStateProvider;
use swap_router_protocols::types::{ExactInputSingle, existing_pool};
use tracing::{debug, warn};

/// Outcome of one probe, labelled with the tier it probed (`None` for constant-product).
pub type ProbeOutcome = (Option<FeeTier>, Result<QuoteCandidate, ProbeError>);

async fn pool_address(
    provider: &dyn PoolStateProvider,
    token_in: &Token,
    token_out: &Token,
    fee: Option<FeeTier>,
    known_address: Option<&str>,
) -> Result<String, ProbeError> {
    if let Some(address) = known_address {
        return Ok(address.to_string());
    }
    let resolved = provider.resolve_pool_address(token_in, token_out, fee).await?;
    existing_pool(resolved).ok_or(ProbeError::PoolAbsent)
}

/// Quotes `amount_in` against the concentrated-liquidity pool of one fee tier.
///
/// `known_address` skips pool resolution. A pool with no active liquidity yields
/// an unbounded candidate without calling the simulator.
pub async fn probe_concentrated(
    provider: &dyn PoolStateProvider,
    token_in: &Token,
    token_out: &Token,
    amount_in: TokenAmount,
    fee: FeeTier,
    known_address: Option<&str>,
) -> Result<QuoteCandidate, ProbeError> {
    let address = pool_address(provider, token_in, token_out, Some(fee), known_address).await?;
    let state = provider.read_concentrated_state(&address).await?;
    state.validate()?;

    let zero_for_one = token_in.sorts_before(token_out);
    let pool = state.into_pool(address, fee);
    let spot_price = concentrated_liquidity::sqrt_price_to_price(
        pool.sqrt_price_x96,
        token_in.decimals,
        token_out.decimals,
        zero_for_one,
    )
    .ok();
    let fee_amount = fee.fee_amount(amount_in);

    if !pool.has_liquidity() {
        return Ok(QuoteCandidate {
            amount_out: TokenAmount::zero(),
            fee_amount,
            price_impact: PriceImpact::Unbounded,
            spot_price,
            snapshot: PoolSnapshot::Concentrated(pool),
        });
    }

    let swap = provider
        .simulate_exact_input_single(&ExactInputSingle {
            token_in: token_in.clone(),
            token_out: token_out.clone(),
            amount_in,
            fee,
        })
        .await?;
    swap.validate(pool.sqrt_price_x96, zero_for_one)?;

    let price_impact = concentrated_liquidity::calculate_price_impact(
        pool.sqrt_price_x96,
        swap.sqrt_price_after_x96,
        pool.liquidity,
        zero_for_one,
    )?;

    Ok(QuoteCandidate {
        amount_out: swap.amount_out,
        fee_amount,
        price_impact,
        spot_price,
        snapshot: PoolSnapshot::Concentrated(pool),
    })
}

/// Quotes `amount_in` against the constant-product pool of the pair.
pub async fn probe_constant_product(
    provider: &dyn PoolStateProvider,
    token_in: &Token,
    token_out: &Token,
    amount_in: TokenAmount,
    fee_per_mille: u32,
    known_address: Option<&str>,
) -> Result<QuoteCandidate, ProbeError> {
    let address = pool_address(provider, token_in, token_out, None, known_address).await?;
    let state = provider.read_constant_product_state(&address).await?;
    state.validate(&TokenPair::new(token_in, token_out))?;

    let pool = state.into_pool(address, fee_per_mille);
    let (reserve_in, reserve_out) = pool.reserves_for(token_in);

    let amount_out =
        constant_product::calculate_out_amount(amount_in, reserve_in, reserve_out, fee_per_mille)?;
    let price_impact = constant_product::calculate_price_impact(
        amount_in,
        amount_out,
        reserve_in,
        reserve_out,
        fee_per_mille,
    )?;
    let spot_price = constant_product::calculate_spot_price(
        reserve_in,
        reserve_out,
        token_in.decimals,
        token_out.decimals,
    )
    .ok();

    Ok(QuoteCandidate {
        amount_out,
        fee_amount: constant_product::calculate_fee_amount(amount_in, fee_per_mille),
        price_impact,
        spot_price,
        snapshot: PoolSnapshot::ConstantProduct(pool),
    })
}

/// Keeps the viable candidates of a fan-out, dropping failed and empty probes.
pub fn collect_candidates(outcomes: Vec<ProbeOutcome>) -> Vec<QuoteCandidate> {
    outcomes
        .into_iter()
        .filter_map(|(fee, outcome)| {
            let tier = fee.map_or_else(|| "v2".to_string(), |f| f.to_string());
            match outcome {
                Ok(candidate) if candidate.is_viable() => {
                    debug!(
                        fee_tier = %tier,
                        pool = %candidate.pool_address(),
                        amount_out = %candidate.amount_out,
                        price_impact = %candidate.price_impact,
                        "probe succeeded"
                    );
                    Some(candidate)
                }
                Ok(candidate) => {
                    debug!(
                        fee_tier = %tier,
                        pool = %candidate.pool_address(),
                        "pool has no liquidity"
                    );
                    None
                }
                Err(ProbeError::PoolAbsent) => {
                    debug!(fee_tier = %tier, "no pool deployed");
                    None
                }
                Err(error) => {
                    warn!(fee_tier = %tier, error = %error, "dropping failed probe");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use primitive_types::U256;
    use rust_decimal_macros::dec;
    use swap_router_domain::math::fixed_point::q96;
    use swap_router_domain::{ConcentratedPool, PoolVersion};
    use swap_router_protocols::error::ProviderError;
    use swap_router_protocols::memory::InMemoryProvider;
    use swap_router_protocols::types::{
        ConcentratedState, ConstantProductState, SimulatedSwap, ZERO_ADDRESS,
    };

    fn token_a() -> Token {
        Token::new("0xa0", "AAA", 18)
    }

    fn token_b() -> Token {
        Token::new("0xb0", "BBB", 18)
    }

    /// Answers every capability with the configured values, valid or not.
    struct ScriptedProvider {
        resolved: Option<String>,
        sqrt_price_after: U256,
    }

    #[async_trait]
    impl PoolStateProvider for ScriptedProvider {
        async fn resolve_pool_address(
            &self,
            _token_a: &Token,
            _token_b: &Token,
            _fee: Option<FeeTier>,
        ) -> Result<Option<String>, ProviderError> {
            Ok(self.resolved.clone())
        }

        async fn read_constant_product_state(
            &self,
            _pool_address: &str,
        ) -> Result<ConstantProductState, ProviderError> {
            Ok(ConstantProductState {
                reserve0: TokenAmount::from(1_000u64),
                reserve1: TokenAmount::from(1_000u64),
                token0: "0xfff".to_string(),
            })
        }

        async fn read_concentrated_state(
            &self,
            _pool_address: &str,
        ) -> Result<ConcentratedState, ProviderError> {
            Ok(ConcentratedState {
                sqrt_price_x96: q96(),
                tick: 0,
                liquidity: 1_000_000,
            })
        }

        async fn simulate_exact_input_single(
            &self,
            _request: &ExactInputSingle,
        ) -> Result<SimulatedSwap, ProviderError> {
            Ok(SimulatedSwap {
                amount_out: TokenAmount::from(10u64),
                sqrt_price_after_x96: self.sqrt_price_after,
            })
        }
    }

    #[tokio::test]
    async fn test_constant_product_reference_trade() {
        let provider = InMemoryProvider::new();
        provider
            .add_constant_product_pool(
                "0xa0",
                "0xb0",
                "0xv2",
                TokenAmount::from(1_000_000u64),
                TokenAmount::from(2_000_000u64),
                3,
            )
            .await;

        let candidate = probe_constant_product(
            &provider,
            &token_a(),
            &token_b(),
            TokenAmount::from(10_000u64),
            3,
            None,
        )
        .await
        .unwrap();

        assert_eq!(candidate.amount_out, TokenAmount::from(19_743u64));
        assert_eq!(candidate.fee_amount, TokenAmount::from(30u64));
        assert_eq!(candidate.version(), PoolVersion::ConstantProduct);
        let impact = candidate.price_impact.as_percent().unwrap();
        assert!(impact > dec!(0.99) && impact < dec!(1.01));
        assert_eq!(candidate.spot_price, Some(dec!(2)));
    }

    #[tokio::test]
    async fn test_zero_address_is_absent() {
        let provider = ScriptedProvider {
            resolved: Some(ZERO_ADDRESS.to_string()),
            sqrt_price_after: q96(),
        };
        let result = probe_concentrated(
            &provider,
            &token_a(),
            &token_b(),
            TokenAmount::from(100u64),
            FeeTier::Low,
            None,
        )
        .await;
        assert_eq!(result, Err(ProbeError::PoolAbsent));
    }

    #[tokio::test]
    async fn test_price_moving_backwards_is_malformed() {
        let provider = ScriptedProvider {
            resolved: Some("0xpool".to_string()),
            // selling token0 must push the sqrt price down
            sqrt_price_after: q96() + U256::from(1u8),
        };
        let result = probe_concentrated(
            &provider,
            &token_a(),
            &token_b(),
            TokenAmount::from(100u64),
            FeeTier::Low,
            None,
        )
        .await;
        assert!(matches!(
            result,
            Err(ProbeError::External(ProviderError::Malformed { .. }))
        ));
    }

    #[tokio::test]
    async fn test_foreign_token0_is_malformed() {
        let provider = ScriptedProvider {
            resolved: Some("0xpool".to_string()),
            sqrt_price_after: q96(),
        };
        let result = probe_constant_product(
            &provider,
            &token_a(),
            &token_b(),
            TokenAmount::from(100u64),
            3,
            None,
        )
        .await;
        assert!(matches!(
            result,
            Err(ProbeError::External(ProviderError::Malformed { .. }))
        ));
    }

    #[tokio::test]
    async fn test_zero_liquidity_skips_simulation() {
        let provider = InMemoryProvider::new();
        provider
            .add_concentrated_pool(
                "0xa0",
                "0xb0",
                ConcentratedPool {
                    address: "0xp1".to_string(),
                    fee_tier: FeeTier::Medium,
                    sqrt_price_x96: q96(),
                    tick: 0,
                    liquidity: 0,
                },
            )
            .await;

        let candidate = probe_concentrated(
            &provider,
            &token_a(),
            &token_b(),
            TokenAmount::from(100u64),
            FeeTier::Medium,
            None,
        )
        .await
        .unwrap();

        assert_eq!(candidate.price_impact, PriceImpact::Unbounded);
        assert!(!candidate.is_viable());
        assert_eq!(provider.call_counts().simulate, 0);
    }

    #[tokio::test]
    async fn test_known_address_skips_resolution() {
        let provider = InMemoryProvider::new();
        provider
            .add_concentrated_pool(
                "0xa0",
                "0xb0",
                ConcentratedPool {
                    address: "0xp1".to_string(),
                    fee_tier: FeeTier::Low,
                    sqrt_price_x96: q96(),
                    tick: 0,
                    liquidity: 1_000_000_000_000_000_000,
                },
            )
            .await;

        let candidate = probe_concentrated(
            &provider,
            &token_a(),
            &token_b(),
            TokenAmount::from(1_000_000u64),
            FeeTier::Low,
            Some("0xp1"),
        )
        .await
        .unwrap();

        assert!(candidate.is_viable());
        let counts = provider.call_counts();
        assert_eq!(counts.resolve, 0);
        assert_eq!(counts.read_concentrated, 1);
        assert_eq!(counts.simulate, 1);
    }

    #[test]
    fn test_collect_drops_failures_and_empty_pools() {
        let viable = QuoteCandidate {
            amount_out: TokenAmount::from(10u64),
            fee_amount: TokenAmount::zero(),
            price_impact: PriceImpact::percent(dec!(0.2)),
            spot_price: None,
            snapshot: PoolSnapshot::Concentrated(ConcentratedPool {
                address: "0xp1".to_string(),
                fee_tier: FeeTier::Low,
                sqrt_price_x96: q96(),
                tick: 0,
                liquidity: 1,
            }),
        };
        let empty = QuoteCandidate {
            amount_out: TokenAmount::zero(),
            price_impact: PriceImpact::Unbounded,
            ..viable.clone()
        };

        let kept = collect_candidates(vec![
            (Some(FeeTier::Lowest), Err(ProbeError::PoolAbsent)),
            (Some(FeeTier::Low), Ok(viable.clone())),
            (
                Some(FeeTier::Medium),
                Err(ProbeError::External(ProviderError::PoolNotFound(
                    "0xp3".to_string(),
                ))),
            ),
            (Some(FeeTier::High), Ok(empty)),
        ]);
        assert_eq!(kept, vec![viable]);
    }
}
