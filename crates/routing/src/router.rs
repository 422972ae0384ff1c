//! Swap router: cache check, concurrent fan-out, selection and slippage bounds.

use crate::cache::{CacheLookup, RouteCache};
use crate::config::RouterConfig;
use crate::error::{RouterError, RouterResult};
use crate::probe::{self, ProbeOutcome};
use crate::request::QuoteRequest;
use crate::selector::SelectionPolicy;
use futures::future::join_all;
use std::sync::Arc;
use swap_router_domain::math::slippage::minimum_received;
use swap_router_domain::{FeeTier, PoolVersion, Quote, QuoteCandidate, Route, TokenPair};
use swap_router_protocols::PoolStateProvider;
use tracing::{debug, info, warn};

/// Quotes swaps against the pools exposed by a [`PoolStateProvider`].
pub struct SwapRouter {
    provider: Arc<dyn PoolStateProvider>,
    cache: Arc<RouteCache>,
    config: RouterConfig,
    policy: SelectionPolicy,
}

impl SwapRouter {
    /// Creates a router with its own route cache.
    pub fn new(provider: Arc<dyn PoolStateProvider>, config: RouterConfig) -> Self {
        let cache = Arc::new(RouteCache::new(config.cache_ttl));
        Self::with_cache(provider, config, cache)
    }

    /// Creates a router sharing an existing route cache.
    pub fn with_cache(
        provider: Arc<dyn PoolStateProvider>,
        config: RouterConfig,
        cache: Arc<RouteCache>,
    ) -> Self {
        let policy = SelectionPolicy::from_config(&config);
        Self {
            provider,
            cache,
            config,
            policy,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<RouteCache> {
        &self.cache
    }

    /// Produces one quote for `request`.
    ///
    /// Per-pool failures are absorbed; only invalid input or the absence of any
    /// viable pool is returned as an error.
    pub async fn get_swap_quote(&self, request: &QuoteRequest) -> RouterResult<Quote> {
        request.validate()?;
        let pair = request.pair();

        let (candidate, cached_route) = match request.pinned_fee {
            Some(fee) => (self.fan_out_concentrated(request, &[fee]).await, false),
            None => self.route(request, &pair).await,
        };
        let candidate = candidate.ok_or_else(|| RouterError::NoLiquidity {
            token_in: request.token_in.to_string(),
            token_out: request.token_out.to_string(),
        })?;

        Ok(self.finalize(request, &pair, candidate, cached_route))
    }

    async fn route(
        &self,
        request: &QuoteRequest,
        pair: &TokenPair,
    ) -> (Option<QuoteCandidate>, bool) {
        match self.cache.lookup(pair).await {
            CacheLookup::Fresh(entry)
                if request.version.is_none_or(|v| v == entry.route.version) =>
            {
                if let Some(candidate) = self.probe_cached(request, &entry.route).await {
                    return (Some(candidate), true);
                }
                debug!(
                    pair = %pair,
                    route = %entry.route,
                    "cached route not viable, running full fan-out"
                );
            }
            CacheLookup::Fresh(entry) => {
                debug!(
                    pair = %pair,
                    route = %entry.route,
                    "cached route does not match requested version"
                );
            }
            CacheLookup::Stale { age } => {
                debug!(pair = %pair, age_ms = age.as_millis() as u64, "ignoring stale route");
            }
            CacheLookup::Miss => {
                debug!(pair = %pair, "route cache miss");
            }
        }

        let candidate = self.full_fan_out(request).await;
        if let Some(winner) = &candidate {
            if request.version.is_none() {
                self.cache
                    .insert(pair.clone(), winner.route(), winner.snapshot.clone())
                    .await;
            }
        }
        (candidate, false)
    }

    /// Re-probes the cached pool for the current amount.
    async fn probe_cached(&self, request: &QuoteRequest, route: &Route) -> Option<QuoteCandidate> {
        let provider = self.provider.as_ref();
        let known = Some(route.pool_address.as_str());
        let outcome = match (route.version, route.fee_tier) {
            (PoolVersion::ConcentratedLiquidity, Some(fee)) => {
                probe::probe_concentrated(
                    provider,
                    &request.token_in,
                    &request.token_out,
                    request.amount_in,
                    fee,
                    known,
                )
                .await
            }
            (PoolVersion::ConstantProduct, _) => {
                probe::probe_constant_product(
                    provider,
                    &request.token_in,
                    &request.token_out,
                    request.amount_in,
                    self.config.constant_product_fee_per_mille,
                    known,
                )
                .await
            }
            (PoolVersion::ConcentratedLiquidity, None) => return None,
        };
        probe::collect_candidates(vec![(route.fee_tier, outcome)])
            .into_iter()
            .next()
    }

    async fn full_fan_out(&self, request: &QuoteRequest) -> Option<QuoteCandidate> {
        match request.version {
            Some(PoolVersion::ConstantProduct) => self.probe_constant_product(request).await,
            Some(PoolVersion::ConcentratedLiquidity) => {
                self.fan_out_concentrated(request, &self.config.fee_tiers)
                    .await
            }
            None => {
                if let Some(candidate) = self
                    .fan_out_concentrated(request, &self.config.fee_tiers)
                    .await
                {
                    return Some(candidate);
                }
                debug!(
                    token_in = %request.token_in,
                    token_out = %request.token_out,
                    "no concentrated liquidity, probing constant-product pool"
                );
                self.probe_constant_product(request).await
            }
        }
    }

    /// Probes every tier concurrently and selects the winner.
    async fn fan_out_concentrated(
        &self,
        request: &QuoteRequest,
        tiers: &[FeeTier],
    ) -> Option<QuoteCandidate> {
        let provider = self.provider.as_ref();
        let probes = tiers.iter().copied().map(move |fee| async move {
            let outcome = probe::probe_concentrated(
                provider,
                &request.token_in,
                &request.token_out,
                request.amount_in,
                fee,
                None,
            )
            .await;
            (Some(fee), outcome)
        });
        let outcomes: Vec<ProbeOutcome> = join_all(probes).await;
        let candidates = probe::collect_candidates(outcomes);
        self.policy.select(&candidates, &self.config.fee_tiers)
    }

    async fn probe_constant_product(&self, request: &QuoteRequest) -> Option<QuoteCandidate> {
        let outcome = probe::probe_constant_product(
            self.provider.as_ref(),
            &request.token_in,
            &request.token_out,
            request.amount_in,
            self.config.constant_product_fee_per_mille,
            None,
        )
        .await;
        let candidates = probe::collect_candidates(vec![(None, outcome)]);
        self.policy.select(&candidates, &self.config.fee_tiers)
    }

    fn finalize(
        &self,
        request: &QuoteRequest,
        pair: &TokenPair,
        candidate: QuoteCandidate,
        cached_route: bool,
    ) -> Quote {
        let route = candidate.route();
        let minimum = minimum_received(candidate.amount_out, request.slippage);
        let high_slippage_warning = request.slippage.is_high_risk(self.config.high_slippage_bps);
        if high_slippage_warning {
            warn!(
                pair = %pair,
                slippage_bps = request.slippage.bps(),
                threshold_bps = self.config.high_slippage_bps,
                "high slippage tolerance"
            );
        }

        info!(
            pair = %pair,
            route = %route,
            amount_in = %request.amount_in,
            amount_out = %candidate.amount_out,
            price_impact = %candidate.price_impact,
            cached_route,
            "selected route"
        );

        Quote {
            amount_in: request.amount_in,
            output_amount: candidate.amount_out,
            minimum_received: minimum,
            price_impact: candidate.price_impact,
            fee_amount: candidate.fee_amount,
            route,
            spot_price: candidate.spot_price,
            slippage: request.slippage,
            high_slippage_warning,
            cached_route,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::time::Duration;
    use swap_router_domain::math::fixed_point::q96;
    use swap_router_domain::{
        ConcentratedPool, PriceImpact, SlippageTolerance, Token, TokenAmount,
    };
    use swap_router_protocols::memory::InMemoryProvider;

    const DEEP: u128 = 1_000_000_000_000_000_000_000; // 1e21
    const SHALLOW: u128 = 10_000_000_000_000_000_000; // 1e19
    const ONE: u64 = 1_000_000_000_000_000_000; // 1e18

    fn token_a() -> Token {
        Token::new("0xa0", "AAA", 18)
    }

    fn token_b() -> Token {
        Token::new("0xb0", "BBB", 18)
    }

    fn pool(tier: FeeTier, sqrt_price_x96: U256, liquidity: u128) -> ConcentratedPool {
        ConcentratedPool {
            address: format!("0xp{}", tier.pips()),
            fee_tier: tier,
            sqrt_price_x96,
            tick: 0,
            liquidity,
        }
    }

    async fn provider_with(pools: Vec<ConcentratedPool>) -> Arc<InMemoryProvider> {
        let provider = Arc::new(InMemoryProvider::new());
        for pool in pools {
            provider.add_concentrated_pool("0xa0", "0xb0", pool).await;
        }
        provider
    }

    fn request(amount: u64) -> QuoteRequest {
        QuoteRequest::new(token_a(), token_b(), TokenAmount::from(amount))
    }

    #[tokio::test]
    async fn test_constant_product_quote() {
        let provider = Arc::new(InMemoryProvider::new());
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
        let router = SwapRouter::new(provider.clone(), RouterConfig::default());

        let quote = router.get_swap_quote(&request(10_000)).await.unwrap();

        assert_eq!(quote.output_amount, TokenAmount::from(19_743u64));
        assert_eq!(quote.minimum_received, TokenAmount::from(19_644u64));
        assert_eq!(quote.fee_amount, TokenAmount::from(30u64));
        assert_eq!(quote.chosen_pool_version(), PoolVersion::ConstantProduct);
        assert_eq!(quote.chosen_fee_tier(), None);
        let impact = quote.price_impact.as_percent().unwrap();
        assert!(impact > dec!(0.99) && impact < dec!(1.01));
        // four tiers resolved before falling back to the constant-product pool
        assert_eq!(provider.call_counts().resolve, 5);
    }

    #[tokio::test]
    async fn test_no_pools_is_no_liquidity() {
        let provider = Arc::new(InMemoryProvider::new());
        let router = SwapRouter::new(provider, RouterConfig::default());

        let result = router.get_swap_quote(&request(ONE)).await;
        assert_eq!(
            result,
            Err(RouterError::NoLiquidity {
                token_in: "AAA".to_string(),
                token_out: "BBB".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_zero_liquidity_and_failing_pools_are_no_liquidity() {
        let provider = provider_with(vec![
            pool(FeeTier::Low, q96(), 0),
            pool(FeeTier::Medium, q96(), DEEP),
        ])
        .await;
        provider.set_failing("0xp3000", true).await;
        let router = SwapRouter::new(provider.clone(), RouterConfig::default());

        let result = router.get_swap_quote(&request(ONE)).await;
        assert!(matches!(result, Err(RouterError::NoLiquidity { .. })));
        assert!(router.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_prefers_lower_fee_tier() {
        let provider = provider_with(vec![
            pool(FeeTier::Low, q96(), DEEP),
            pool(FeeTier::Medium, q96(), DEEP),
        ])
        .await;
        let router = SwapRouter::new(provider, RouterConfig::default());

        let quote = router.get_swap_quote(&request(ONE)).await.unwrap();
        assert_eq!(quote.chosen_fee_tier(), Some(FeeTier::Low));
        assert_eq!(quote.chosen_pool_version(), PoolVersion::ConcentratedLiquidity);
        assert!(!quote.cached_route);
    }

    #[tokio::test]
    async fn test_high_tier_skipped_despite_better_price() {
        // the 1% pool quotes at four times the price of the 0.3% pool
        let provider = provider_with(vec![
            pool(FeeTier::Medium, q96(), DEEP),
            pool(FeeTier::High, q96() * U256::from(2u8), DEEP),
        ])
        .await;
        let router = SwapRouter::new(provider, RouterConfig::default());

        let quote = router.get_swap_quote(&request(ONE)).await.unwrap();
        assert_eq!(quote.chosen_fee_tier(), Some(FeeTier::Medium));
    }

    #[tokio::test]
    async fn test_fallback_to_minimum_impact() {
        let provider = provider_with(vec![
            pool(FeeTier::Lowest, q96(), SHALLOW),
            pool(FeeTier::Medium, q96(), SHALLOW * 5),
        ])
        .await;
        let router = SwapRouter::new(provider, RouterConfig::default());

        let quote = router.get_swap_quote(&request(ONE)).await.unwrap();
        assert_eq!(quote.chosen_fee_tier(), Some(FeeTier::Medium));
        assert!(!quote.price_impact.is_below_bps(100));
    }

    #[tokio::test]
    async fn test_failed_probe_is_dropped() {
        let provider = provider_with(vec![
            pool(FeeTier::Low, q96(), DEEP),
            pool(FeeTier::Medium, q96(), DEEP),
        ])
        .await;
        provider.set_failing("0xp500", true).await;
        let router = SwapRouter::new(provider, RouterConfig::default());

        let quote = router.get_swap_quote(&request(ONE)).await.unwrap();
        assert_eq!(quote.chosen_fee_tier(), Some(FeeTier::Medium));
    }

    #[tokio::test]
    async fn test_second_call_probes_cached_pool_once() {
        let provider = provider_with(vec![
            pool(FeeTier::Low, q96(), DEEP),
            pool(FeeTier::Medium, q96(), DEEP),
        ])
        .await;
        let router = SwapRouter::new(provider.clone(), RouterConfig::default());

        let first = router.get_swap_quote(&request(ONE)).await.unwrap();
        let counts = provider.call_counts();
        assert_eq!(counts.resolve, 4);
        assert_eq!(counts.simulate, 2);
        assert_eq!(router.cache().len().await, 1);

        provider.reset_call_counts();
        let second = router.get_swap_quote(&request(ONE)).await.unwrap();
        let counts = provider.call_counts();
        assert_eq!(counts.resolve, 0);
        assert_eq!(counts.read_concentrated, 1);
        assert_eq!(counts.simulate, 1);

        assert!(second.cached_route);
        assert_eq!(second.route, first.route);
        assert_eq!(second.output_amount, first.output_amount);
    }

    #[tokio::test]
    async fn test_cached_route_uses_live_state() {
        let provider = provider_with(vec![pool(FeeTier::Low, q96(), DEEP)]).await;
        let router = SwapRouter::new(provider.clone(), RouterConfig::default());

        let first = router.get_swap_quote(&request(ONE)).await.unwrap();
        provider
            .set_concentrated_state("0xp500", q96(), 0, DEEP / 2)
            .await
            .unwrap();
        let second = router.get_swap_quote(&request(ONE)).await.unwrap();

        assert!(second.cached_route);
        assert!(second.output_amount < first.output_amount);
        assert!(second.price_impact > first.price_impact);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_cache_triggers_full_fan_out() {
        let provider = provider_with(vec![pool(FeeTier::Low, q96(), DEEP)]).await;
        let router = SwapRouter::new(provider.clone(), RouterConfig::default());

        router.get_swap_quote(&request(ONE)).await.unwrap();
        provider.reset_call_counts();

        tokio::time::advance(Duration::from_secs(21)).await;
        let quote = router.get_swap_quote(&request(ONE)).await.unwrap();

        assert!(!quote.cached_route);
        assert_eq!(provider.call_counts().resolve, 4);
    }

    #[tokio::test]
    async fn test_unviable_cached_route_falls_back() {
        let provider = provider_with(vec![
            pool(FeeTier::Low, q96(), DEEP),
            pool(FeeTier::Medium, q96(), DEEP),
        ])
        .await;
        let router = SwapRouter::new(provider.clone(), RouterConfig::default());

        router.get_swap_quote(&request(ONE)).await.unwrap();
        provider.remove_pool("0xp500").await;

        let quote = router.get_swap_quote(&request(ONE)).await.unwrap();
        assert!(!quote.cached_route);
        assert_eq!(quote.chosen_fee_tier(), Some(FeeTier::Medium));

        // the fan-out replaced the cached route
        let third = router.get_swap_quote(&request(ONE)).await.unwrap();
        assert!(third.cached_route);
        assert_eq!(third.chosen_fee_tier(), Some(FeeTier::Medium));
    }

    #[tokio::test]
    async fn test_idempotent_route() {
        let provider = provider_with(vec![
            pool(FeeTier::Lowest, q96(), DEEP),
            pool(FeeTier::Low, q96(), DEEP),
            pool(FeeTier::High, q96(), DEEP),
        ])
        .await;
        let router = SwapRouter::new(provider, RouterConfig::default());

        let first = router.get_swap_quote(&request(ONE)).await.unwrap();
        let second = router.get_swap_quote(&request(ONE)).await.unwrap();
        assert_eq!(first.chosen_fee_tier(), second.chosen_fee_tier());
        assert_eq!(first.chosen_pool_version(), second.chosen_pool_version());
        assert_eq!(first, Quote { cached_route: false, ..second });
    }

    #[tokio::test]
    async fn test_concentrated_preferred_over_constant_product() {
        let provider = provider_with(vec![pool(FeeTier::Medium, q96(), DEEP)]).await;
        provider
            .add_constant_product_pool(
                "0xa0",
                "0xb0",
                "0xv2",
                TokenAmount::from(DEEP * 1_000),
                TokenAmount::from(DEEP * 4_000),
                3,
            )
            .await;
        let router = SwapRouter::new(provider.clone(), RouterConfig::default());

        let quote = router.get_swap_quote(&request(ONE)).await.unwrap();
        assert_eq!(quote.chosen_pool_version(), PoolVersion::ConcentratedLiquidity);
        assert_eq!(provider.call_counts().read_constant_product, 0);

        let pinned = router
            .get_swap_quote(&request(ONE).with_version(PoolVersion::ConstantProduct))
            .await
            .unwrap();
        assert_eq!(pinned.chosen_pool_version(), PoolVersion::ConstantProduct);
        assert!(!pinned.cached_route);
    }

    #[tokio::test]
    async fn test_pinned_fee_bypasses_cache() {
        let provider = provider_with(vec![
            pool(FeeTier::Low, q96(), DEEP),
            pool(FeeTier::Medium, q96(), DEEP),
        ])
        .await;
        let router = SwapRouter::new(provider.clone(), RouterConfig::default());
        router.get_swap_quote(&request(ONE)).await.unwrap();
        provider.reset_call_counts();

        let quote = router
            .get_swap_quote(&request(ONE).with_pinned_fee(FeeTier::Medium))
            .await
            .unwrap();

        assert_eq!(quote.chosen_fee_tier(), Some(FeeTier::Medium));
        assert!(!quote.cached_route);
        assert_eq!(provider.call_counts().resolve, 1);
        match router.cache().lookup(&request(ONE).pair()).await {
            CacheLookup::Fresh(entry) => assert_eq!(entry.route.fee_tier, Some(FeeTier::Low)),
            other => panic!("expected fresh entry, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pinned_fee_without_pool() {
        let provider = provider_with(vec![pool(FeeTier::Low, q96(), DEEP)]).await;
        let router = SwapRouter::new(provider, RouterConfig::default());

        let result = router
            .get_swap_quote(&request(ONE).with_pinned_fee(FeeTier::High))
            .await;
        assert!(matches!(result, Err(RouterError::NoLiquidity { .. })));
    }

    #[tokio::test]
    async fn test_high_slippage_warning() {
        let provider = provider_with(vec![pool(FeeTier::Low, q96(), DEEP)]).await;
        let router = SwapRouter::new(provider, RouterConfig::default());

        let relaxed = request(ONE).with_slippage(SlippageTolerance::from_bps(500).unwrap());
        let quote = router.get_swap_quote(&relaxed).await.unwrap();
        assert!(quote.high_slippage_warning);

        let strict = request(ONE).with_slippage(SlippageTolerance::ZERO);
        let quote = router.get_swap_quote(&strict).await.unwrap();
        assert!(!quote.high_slippage_warning);
        assert_eq!(quote.minimum_received, quote.output_amount);
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected_before_probing() {
        let provider = Arc::new(InMemoryProvider::new());
        let router = SwapRouter::new(provider.clone(), RouterConfig::default());

        let result = router.get_swap_quote(&request(0)).await;
        assert!(matches!(result, Err(RouterError::InvalidInput(_))));
        assert_eq!(provider.call_counts().total(), 0);
    }

    #[tokio::test]
    async fn test_dust_pool_is_quoted_not_dropped() {
        let provider = Arc::new(InMemoryProvider::new());
        provider
            .add_constant_product_pool(
                "0xa0",
                "0xb0",
                "0xdust",
                TokenAmount::from(10u64),
                TokenAmount::from(10u64),
                3,
            )
            .await;
        let router = SwapRouter::new(provider, RouterConfig::default());

        let amount = TokenAmount(U256::from(10u64).pow(U256::from(30u8)));
        let request = QuoteRequest::new(token_a(), token_b(), amount);
        let quote = router.get_swap_quote(&request).await.unwrap();

        assert_eq!(quote.output_amount, TokenAmount::from(9u64));
        assert_eq!(quote.price_impact, PriceImpact::Bounded(Decimal::MAX));
        assert_eq!(quote.route.pool_address, "0xdust");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_does_not_keep_expired_pairs() {
        let provider = Arc::new(InMemoryProvider::new());
        let quote_tokens = ["0xc0", "0xd0", "0xe0", "0xf0"];
        for (i, token) in quote_tokens.iter().enumerate() {
            let pool = ConcentratedPool {
                address: format!("0xpair{i}"),
                ..pool(FeeTier::Low, q96(), DEEP)
            };
            provider.add_concentrated_pool("0xa0", token, pool).await;
        }
        let router = SwapRouter::new(provider, RouterConfig::default());

        for (i, token) in quote_tokens.iter().enumerate() {
            let token_out = Token::new(*token, format!("T{i}"), 18);
            let request = QuoteRequest::new(token_a(), token_out, TokenAmount::from(ONE));
            router.get_swap_quote(&request).await.unwrap();
            tokio::time::advance(Duration::from_secs(21)).await;
        }

        assert_eq!(router.cache().len().await, 1);
    }

    #[tokio::test]
    async fn test_reverse_direction() {
        let provider = provider_with(vec![pool(FeeTier::Low, q96(), DEEP)]).await;
        let router = SwapRouter::new(provider, RouterConfig::default());

        let request = QuoteRequest::new(token_b(), token_a(), TokenAmount::from(ONE));
        let quote = router.get_swap_quote(&request).await.unwrap();
        assert!(!quote.output_amount.is_zero());
        assert!(quote.output_amount < TokenAmount::from(ONE));
        assert_eq!(quote.spot_price, Some(dec!(1)));
    }
}
