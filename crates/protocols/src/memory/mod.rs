//! In-memory pool state provider.
//!
//! Holds pool snapshots keyed by address and answers every capability from
//! them. Swap simulation runs the single-tick math in [`swap_step`]. Call
//! counters and per-pool failure injection make it usable as a test double.

/// JSON fixtures.
pub mod fixture;
/// Single-tick exact-input swap math.
pub mod swap_step;

use crate::PoolStateProvider;
use crate::error::{Capability, FixtureError, ProviderError};
use crate::types::{ConcentratedState, ConstantProductState, ExactInputSingle, SimulatedSwap};
use async_trait::async_trait;
use fixture::{PoolEntry, PoolFixture, parse_concentrated};
use primitive_types::U256;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use swap_router_domain::{
    ConcentratedPool, ConstantProductPool, FeeTier, PoolSnapshot, Token, TokenAmount, TokenPair,
};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Lookup key of the resolver: a pair plus the concentrated-liquidity tier,
/// or `None` for the constant-product pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PoolKey {
    pair: TokenPair,
    fee: Option<FeeTier>,
}

#[derive(Debug, Default)]
struct State {
    pools: HashMap<String, PoolSnapshot>,
    index: HashMap<PoolKey, String>,
    failing: HashSet<String>,
}

impl State {
    fn insert(&mut self, pair: TokenPair, snapshot: PoolSnapshot) {
        let address = snapshot.address().to_ascii_lowercase();
        let key = PoolKey {
            pair,
            fee: snapshot.fee_tier(),
        };
        if let Some(previous) = self.index.insert(key, address.clone()) {
            if previous != address {
                self.pools.remove(&previous);
            }
        }
        self.pools.insert(address, snapshot);
    }

    fn remove(&mut self, address: &str) -> Option<PoolSnapshot> {
        let address = address.to_ascii_lowercase();
        let snapshot = self.pools.remove(&address)?;
        self.index.retain(|_, indexed| *indexed != address);
        self.failing.remove(&address);
        Some(snapshot)
    }

    fn snapshot(
        &self,
        capability: Capability,
        address: &str,
    ) -> Result<&PoolSnapshot, ProviderError> {
        let address = address.to_ascii_lowercase();
        if self.failing.contains(&address) {
            return Err(ProviderError::query(
                capability,
                format!("injected failure for {address}"),
            ));
        }
        self.pools
            .get(&address)
            .ok_or(ProviderError::PoolNotFound(address))
    }
}

fn constant_product_snapshot(
    token_a: &str,
    token_b: &str,
    address: &str,
    reserve_a: TokenAmount,
    reserve_b: TokenAmount,
    fee_per_mille: u32,
) -> (TokenPair, PoolSnapshot) {
    let pair = TokenPair::from_addresses(token_a, token_b);
    let a_is_token0 = token_a.eq_ignore_ascii_case(pair.token0());
    let (reserve0, reserve1) = if a_is_token0 {
        (reserve_a, reserve_b)
    } else {
        (reserve_b, reserve_a)
    };
    let snapshot = PoolSnapshot::ConstantProduct(ConstantProductPool {
        address: address.to_string(),
        token0: pair.token0().to_string(),
        reserve0,
        reserve1,
        fee_per_mille,
    });
    (pair, snapshot)
}

/// Number of times each capability was invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub resolve: usize,
    pub read_constant_product: usize,
    pub read_concentrated: usize,
    pub simulate: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.resolve + self.read_constant_product + self.read_concentrated + self.simulate
    }
}

#[derive(Debug, Default)]
struct Counters {
    resolve: AtomicUsize,
    read_constant_product: AtomicUsize,
    read_concentrated: AtomicUsize,
    simulate: AtomicUsize,
}

/// Pool state provider backed by in-process maps.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    state: RwLock<State>,
    counters: Counters,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a provider from a parsed fixture.
    pub fn from_fixture(fixture: &PoolFixture) -> Result<Self, FixtureError> {
        let mut state = State::default();
        for entry in &fixture.pools {
            match entry {
                PoolEntry::ConstantProduct {
                    address,
                    token_a,
                    token_b,
                    reserve_a,
                    reserve_b,
                    fee_per_mille,
                } => {
                    if *fee_per_mille >= 1_000 {
                        return Err(FixtureError::InvalidPool {
                            address: address.clone(),
                            reason: format!("fee of {fee_per_mille} per mille"),
                        });
                    }
                    let (pair, snapshot) = constant_product_snapshot(
                        token_a,
                        token_b,
                        address,
                        *reserve_a,
                        *reserve_b,
                        *fee_per_mille,
                    );
                    state.insert(pair, snapshot);
                }
                PoolEntry::Concentrated {
                    address,
                    token_a,
                    token_b,
                    fee,
                    sqrt_price_x96,
                    liquidity,
                    tick,
                } => {
                    let numbers = parse_concentrated(address, sqrt_price_x96, liquidity, *tick)?;
                    let pool = ConcentratedPool {
                        address: address.clone(),
                        fee_tier: *fee,
                        sqrt_price_x96: numbers.sqrt_price_x96,
                        tick: numbers.tick,
                        liquidity: numbers.liquidity,
                    };
                    state.insert(
                        TokenPair::from_addresses(token_a, token_b),
                        PoolSnapshot::Concentrated(pool),
                    );
                }
            }
        }
        debug!(pools = state.pools.len(), "loaded pool fixture");
        Ok(Self {
            state: RwLock::new(state),
            counters: Counters::default(),
        })
    }

    /// Registers a constant-product pool. Reserves follow the argument order
    /// of the tokens, not the pool's token0/token1 order.
    pub async fn add_constant_product_pool(
        &self,
        token_a: &str,
        token_b: &str,
        address: &str,
        reserve_a: TokenAmount,
        reserve_b: TokenAmount,
        fee_per_mille: u32,
    ) {
        let (pair, snapshot) = constant_product_snapshot(
            token_a,
            token_b,
            address,
            reserve_a,
            reserve_b,
            fee_per_mille,
        );
        self.state.write().await.insert(pair, snapshot);
    }

    /// Registers a concentrated-liquidity pool, replacing any pool of the
    /// same pair and tier.
    pub async fn add_concentrated_pool(
        &self,
        token_a: &str,
        token_b: &str,
        pool: ConcentratedPool,
    ) {
        let pair = TokenPair::from_addresses(token_a, token_b);
        self.state
            .write()
            .await
            .insert(pair, PoolSnapshot::Concentrated(pool));
    }

    pub async fn remove_pool(&self, address: &str) -> Option<PoolSnapshot> {
        self.state.write().await.remove(address)
    }

    /// Makes every capability touching `address` fail with a query error.
    pub async fn set_failing(&self, address: &str, failing: bool) {
        let address = address.to_ascii_lowercase();
        let mut state = self.state.write().await;
        if failing {
            state.failing.insert(address);
        } else {
            state.failing.remove(&address);
        }
    }

    /// Overwrites the price and liquidity of a concentrated pool.
    pub async fn set_concentrated_state(
        &self,
        address: &str,
        sqrt_price_x96: U256,
        tick: i32,
        liquidity: u128,
    ) -> Result<(), ProviderError> {
        let key = address.to_ascii_lowercase();
        let mut state = self.state.write().await;
        let snapshot = state
            .pools
            .get_mut(&key)
            .ok_or_else(|| ProviderError::PoolNotFound(key.clone()))?;
        match snapshot {
            PoolSnapshot::Concentrated(pool) => {
                pool.sqrt_price_x96 = sqrt_price_x96;
                pool.tick = tick;
                pool.liquidity = liquidity;
                Ok(())
            }
            PoolSnapshot::ConstantProduct(_) => Err(ProviderError::PoolNotFound(key)),
        }
    }

    /// All registered pools ordered by address.
    pub async fn pools(&self) -> Vec<PoolSnapshot> {
        let state = self.state.read().await;
        let mut pools: Vec<PoolSnapshot> = state.pools.values().cloned().collect();
        pools.sort_by(|a, b| a.address().cmp(b.address()));
        pools
    }

    pub fn call_counts(&self) -> CallCounts {
        CallCounts {
            resolve: self.counters.resolve.load(Ordering::SeqCst),
            read_constant_product: self.counters.read_constant_product.load(Ordering::SeqCst),
            read_concentrated: self.counters.read_concentrated.load(Ordering::SeqCst),
            simulate: self.counters.simulate.load(Ordering::SeqCst),
        }
    }

    pub fn reset_call_counts(&self) {
        self.counters.resolve.store(0, Ordering::SeqCst);
        self.counters.read_constant_product.store(0, Ordering::SeqCst);
        self.counters.read_concentrated.store(0, Ordering::SeqCst);
        self.counters.simulate.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl PoolStateProvider for InMemoryProvider {
    async fn resolve_pool_address(
        &self,
        token_a: &Token,
        token_b: &Token,
        fee: Option<FeeTier>,
    ) -> Result<Option<String>, ProviderError> {
        self.counters.resolve.fetch_add(1, Ordering::SeqCst);
        let key = PoolKey {
            pair: TokenPair::new(token_a, token_b),
            fee,
        };
        let state = self.state.read().await;
        match state.index.get(&key) {
            Some(address) if state.failing.contains(address) => Err(ProviderError::query(
                Capability::ResolvePool,
                format!("injected failure for {address}"),
            )),
            Some(address) => Ok(Some(address.clone())),
            None => Ok(None),
        }
    }

    async fn read_constant_product_state(
        &self,
        pool_address: &str,
    ) -> Result<ConstantProductState, ProviderError> {
        self.counters
            .read_constant_product
            .fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;
        match state.snapshot(Capability::ReadConstantProduct, pool_address)? {
            PoolSnapshot::ConstantProduct(pool) => Ok(ConstantProductState {
                reserve0: pool.reserve0,
                reserve1: pool.reserve1,
                token0: pool.token0.clone(),
            }),
            PoolSnapshot::Concentrated(_) => Err(ProviderError::query(
                Capability::ReadConstantProduct,
                format!("{pool_address} is not a constant-product pool"),
            )),
        }
    }

    async fn read_concentrated_state(
        &self,
        pool_address: &str,
    ) -> Result<ConcentratedState, ProviderError> {
        self.counters.read_concentrated.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;
        match state.snapshot(Capability::ReadConcentrated, pool_address)? {
            PoolSnapshot::Concentrated(pool) => Ok(ConcentratedState {
                sqrt_price_x96: pool.sqrt_price_x96,
                tick: pool.tick,
                liquidity: pool.liquidity,
            }),
            PoolSnapshot::ConstantProduct(_) => Err(ProviderError::query(
                Capability::ReadConcentrated,
                format!("{pool_address} is not a concentrated-liquidity pool"),
            )),
        }
    }

    async fn simulate_exact_input_single(
        &self,
        request: &ExactInputSingle,
    ) -> Result<SimulatedSwap, ProviderError> {
        self.counters.simulate.fetch_add(1, Ordering::SeqCst);
        let key = PoolKey {
            pair: request.pair(),
            fee: Some(request.fee),
        };
        let state = self.state.read().await;
        let address = state
            .index
            .get(&key)
            .ok_or_else(|| ProviderError::PoolNotFound(format!("{} {}", key.pair, request.fee)))?;
        let PoolSnapshot::Concentrated(pool) =
            state.snapshot(Capability::SimulateExactInput, address)?
        else {
            return Err(ProviderError::PoolNotFound(address.clone()));
        };

        swap_step::exact_input_within_tick(
            pool.sqrt_price_x96,
            pool.liquidity,
            request.amount_in,
            request.fee.pips(),
            request.zero_for_one(),
        )
        .map(|(amount_out, sqrt_price_after_x96)| SimulatedSwap {
            amount_out,
            sqrt_price_after_x96,
        })
        .map_err(|e| {
            warn!(pool = %address, error = %e, "simulated swap reverted");
            ProviderError::query(Capability::SimulateExactInput, e.to_string())
        })
    }
}
