//! External pool capabilities consumed by the routing engine.
//!
//! This crate defines the boundary between the engine and the chain:
//! - Pool address resolution per version and fee tier
//! - Live reserve and price/liquidity reads
//! - Single-pool exact-input swap simulation
//! - An in-memory provider for offline quoting and tests

/// Provider errors.
pub mod error;
/// In-memory provider.
pub mod memory;
/// Prelude module for convenient imports.
pub mod prelude;
/// Typed capability answers.
pub mod types;

use async_trait::async_trait;
use error::ProviderError;
use swap_router_domain::{FeeTier, Token};
use types::{ConcentratedState, ConstantProductState, ExactInputSingle, SimulatedSwap};

/// Read-only access to pool state.
///
/// Implementations must not retry internally beyond their own transport policy;
/// the engine drops a failed probe and moves on.
#[async_trait]
pub trait PoolStateProvider: Send + Sync {
    /// Resolves the pool for a pair. `fee` selects a concentrated-liquidity tier;
    /// `None` asks for the constant-product pool.
    async fn resolve_pool_address(
        &self,
        token_a: &Token,
        token_b: &Token,
        fee: Option<FeeTier>,
    ) -> Result<Option<String>, ProviderError>;

    async fn read_constant_product_state(
        &self,
        pool_address: &str,
    ) -> Result<ConstantProductState, ProviderError>;

    async fn read_concentrated_state(
        &self,
        pool_address: &str,
    ) -> Result<ConcentratedState, ProviderError>;

    async fn simulate_exact_input_single(
        &self,
        request: &ExactInputSingle,
    ) -> Result<SimulatedSwap, ProviderError>;
}
