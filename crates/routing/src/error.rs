//! Error types for the routing engine.

use swap_router_domain::DomainError;
use swap_router_protocols::error::ProviderError;
use thiserror::Error;

/// Whole-request failure returned by the router.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// The request was rejected before any pool was probed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Every probed pool was absent, empty, or failed.
    #[error("no liquidity for {token_in} -> {token_out}")]
    NoLiquidity { token_in: String, token_out: String },
    #[error("invalid router configuration: {0}")]
    InvalidConfig(String),
    /// Arithmetic failure outside any single probe.
    #[error(transparent)]
    Domain(DomainError),
}

impl From<DomainError> for RouterError {
    fn from(err: DomainError) -> Self {
        if err.is_validation() {
            RouterError::InvalidInput(err.to_string())
        } else {
            RouterError::Domain(err)
        }
    }
}

/// Result alias for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// Why a single probe yielded no candidate. Never leaves the router.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("no pool deployed")]
    PoolAbsent,
    #[error(transparent)]
    External(#[from] ProviderError),
    #[error(transparent)]
    Math(#[from] DomainError),
}
