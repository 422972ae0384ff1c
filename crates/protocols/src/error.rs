//! Errors reported by pool state providers.

use std::fmt;
use thiserror::Error;

/// External capability that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ResolvePool,
    ReadConstantProduct,
    ReadConcentrated,
    SimulateExactInput,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::ResolvePool => "resolve_pool_address",
            Capability::ReadConstantProduct => "read_constant_product_state",
            Capability::ReadConcentrated => "read_concentrated_state",
            Capability::SimulateExactInput => "simulate_exact_input_single",
        };
        f.write_str(name)
    }
}

/// A failed external query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// No pool exists at the address or for the requested key.
    #[error("pool {0} not found")]
    PoolNotFound(String),
    /// Transport or execution failure of the capability.
    #[error("{capability} failed: {message}")]
    Query {
        capability: Capability,
        message: String,
    },
    /// The capability answered, but the answer failed boundary validation.
    #[error("{capability} returned malformed data: {reason}")]
    Malformed {
        capability: Capability,
        reason: String,
    },
}

impl ProviderError {
    pub fn query(capability: Capability, message: impl Into<String>) -> Self {
        Self::Query {
            capability,
            message: message.into(),
        }
    }

    pub fn malformed(capability: Capability, reason: impl Into<String>) -> Self {
        Self::Malformed {
            capability,
            reason: reason.into(),
        }
    }
}

/// Errors loading a pool fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse fixture: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid pool {address}: {reason}")]
    InvalidPool { address: String, reason: String },
}
