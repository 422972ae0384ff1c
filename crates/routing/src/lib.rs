//! Swap quotation and pool routing engine.
//!
//! This crate turns a quote request into a single routed quote:
//! - Route cache lookup with a short TTL
//! - Concurrent per-fee-tier probes with partial-failure tolerance
//! - Deterministic pool selection
//! - Slippage-bounded minimum received

/// Prelude module for convenient imports.
pub mod prelude;

/// Route cache.
pub mod cache;
/// Router configuration.
pub mod config;
/// Error types.
pub mod error;
/// Per-pool probes.
pub mod probe;
/// Quote requests.
pub mod request;
/// The router.
pub mod router;
/// Selection policy.
pub mod selector;

pub use config::RouterConfig;
pub use error::{RouterError, RouterResult};
pub use request::QuoteRequest;
pub use router::SwapRouter;
