//! Domain model and math kernel for swap quotation.
//!
//! This crate is synchronous and free of I/O:
//! - Token, amount and pair value types
//! - Constant-product and concentrated-liquidity pool snapshots
//! - Fixed-point quote math, price impact and slippage bounds

/// Error type for domain operations.
pub mod error;
/// Concentrated-liquidity fee tiers.
pub mod fees;
/// Quote math.
pub mod math;
/// Pool snapshots.
pub mod pool;
/// Quote candidates, routes and final quotes.
pub mod quote;
/// Tokens, amounts and pairs.
pub mod token;
/// Percent-like value types.
pub mod value_objects;

pub use error::{DomainError, DomainResult};
pub use fees::FeeTier;
pub use pool::{ConcentratedPool, ConstantProductPool, PoolSnapshot, PoolVersion};
pub use quote::{Quote, QuoteCandidate, Route};
pub use token::{Token, TokenAmount, TokenPair};
pub use value_objects::{PriceImpact, SlippageTolerance};
