//! Error type shared by the domain model and the math kernel.

use thiserror::Error;

/// Errors raised by value construction and amount arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A checked integer operation overflowed.
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
    /// A denominator was zero.
    #[error("division by zero in {0}")]
    DivisionByZero(&'static str),
    /// A token identifier or decimal precision was rejected.
    #[error("invalid token: {0}")]
    InvalidToken(String),
    /// An amount could not be parsed or is out of range.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// Slippage tolerance outside `[0, 100)` percent.
    #[error("invalid slippage tolerance: {0}")]
    InvalidSlippage(String),
    /// A fee value that does not map to a known tier or is not below 100%.
    #[error("invalid fee: {0}")]
    InvalidFee(u32),
    /// A pool version name that is neither constant-product nor concentrated.
    #[error("unknown pool version {0:?}")]
    UnknownPoolVersion(String),
}

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Whether the error comes from caller-supplied values rather than arithmetic.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken(_)
                | Self::InvalidAmount(_)
                | Self::InvalidSlippage(_)
                | Self::InvalidFee(_)
                | Self::UnknownPoolVersion(_)
        )
    }
}
