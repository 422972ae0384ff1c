//! Quote request.

use crate::error::{RouterError, RouterResult};
use swap_router_domain::{
    FeeTier, PoolVersion, SlippageTolerance, Token, TokenAmount, TokenPair,
};

/// Parameters of one quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub token_in: Token,
    pub token_out: Token,
    pub amount_in: TokenAmount,
    pub slippage: SlippageTolerance,
    /// Restricts routing to one pool family.
    pub version: Option<PoolVersion>,
    /// Probes only this concentrated-liquidity tier and bypasses the route cache.
    pub pinned_fee: Option<FeeTier>,
}

impl QuoteRequest {
    pub fn new(token_in: Token, token_out: Token, amount_in: TokenAmount) -> Self {
        Self {
            token_in,
            token_out,
            amount_in,
            slippage: SlippageTolerance::default(),
            version: None,
            pinned_fee: None,
        }
    }

    pub fn with_slippage(mut self, slippage: SlippageTolerance) -> Self {
        self.slippage = slippage;
        self
    }

    pub fn with_version(mut self, version: PoolVersion) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_pinned_fee(mut self, fee: FeeTier) -> Self {
        self.pinned_fee = Some(fee);
        self
    }

    pub fn pair(&self) -> TokenPair {
        TokenPair::new(&self.token_in, &self.token_out)
    }

    /// Selling token0 for token1.
    pub fn zero_for_one(&self) -> bool {
        self.token_in.sorts_before(&self.token_out)
    }

    /// Rejects requests that must fail before any pool is probed.
    pub fn validate(&self) -> RouterResult<()> {
        self.token_in.validate()?;
        self.token_out.validate()?;
        if self.token_in.same_address(&self.token_out.address) {
            return Err(RouterError::InvalidInput(format!(
                "token_in and token_out are both {}",
                self.token_in.address
            )));
        }
        if self.amount_in.is_zero() {
            return Err(RouterError::InvalidInput(
                "amount_in must be positive".to_string(),
            ));
        }
        if self.pinned_fee.is_some() && self.version == Some(PoolVersion::ConstantProduct) {
            return Err(RouterError::InvalidInput(
                "a fee tier can only be pinned for concentrated-liquidity pools".to_string(),
            ));
        }
        Ok(())
    }
}
