pub mod price_impact;
pub mod slippage;

pub use price_impact::PriceImpact;
pub use slippage::SlippageTolerance;
