//! Prelude module for convenient imports.
//!
//! ```rust
//! use swap_router_protocols::prelude::*;
//! ```

pub use crate::PoolStateProvider;
pub use crate::error::{Capability, FixtureError, ProviderError};
pub use crate::memory::fixture::{PoolEntry, PoolFixture};
pub use crate::memory::{CallCounts, InMemoryProvider};
pub use crate::types::{
    ConcentratedState, ConstantProductState, ExactInputSingle, SimulatedSwap, ZERO_ADDRESS,
    existing_pool, is_zero_address,
};
