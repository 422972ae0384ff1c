//! Prelude module for convenient imports.
//!
//! ```rust
//! use swap_router_engine::prelude::*;
//! ```

pub use crate::cache::{CacheLookup, RouteCache, RouteCacheEntry};
pub use crate::config::RouterConfig;
pub use crate::error::{ProbeError, RouterError, RouterResult};
pub use crate::request::QuoteRequest;
pub use crate::router::SwapRouter;
pub use crate::selector::SelectionPolicy;
