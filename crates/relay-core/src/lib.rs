//! Relay core — upstream pool management and request dispatch
//!
//! This crate owns the shared state and failure-recovery policy of the
//! relay: the pool of currently-alive upstreams, the concurrent liveness
//! refresh cycle, and the dispatch engine that selects an upstream per
//! request and fails over on error.

pub mod adapter;
pub mod dispatch;
pub mod error;
pub mod pool;
pub mod probe;
pub mod refresh;
pub mod roster;
pub mod types;

pub use adapter::{Adapter, LiveAdapter};
pub use dispatch::DispatchEngine;
pub use error::CoreError;
pub use pool::{PoolSnapshot, UpstreamPool};
pub use probe::Prober;
pub use refresh::{PoolRefresher, RefreshSummary};
pub use types::{Family, TranslateRequest};

pub use relay_client::Translation;
