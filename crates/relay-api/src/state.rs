//! Application state

use relay_core::{DispatchEngine, PoolRefresher};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DispatchEngine>,
    pub refresher: Arc<PoolRefresher>,
}

impl AppState {
    pub fn new(engine: Arc<DispatchEngine>, refresher: Arc<PoolRefresher>) -> Self {
        Self { engine, refresher }
    }
}
