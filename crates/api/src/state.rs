use std::sync::Arc;

use sage_core::executor::Executor;
use sage_db::JobStore;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::engine::JobEngine;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// The Job Store every component reads from.
    pub store: Arc<dyn JobStore>,
    /// Lifecycle engine owning the per-job background tasks.
    pub engine: Arc<JobEngine>,
    pub config: Arc<ServerConfig>,
    /// Cancelled on shutdown; ends open status streams.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wire the store and executor into a fresh engine.
    pub fn new(store: Arc<dyn JobStore>, executor: Arc<dyn Executor>, config: ServerConfig) -> Self {
        let engine = Arc::new(JobEngine::new(Arc::clone(&store), executor));
        Self {
            store,
            engine,
            config: Arc::new(config),
            shutdown: CancellationToken::new(),
        }
    }
}
