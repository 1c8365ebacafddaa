//! Server application state shared across handlers

use crate::repository::RepositoryManager;
use crate::shutdown::ShutdownState;

/// Shared state for the server: the repository manager and shutdown flag
#[derive(Clone)]
pub struct ServerAppState {
    /// Repository operations, backed by the immutable registry
    pub manager: RepositoryManager,

    /// Shutdown state
    pub shutdown_state: ShutdownState,
}

impl ServerAppState {
    pub fn new(manager: RepositoryManager, shutdown_state: ShutdownState) -> Self {
        Self {
            manager,
            shutdown_state,
        }
    }
}
