use std::sync::Arc;

use crate::db::{InMemorySessions, InMemoryStore, RatingsStore, SessionStore};

/// Default session lifetime for in-memory state
const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;

/// Shared application state
///
/// Built once at startup and cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RatingsStore>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RatingsStore>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { store, sessions }
    }

    /// State backed entirely by process memory, used by tests and local runs
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(InMemorySessions::new(DEFAULT_SESSION_TTL_SECS)),
        )
    }
}
