// Application state module
// Shared by every connection task; holds nothing that changes per request

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::types::Config;
use crate::info::{HostFacts, SystemFacts};

/// Application state
pub struct AppState {
    pub config: Config,
    /// Source of host, runtime and memory facts for `/api/info`
    pub facts: Arc<dyn HostFacts>,
    pub active_connections: Arc<AtomicUsize>,
}

impl AppState {
    /// Create `AppState` backed by the real platform facts
    pub fn new(config: &Config) -> Self {
        Self::with_facts(config, Arc::new(SystemFacts::new()))
    }

    pub fn with_facts(config: &Config, facts: Arc<dyn HostFacts>) -> Self {
        Self {
            config: config.clone(),
            facts,
            active_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn connection_count(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }
}
