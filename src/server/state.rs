//! Liveness and readiness flags shared between the probe server and its handlers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared application health state
///
/// Starts live but not ready. Clones share the same flags, so the router's
/// handlers observe every signal sent through the owning `ProbeServer`.
#[derive(Debug, Clone)]
pub struct ApplicationState {
    live: Arc<AtomicBool>,
    ready: Arc<AtomicBool>,
}

impl ApplicationState {
    /// Create a new state (live, not ready)
    pub fn new() -> Self {
        Self {
            live: Arc::new(AtomicBool::new(true)),
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Mark the application as able to take traffic
    pub fn signal_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    /// Mark the application as unable to take traffic
    ///
    /// Liveness is left untouched: the orchestrator diverts traffic
    /// but does not restart the process.
    pub fn signal_not_ready(&self) {
        self.ready.store(false, Ordering::SeqCst);
    }

    /// Mark the application as permanently unhealthy
    ///
    /// Readiness is cleared before liveness so a concurrent reader never
    /// sees `ready` without `live`.
    pub fn signal_stopped(&self) {
        self.ready.store(false, Ordering::SeqCst);
        self.live.store(false, Ordering::SeqCst);
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self::new()
    }
}
