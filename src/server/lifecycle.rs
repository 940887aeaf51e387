//! Start/stop lifecycle of the probe listener
//!
//! ```text
//! Unstarted ──start──> Starting ──bind ok──> Started ──stop──> Stopped
//!     ^                    │
//!     └──── bind failed ───┘
//! ```
//!
//! Every transition is claimed under one mutex before any await point, so
//! concurrent `start`/`stop` callers see exactly one winner. `Stopped` is
//! terminal: a probe server is not restartable.

use std::net::SocketAddr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::task::JoinHandle;

use super::shutdown::StopTrigger;

/// Errors from `start`/`stop`
///
/// These are programmer errors in the host's startup/shutdown sequence,
/// except `Bind`, which reports an unusable port.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Service telemetry already started")]
    AlreadyStarted,

    #[error("Service telemetry not started")]
    NotStarted,

    #[error("Service telemetry already stopped")]
    AlreadyStopped,

    #[error("Failed to bind telemetry port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

/// Observable lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Unstarted,
    Starting,
    Started,
    Stopped,
}

/// A bound, serving listener
pub(crate) struct Listener {
    pub addr: SocketAddr,
    pub trigger: StopTrigger,
    pub task: JoinHandle<std::io::Result<()>>,
}

enum Phase {
    Unstarted,
    Starting,
    Started(Listener),
    Stopped,
}

pub(crate) struct Lifecycle {
    phase: Mutex<Phase>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            phase: Mutex::new(Phase::Unstarted),
        }
    }

    // Phase writes are single assignments, so a poisoned lock still holds
    // a consistent value.
    fn lock(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn phase(&self) -> LifecyclePhase {
        match *self.lock() {
            Phase::Unstarted => LifecyclePhase::Unstarted,
            Phase::Starting => LifecyclePhase::Starting,
            Phase::Started(_) => LifecyclePhase::Started,
            Phase::Stopped => LifecyclePhase::Stopped,
        }
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &*self.lock() {
            Phase::Started(listener) => Some(listener.addr),
            _ => None,
        }
    }

    /// Claim the unstarted -> starting transition
    ///
    /// The returned guard reverts to `Unstarted` unless committed, so a
    /// failed or abandoned bind leaves the server startable.
    pub fn claim_start(&self) -> Result<PendingStart<'_>, LifecycleError> {
        let mut phase = self.lock();
        match *phase {
            Phase::Unstarted => {
                *phase = Phase::Starting;
                Ok(PendingStart {
                    lifecycle: self,
                    committed: false,
                })
            }
            _ => Err(LifecycleError::AlreadyStarted),
        }
    }

    /// Claim the started -> stopped transition and hand back the listener
    pub fn claim_stop(&self) -> Result<Listener, LifecycleError> {
        let mut phase = self.lock();
        match std::mem::replace(&mut *phase, Phase::Stopped) {
            Phase::Started(listener) => Ok(listener),
            Phase::Stopped => Err(LifecycleError::AlreadyStopped),
            previous @ (Phase::Unstarted | Phase::Starting) => {
                *phase = previous;
                Err(LifecycleError::NotStarted)
            }
        }
    }
}

/// An in-flight start holding the `Starting` phase
pub(crate) struct PendingStart<'a> {
    lifecycle: &'a Lifecycle,
    committed: bool,
}

impl PendingStart<'_> {
    pub fn commit(mut self, listener: Listener) {
        *self.lifecycle.lock() = Phase::Started(listener);
        self.committed = true;
    }
}

impl Drop for PendingStart<'_> {
    fn drop(&mut self) {
        if !self.committed {
            *self.lifecycle.lock() = Phase::Unstarted;
        }
    }
}
