//! Stop plumbing for the probe listener
//!
//! - `stop_channel` pairs the serving task with the `stop()` call
//! - `wait_for_signal` lets a host block until SIGTERM/SIGINT

use tokio::sync::watch;
use tracing::info;

/// Receiving half, held by the serving task
pub struct StopSignal {
    receiver: watch::Receiver<bool>,
}

impl StopSignal {
    /// Resolve once a stop was triggered or the trigger was dropped
    pub async fn wait(mut self) {
        while !*self.receiver.borrow() {
            if self.receiver.changed().await.is_err() {
                break;
            }
        }
    }

    /// Check if a stop was triggered (non-blocking)
    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }
}

/// Sending half, held by the probe server while started
pub struct StopTrigger {
    sender: watch::Sender<bool>,
}

impl StopTrigger {
    pub fn trigger(&self) {
        // No receivers left means the listener already exited.
        let _ = self.sender.send(true);
    }
}

pub fn stop_channel() -> (StopTrigger, StopSignal) {
    let (sender, receiver) = watch::channel(false);
    (StopTrigger { sender }, StopSignal { receiver })
}

/// Wait for SIGTERM or SIGINT
///
/// Returns the name of the signal received.
#[cfg(unix)]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    info!(signal = name, "Received termination signal");
    Ok(name)
}

/// Wait for Ctrl+C (non-unix)
#[cfg(not(unix))]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    info!(signal = "CTRL_C", "Received termination signal");
    Ok("CTRL_C")
}
