//! Logging collaborator for lifecycle messages
//!
//! The probe server reports its start/stop progress through an injected
//! `InfoLogger`. Production code uses `TracingLogger`; tests use
//! `RecordingLogger` to assert on the exact sequence of lines.

use tracing::info;

/// Sink for plain informational messages
pub trait InfoLogger: Send + Sync {
    fn info(&self, message: &str);
}

/// Default logger that forwards to `tracing` at INFO level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl InfoLogger for TracingLogger {
    fn info(&self, message: &str) {
        info!("{}", message);
    }
}

impl<F> InfoLogger for F
where
    F: Fn(&str) + Send + Sync,
{
    fn info(&self, message: &str) {
        self(message)
    }
}

/// Logger that keeps every message in memory
#[cfg(test)]
#[allow(clippy::expect_used)]
#[derive(Debug, Default)]
pub struct RecordingLogger {
    lines: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .expect("RecordingLogger lock poisoned")
            .clone()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl InfoLogger for RecordingLogger {
    fn info(&self, message: &str) {
        self.lines
            .lock()
            .expect("RecordingLogger lock poisoned")
            .push(message.to_string());
    }
}
