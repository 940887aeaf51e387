//! Probe endpoint for orchestrator health checks and metrics scraping
//!
//! Serves:
//! - `/liveness` - Liveness probe (process should keep running)
//! - `/readiness` - Readiness probe (process should receive traffic)
//! - `/metrics` - Metrics in the registry's exposition format
//!
//! Also provides SIGTERM/SIGINT handling for host shutdown sequences.

mod lifecycle;
pub mod logger;
pub mod metrics;
mod probe;
pub mod shutdown;
mod state;

pub use lifecycle::{LifecycleError, LifecyclePhase};
pub use logger::{InfoLogger, TracingLogger};
pub use metrics::{MetricsError, MetricsRegistry, PrometheusRegistry};
pub use probe::{ProbeServer, DEFAULT_DRAIN_TIMEOUT};
pub use shutdown::wait_for_signal;
pub use state::ApplicationState;

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod lifecycle_tests;

#[cfg(test)]
#[path = "probe_test.rs"]
mod probe_tests;

#[cfg(test)]
#[path = "shutdown_test.rs"]
mod shutdown_tests;

#[cfg(test)]
#[path = "state_test.rs"]
mod state_tests;
