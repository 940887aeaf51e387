//! Liveness, readiness and metrics endpoint for a host application
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use telemetry_probe::ProbeServer;
//!
//! let probes = ProbeServer::new();
//! probes.start(8080).await?;
//! // ... application startup ...
//! probes.signal_ready();
//!
//! // ... on shutdown ...
//! probes.signal_not_ready();
//! probes.signal_stopped();
//! probes.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod server;

pub use server::{
    ApplicationState, InfoLogger, LifecycleError, LifecyclePhase, MetricsError, MetricsRegistry,
    PrometheusRegistry, ProbeServer, TracingLogger, DEFAULT_DRAIN_TIMEOUT,
};
