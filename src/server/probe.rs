//! Probe server for orchestrator health checks and metrics scraping
//!
//! - `/liveness` - Is the process healthy enough to keep running?
//! - `/readiness` - Should the process receive traffic?
//! - `/metrics` - Rendered metrics in the registry's exposition format
//!
//! The host drives the server through three signals and a single
//! start/stop cycle:
//!
//! ```text
//! start(port) -> signal_ready() ... signal_not_ready() -> signal_stopped() -> stop()
//! ```

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::warn;

use super::lifecycle::{Lifecycle, LifecycleError, LifecyclePhase, Listener};
use super::logger::{InfoLogger, TracingLogger};
use super::metrics::{MetricsRegistry, PrometheusRegistry};
use super::shutdown::stop_channel;
use super::state::ApplicationState;

/// Default time `stop` waits for open connections to finish
///
/// The listener sets no header-read timeout, so a client stalled mid-request
/// would otherwise hold `stop` forever.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Router state shared by the probe handlers
#[derive(Clone)]
struct ProbeState {
    health: ApplicationState,
    registry: Arc<dyn MetricsRegistry>,
}

fn status_for(healthy: bool) -> StatusCode {
    if healthy {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Liveness probe handler
///
/// Returns 200 OK while live, 500 after `signal_stopped`.
async fn liveness(State(state): State<ProbeState>) -> StatusCode {
    status_for(state.health.is_live())
}

/// Readiness probe handler
///
/// Returns 200 OK while ready, 500 otherwise.
async fn readiness(State(state): State<ProbeState>) -> StatusCode {
    status_for(state.health.is_ready())
}

/// Metrics handler
///
/// Render failures become a bare 500; the error stops here.
async fn metrics(State(state): State<ProbeState>) -> Response {
    let content_type = [(CONTENT_TYPE, state.registry.content_type().to_string())];
    match state.registry.render().await {
        Ok(body) => (content_type, body).into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, content_type).into_response(),
    }
}

fn build_router(state: ProbeState) -> Router {
    Router::new()
        .route("/liveness", get(liveness))
        .route("/readiness", get(readiness))
        .route("/metrics", get(self::metrics))
        .with_state(state)
}

/// Health and metrics endpoint for a host application
///
/// Starts live but not ready. Probes are only reachable over the network
/// after `start`; `router()` exposes them in-process at any time.
pub struct ProbeServer {
    health: ApplicationState,
    logger: Arc<dyn InfoLogger>,
    router: Router,
    lifecycle: Lifecycle,
    drain_timeout: Duration,
}

impl ProbeServer {
    /// Create a probe server logging through `tracing` and exposing the
    /// global prometheus registry
    ///
    /// Lifecycle lines only reach stdout if the host installs a subscriber,
    /// e.g. `tracing_subscriber::fmt().init()`. Without one they are dropped.
    pub fn new() -> Self {
        Self::with_logger(Arc::new(TracingLogger))
    }

    pub fn with_logger(logger: Arc<dyn InfoLogger>) -> Self {
        Self::with_registry(logger, Arc::new(PrometheusRegistry::default()))
    }

    pub fn with_registry(logger: Arc<dyn InfoLogger>, registry: Arc<dyn MetricsRegistry>) -> Self {
        let health = ApplicationState::new();
        let router = build_router(ProbeState {
            health: health.clone(),
            registry,
        });

        Self {
            health,
            logger,
            router,
            lifecycle: Lifecycle::new(),
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    /// Bound how long `stop` waits for open connections before aborting them
    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// The probe router, for mounting elsewhere or in-process requests
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Readiness probe returns 200 from now on
    ///
    /// Call as the last step of startup, or when unavailable
    /// dependencies come back.
    pub fn signal_ready(&self) {
        self.health.signal_ready();
    }

    /// Readiness probe returns 500 from now on; liveness is untouched
    ///
    /// Call as the first step of shutdown, or when dependencies become
    /// unavailable. The orchestrator stops sending traffic but does not
    /// restart the process.
    pub fn signal_not_ready(&self) {
        self.health.signal_not_ready();
    }

    /// Liveness and readiness probes both return 500 from now on
    ///
    /// Call just before `stop`. Metrics stay available until the
    /// listener closes.
    pub fn signal_stopped(&self) {
        self.health.signal_stopped();
    }

    pub fn is_live(&self) -> bool {
        self.health.is_live()
    }

    pub fn is_ready(&self) -> bool {
        self.health.is_ready()
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.lifecycle.phase()
    }

    /// Bound address while started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.lifecycle.local_addr()
    }

    /// Make the probes available on `port` (0 picks a free port)
    ///
    /// Fails with `AlreadyStarted` before awaiting anything if this server
    /// was ever started. A bind failure leaves the server unstarted.
    pub async fn start(&self, port: u16) -> Result<&Self, LifecycleError> {
        let pending = self.lifecycle.claim_start()?;
        self.logger.info("Service telemetry starting...");

        let bind = |source| LifecycleError::Bind { port, source };
        let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port)))
            .await
            .map_err(bind)?;
        let addr = listener.local_addr().map_err(bind)?;

        let (trigger, signal) = stop_channel();
        let app = self.router();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(signal.wait())
                .await
        });

        pending.commit(Listener {
            addr,
            trigger,
            task,
        });
        self.logger
            .info(&format!("Service telemetry is up on {}", addr.port()));
        Ok(self)
    }

    /// Withdraw the probes
    ///
    /// Does not change liveness/readiness; call `signal_stopped` first so
    /// probes report termination while the listener drains. Connections
    /// still open after the drain timeout are cut.
    pub async fn stop(&self) -> Result<(), LifecycleError> {
        let Listener {
            addr,
            trigger,
            mut task,
        } = self.lifecycle.claim_stop()?;
        self.logger.info("Service telemetry stopping...");

        trigger.trigger();
        match tokio::time::timeout(self.drain_timeout, &mut task).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => warn!(error = %e, addr = %addr, "Probe listener failed"),
            Ok(Err(e)) => warn!(error = %e, addr = %addr, "Probe listener task aborted"),
            Err(_) => {
                warn!(
                    addr = %addr,
                    timeout_ms = self.drain_timeout.as_millis() as u64,
                    "Probe listener did not drain in time, aborting open connections"
                );
                task.abort();
                // Cancelled join; the listener socket is released once it resolves.
                let _ = task.await;
            }
        }

        self.logger.info("Service telemetry is stopped");
        Ok(())
    }
}

impl Default for ProbeServer {
    fn default() -> Self {
        Self::new()
    }
}
