//! Metrics registry collaborator for the `/metrics` endpoint
//!
//! The probe server only needs two things from a registry: the content type
//! of its exposition format and an async render of the current values.
//! `PrometheusRegistry` provides both on top of the `prometheus` crate.

use async_trait::async_trait;
use prometheus::{Encoder, Registry, TextEncoder};
use thiserror::Error;

/// Errors raised while rendering metrics
///
/// The probe server converts all of these into a bare 500.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Prometheus registry error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("Encoded metrics are not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Metrics render worker failed: {0}")]
    Worker(String),

    #[error("Collector error: {0}")]
    Collector(String),
}

/// A source of rendered metrics text
#[async_trait]
pub trait MetricsRegistry: Send + Sync {
    /// Content type of the exposition format produced by `render`
    fn content_type(&self) -> &str;

    /// Render all metrics in exposition format
    async fn render(&self) -> Result<String, MetricsError>;
}

/// Prometheus registry rendered in text exposition format
#[derive(Clone)]
pub struct PrometheusRegistry {
    registry: Registry,
}

impl PrometheusRegistry {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// The wrapped registry, for registering collectors
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for PrometheusRegistry {
    /// Wrap the process-global registry used by the `register_*!` macros
    fn default() -> Self {
        Self::new(prometheus::default_registry().clone())
    }
}

/// Gather and encode a registry into text format
fn encode_text(registry: &Registry) -> Result<String, MetricsError> {
    let families = registry.gather();
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[async_trait]
impl MetricsRegistry for PrometheusRegistry {
    fn content_type(&self) -> &str {
        prometheus::TEXT_FORMAT
    }

    /// Gathering walks every collector, so it runs on the blocking pool
    async fn render(&self) -> Result<String, MetricsError> {
        let registry = self.registry.clone();
        tokio::task::spawn_blocking(move || encode_text(&registry))
            .await
            .map_err(|e| MetricsError::Worker(e.to_string()))?
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use prometheus::{IntCounter, IntGauge, Opts};

    #[test]
    fn test_content_type_is_text_format() {
        let registry = PrometheusRegistry::new(Registry::new());
        assert!(registry.content_type().starts_with("text/plain"));
        assert!(registry.content_type().contains("version=0.0.4"));
    }

    #[tokio::test]
    async fn test_render_empty_registry() {
        let registry = PrometheusRegistry::new(Registry::new());

        let body = registry.render().await.expect("empty registry should render");

        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_render_includes_registered_metrics() {
        let registry = PrometheusRegistry::new(Registry::new());
        let counter = IntCounter::with_opts(Opts::new("jobs_processed_total", "Jobs processed"))
            .expect("valid counter opts");
        let gauge =
            IntGauge::with_opts(Opts::new("queue_depth", "Queued jobs")).expect("valid gauge opts");
        registry
            .registry()
            .register(Box::new(counter.clone()))
            .expect("register counter");
        registry
            .registry()
            .register(Box::new(gauge.clone()))
            .expect("register gauge");

        counter.inc_by(3);
        gauge.set(7);

        let body = registry.render().await.expect("render should succeed");

        assert!(body.contains("# HELP jobs_processed_total Jobs processed"));
        assert!(body.contains("# TYPE jobs_processed_total counter"));
        assert!(body.contains("jobs_processed_total 3"));
        assert!(body.contains("# TYPE queue_depth gauge"));
        assert!(body.contains("queue_depth 7"));
    }

    #[test]
    fn test_duplicate_registration_is_a_registry_error() {
        let registry = PrometheusRegistry::new(Registry::new());
        let first = IntCounter::new("dup_total", "dup").expect("valid counter");
        let second = IntCounter::new("dup_total", "dup").expect("valid counter");

        registry
            .registry()
            .register(Box::new(first))
            .expect("first registration");
        let err = registry
            .registry()
            .register(Box::new(second))
            .expect_err("duplicate registration should fail");

        let metrics_err = MetricsError::from(err);
        assert!(matches!(metrics_err, MetricsError::Prometheus(_)));
    }
}
