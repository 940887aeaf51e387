//! Host configuration for the probe binary
//!
//! The probe server itself reads no environment; the binary resolves the
//! port here and passes it to `ProbeServer::start`.

use thiserror::Error;

/// Environment variable holding the probe port
pub const PORT_ENV: &str = "TELEMETRY_PORT";

/// Default port for probe endpoints
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid TELEMETRY_PORT '{value}': {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Probe binary configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub port: u16,
}

impl ProbeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = std::env::var(PORT_ENV).ok();
        Ok(Self {
            port: parse_port(port.as_deref())?,
        })
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

/// Parse a port value, falling back to `DEFAULT_PORT` when unset or blank
fn parse_port(value: Option<&str>) -> Result<u16, ConfigError> {
    match value.map(str::trim) {
        None | Some("") => Ok(DEFAULT_PORT),
        Some(raw) => raw.parse().map_err(|source| ConfigError::InvalidPort {
            value: raw.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    // Env var behavior is left to from_env; tests exercise the parser to
    // avoid races between parallel tests sharing the process environment.

    #[test]
    fn test_unset_port_uses_default() {
        assert_eq!(parse_port(None).expect("default port"), DEFAULT_PORT);
    }

    #[test]
    fn test_blank_port_uses_default() {
        assert_eq!(parse_port(Some("  ")).expect("default port"), DEFAULT_PORT);
    }

    #[test]
    fn test_valid_port_is_parsed() {
        assert_eq!(parse_port(Some("9464")).expect("valid port"), 9464);
        assert_eq!(parse_port(Some(" 9090 ")).expect("trimmed port"), 9090);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = parse_port(Some("not-a-port")).expect_err("should reject text");
        assert!(matches!(err, ConfigError::InvalidPort { ref value, .. } if value == "not-a-port"));
        assert!(err.to_string().contains(PORT_ENV));
    }

    #[test]
    fn test_out_of_range_port_is_rejected() {
        assert!(parse_port(Some("70000")).is_err());
    }

    #[test]
    fn test_default_config() {
        assert_eq!(ProbeConfig::default().port, DEFAULT_PORT);
    }
}
