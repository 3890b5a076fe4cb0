//! Server settings.

use connector_common::{ConfigError, EnvSource, TracingConfig};
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

/// Default public API endpoint advertised in EDRs.
pub const DEFAULT_PUBLIC_API_URL: &str = "http://localhost:8185/api/v2/public";

/// Settings of the `dataplane-signaling` server.
#[derive(Debug, Clone)]
pub struct SignalingApiSettings {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Public API endpoint advertised in EDRs
    pub public_api_url: Url,
    /// Time allowed for in-flight requests on shutdown
    pub shutdown_timeout: Duration,
    /// Logging
    pub tracing: TracingConfig,
}

impl SignalingApiSettings {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&EnvSource::process())
    }

    /// Load from an arbitrary source.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is set but malformed.
    pub fn from_source(env: &EnvSource<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: env.string("SIGNALING_HOST", "0.0.0.0"),
            port: env.parse("SIGNALING_PORT", 8183)?,
            public_api_url: env.url("SIGNALING_PUBLIC_API_URL", Some(DEFAULT_PUBLIC_API_URL))?,
            shutdown_timeout: env.seconds("SIGNALING_SHUTDOWN_TIMEOUT", 30)?,
            tracing: TracingConfig::from_source(env, "dataplane-signaling")?,
        })
    }

    /// Address to bind.
    ///
    /// # Errors
    ///
    /// Returns an error when host and port do not form a socket address.
    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::invalid_value("SIGNALING_HOST", "not a valid IP address"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<SignalingApiSettings, ConfigError> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        SignalingApiSettings::from_source(&EnvSource::from_map(&values))
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&[]).unwrap();

        assert_eq!(settings.bind_address().unwrap().to_string(), "0.0.0.0:8183");
        assert_eq!(settings.public_api_url.as_str(), DEFAULT_PUBLIC_API_URL);
        assert_eq!(settings.shutdown_timeout, Duration::from_secs(30));
        assert_eq!(settings.tracing.service_name, "dataplane-signaling");
    }

    #[test]
    fn test_overrides() {
        let settings = settings(&[
            ("SIGNALING_HOST", "127.0.0.1"),
            ("SIGNALING_PORT", "9191"),
            ("SIGNALING_PUBLIC_API_URL", "https://dp.example.com/public"),
            ("LOG_JSON", "true"),
        ])
        .unwrap();

        assert_eq!(settings.bind_address().unwrap().to_string(), "127.0.0.1:9191");
        assert_eq!(settings.public_api_url.host_str(), Some("dp.example.com"));
        assert!(settings.tracing.json_output);
    }

    #[test]
    fn test_invalid_values() {
        assert!(settings(&[("SIGNALING_PORT", "70000")]).is_err());
        assert!(settings(&[("SIGNALING_PUBLIC_API_URL", "not a url")]).is_err());
        assert!(
            settings(&[("SIGNALING_HOST", "example.com")])
                .unwrap()
                .bind_address()
                .is_err()
        );
    }
}
