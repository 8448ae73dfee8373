//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Candidate storage servers, in fallback priority order.
    pub servers: Vec<ServerConfig>,

    /// Server selection settings.
    pub routing: RoutingConfig,

    /// Client geolocation lookup.
    pub geolocation: GeolocationConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            servers: vec![ServerConfig {
                name: "NO1".to_string(),
                url: "https://pomf1.080609.xyz".to_string(),
                lat: Some(59.2083),
                lon: Some(10.9484),
            }],
            routing: RoutingConfig::default(),
            geolocation: GeolocationConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// A single backend storage server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Unique server identifier.
    pub name: String,

    /// Base URL (e.g., "https://pomf1.example").
    pub url: String,

    /// Latitude in degrees.
    #[serde(default)]
    pub lat: Option<f64>,

    /// Longitude in degrees.
    #[serde(default)]
    pub lon: Option<f64>,
}

/// Which selection strategy the router runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Probe every server's load and pick the least loaded.
    #[default]
    LeastLoad,
    /// Pick the server closest to the client, confirmed by a health check.
    Nearest,
}

impl SelectionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionStrategy::LeastLoad => "least_load",
            SelectionStrategy::Nearest => "nearest",
        }
    }
}

/// Server selection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Active selection strategy.
    pub strategy: SelectionStrategy,

    /// Name of the last-resort server. First configured server when unset.
    pub default_server: Option<String>,

    /// Deadline for each `/load` probe in milliseconds.
    pub probe_timeout_ms: u64,

    /// Deadline for each `/health` probe in milliseconds.
    pub health_timeout_ms: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            strategy: SelectionStrategy::LeastLoad,
            default_server: None,
            probe_timeout_ms: 2000,
            health_timeout_ms: 2000,
        }
    }
}

/// IP geolocation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeolocationConfig {
    /// Lookup endpoint; the client IP is appended as a path segment.
    pub endpoint: String,

    /// Lookup timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://ip-api.com/json".to_string(),
            timeout_ms: 2000,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time to answer a client) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: RouterConfig = toml::from_str(
            r#"
            [[servers]]
            name = "a"
            url = "http://127.0.0.1:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.servers.len(), 1);
        assert_eq!(config.servers[0].lat, None);
        assert_eq!(config.routing.strategy, SelectionStrategy::LeastLoad);
        assert_eq!(config.routing.probe_timeout_ms, 2000);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_strategy_names() {
        let config: RouterConfig = toml::from_str(
            r#"
            [routing]
            strategy = "nearest"
            default_server = "NO1"
            "#,
        )
        .unwrap();

        assert_eq!(config.routing.strategy, SelectionStrategy::Nearest);
        assert_eq!(config.routing.default_server.as_deref(), Some("NO1"));
        assert_eq!(config.routing.strategy.as_str(), "nearest");
        // Omitted servers fall back to the built-in primary.
        assert_eq!(config.servers[0].name, "NO1");
    }
}
