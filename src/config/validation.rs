//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (default server exists)
//! - Validate value ranges (timeouts > 0, coordinates in range, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use url::Url;

use crate::config::schema::RouterConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NoServers,
    EmptyServerName { index: usize },
    DuplicateServerName(String),
    InvalidServerUrl { name: String, reason: String },
    PartialCoordinates(String),
    CoordinatesOutOfRange(String),
    UnknownDefaultServer(String),
    ZeroTimeout(&'static str),
    InvalidAddress { field: &'static str, value: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NoServers => write!(f, "at least one server must be configured"),
            ValidationError::EmptyServerName { index } => {
                write!(f, "server #{} has an empty name", index)
            }
            ValidationError::DuplicateServerName(name) => {
                write!(f, "server name '{}' is used more than once", name)
            }
            ValidationError::InvalidServerUrl { name, reason } => {
                write!(f, "server '{}' has an invalid url: {}", name, reason)
            }
            ValidationError::PartialCoordinates(name) => {
                write!(f, "server '{}' must set both lat and lon or neither", name)
            }
            ValidationError::CoordinatesOutOfRange(name) => {
                write!(f, "server '{}' has coordinates out of range", name)
            }
            ValidationError::UnknownDefaultServer(name) => {
                write!(f, "default_server '{}' is not a configured server", name)
            }
            ValidationError::ZeroTimeout(field) => write!(f, "{} must be greater than zero", field),
            ValidationError::InvalidAddress { field, value } => {
                write!(f, "{} '{}' is not a valid socket address", field, value)
            }
        }
    }
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.servers.is_empty() {
        errors.push(ValidationError::NoServers);
    }

    let mut seen = HashSet::new();
    for (index, server) in config.servers.iter().enumerate() {
        if server.name.trim().is_empty() {
            errors.push(ValidationError::EmptyServerName { index });
        } else if !seen.insert(server.name.as_str()) {
            errors.push(ValidationError::DuplicateServerName(server.name.clone()));
        }

        match Url::parse(&server.url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError::InvalidServerUrl {
                name: server.name.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            }),
            Err(e) => errors.push(ValidationError::InvalidServerUrl {
                name: server.name.clone(),
                reason: e.to_string(),
            }),
        }

        match (server.lat, server.lon) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    errors.push(ValidationError::CoordinatesOutOfRange(server.name.clone()));
                }
            }
            (None, None) => {}
            _ => errors.push(ValidationError::PartialCoordinates(server.name.clone())),
        }
    }

    if let Some(default) = &config.routing.default_server {
        if !config.servers.iter().any(|s| &s.name == default) {
            errors.push(ValidationError::UnknownDefaultServer(default.clone()));
        }
    }

    if config.routing.probe_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("routing.probe_timeout_ms"));
    }
    if config.routing.health_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("routing.health_timeout_ms"));
    }
    if config.geolocation.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("geolocation.timeout_ms"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
