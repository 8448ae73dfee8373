//! Backend server descriptor.
//!
//! # Responsibilities
//! - Represent a single candidate storage server
//! - Build probe and redirect URLs against its base URL

use std::fmt;
use crate::config::ServerConfig;
use crate::geo::Coordinates;

/// A single backend storage server. Immutable once the pool is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerDescriptor {
    /// Unique name within the pool.
    pub name: String,
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Geographic position, when known.
    pub location: Option<Coordinates>,
}

impl ServerDescriptor {
    /// Create a new descriptor. A trailing `/` on the base URL is dropped.
    pub fn new(name: impl Into<String>, base_url: impl AsRef<str>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            location: None,
        }
    }

    pub fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.location = Some(Coordinates::new(lat, lon));
        self
    }

    /// Absolute URL for a path on this server (`path` starts with `/`).
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl From<&ServerConfig> for ServerDescriptor {
    fn from(config: &ServerConfig) -> Self {
        let server = ServerDescriptor::new(config.name.clone(), &config.url);
        match (config.lat, config.lon) {
            (Some(lat), Some(lon)) => server.with_location(lat, lon),
            _ => server,
        }
    }
}

impl fmt::Display for ServerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.base_url)
    }
}
