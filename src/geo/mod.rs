//! Client geolocation.
//!
//! # Data Flow
//! ```text
//! X-Forwarded-For (or "unknown")
//!     → ClientOrigin { ip, location: None }
//!     → GeoLocator::locate (only under the nearest strategy)
//!     → ClientOrigin { ip, location: Some(lat, lon) }
//! ```
//!
//! # Design Decisions
//! - The lookup service is an external collaborator behind a trait
//! - A failed lookup is never an error for the caller; the origin simply
//!   stays unresolved and selection falls back to the default server

pub mod ip_api;

use std::time::Duration;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ip_api::IpApiLocator;

/// IP placeholder used when no forwarded-for header is present.
pub const UNKNOWN_IP: &str = "unknown";

/// A point on the globe in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Where a request appears to come from. Lives for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOrigin {
    pub ip: String,
    pub location: Option<Coordinates>,
}

impl ClientOrigin {
    /// An origin with no resolved location.
    pub fn from_ip(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            location: None,
        }
    }

    pub fn unknown() -> Self {
        Self::from_ip(UNKNOWN_IP)
    }

    pub fn with_location(mut self, location: Coordinates) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is_unknown(&self) -> bool {
        self.ip == UNKNOWN_IP
    }
}

/// Errors from a geolocation lookup.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("geolocation lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("geolocation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("geolocation lookup failed: {0}")]
    Lookup(String),
}

/// Resolves an IP address to coordinates.
pub trait GeoLocator: Send + Sync {
    fn locate<'a>(&'a self, ip: &'a str) -> BoxFuture<'a, Result<Coordinates, GeoError>>;
}
