//! Backend probing subsystem.
//!
//! # Data Flow
//! ```text
//! Health probe (active.rs):
//!     GET {base}/health under a deadline
//!     → Healthy | Unhealthy
//!
//! Load probe (load.rs):
//!     GET {base}/load under a deadline
//!     → uploads + downloads | +INFINITY
//!
//! Transport (http.rs):
//!     One shared reqwest client issues both probes
//! ```
//!
//! # Design Decisions
//! - Probes are request-scoped: nothing is cached between selections
//! - The deadline wraps the whole probe future, so a late response is
//!   dropped with it and can never change a settled result
//! - Every failure folds into a sentinel; callers never see probe errors

pub mod active;
pub mod http;
pub mod load;

use std::sync::Arc;
use std::time::Duration;
use futures_util::future::BoxFuture;
use serde::Deserialize;
use thiserror::Error;

use crate::load_balancer::server::ServerDescriptor;

pub use active::check;
pub use http::HttpProbe;
pub use load::load_of;

/// Outcome of a liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// Why a probe did not produce a usable answer.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ProbeError {
    /// Short label used in metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::Timeout(_) => "timeout",
            ProbeError::Network(_) => "network",
            ProbeError::Status(_) => "status",
            ProbeError::Malformed(_) => "malformed",
        }
    }
}

/// Body of a backend's `/load` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LoadReport {
    pub uploads: f64,
    pub downloads: f64,
}

impl LoadReport {
    /// Active uploads plus active downloads.
    pub fn total(&self) -> f64 {
        self.uploads + self.downloads
    }
}

/// One server's load as seen by a single selection.
#[derive(Debug)]
pub struct ProbeResult {
    pub server: Arc<ServerDescriptor>,
    /// `f64::INFINITY` when the probe failed.
    pub metric: f64,
    pub error: Option<ProbeError>,
}

impl ProbeResult {
    pub fn reachable(&self) -> bool {
        self.metric.is_finite()
    }
}

/// Liveness check against one server, without a deadline.
pub trait HealthProbe: Send + Sync {
    fn probe_health<'a>(&'a self, server: &'a ServerDescriptor) -> BoxFuture<'a, Result<(), ProbeError>>;
}

/// Load query against one server, without a deadline.
pub trait LoadProbe: Send + Sync {
    fn probe_load<'a>(&'a self, server: &'a ServerDescriptor) -> BoxFuture<'a, Result<LoadReport, ProbeError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_report_total() {
        let report: LoadReport = serde_json::from_str(r#"{"uploads": 3, "downloads": 4}"#).unwrap();
        assert_eq!(report.total(), 7.0);
    }

    #[test]
    fn test_load_report_requires_both_fields() {
        assert!(serde_json::from_str::<LoadReport>(r#"{"uploads": 3}"#).is_err());
        assert!(serde_json::from_str::<LoadReport>(r#"{"uploads": "3", "downloads": 1}"#).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = ProbeError::Timeout(Duration::from_millis(2000));
        assert_eq!(err.to_string(), "probe timed out after 2s");
        assert_eq!(err.kind(), "timeout");
        assert_eq!(ProbeError::Status(503).to_string(), "unexpected status 503");
    }
}
