//! Active health checking.
//!
//! # Responsibilities
//! - Probe a single server's `/health` endpoint under a deadline
//! - Map every failure mode to `Unhealthy`

use std::time::{Duration, Instant};
use tokio::time;

use crate::health::{HealthProbe, HealthStatus, ProbeError};
use crate::load_balancer::server::ServerDescriptor;
use crate::observability::metrics;

/// Check one server's liveness. Never fails: errors and timeouts are `Unhealthy`.
pub async fn check(probe: &dyn HealthProbe, server: &ServerDescriptor, timeout: Duration) -> HealthStatus {
    let started = Instant::now();

    let outcome = match time::timeout(timeout, probe.probe_health(server)).await {
        Ok(result) => result,
        Err(_) => Err(ProbeError::Timeout(timeout)),
    };

    match outcome {
        Ok(()) => {
            tracing::debug!(server = %server.name, "Health check passed");
            metrics::record_probe("health", &server.name, "ok", started.elapsed());
            HealthStatus::Healthy
        }
        Err(e) => {
            tracing::warn!(server = %server.name, error = %e, "Health check failed");
            metrics::record_probe("health", &server.name, e.kind(), started.elapsed());
            HealthStatus::Unhealthy
        }
    }
}
