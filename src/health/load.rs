//! Load probing.
//!
//! # Responsibilities
//! - Query a server's `/load` endpoint under a deadline
//! - Fan out one probe per pool member and join them at a single barrier
//!
//! # Design Decisions
//! - A failed probe reports `+INFINITY`, so it can only be chosen when
//!   every server failed the same way (and then the default wins instead)
//! - No early exit: comparing loads needs the full snapshot

use std::sync::Arc;
use std::time::{Duration, Instant};
use futures_util::future::join_all;
use tokio::time;

use crate::health::{LoadProbe, ProbeError, ProbeResult};
use crate::load_balancer::pool::ServerPool;
use crate::load_balancer::server::ServerDescriptor;
use crate::observability::metrics;

/// Probe one server's load. Never fails: errors and timeouts yield `+INFINITY`.
pub async fn load_of(probe: &dyn LoadProbe, server: Arc<ServerDescriptor>, timeout: Duration) -> ProbeResult {
    let started = Instant::now();

    let outcome = match time::timeout(timeout, probe.probe_load(&server)).await {
        Ok(Ok(report)) if report.total().is_finite() => Ok(report.total()),
        Ok(Ok(report)) => Err(ProbeError::Malformed(format!(
            "non-finite load (uploads={}, downloads={})",
            report.uploads, report.downloads
        ))),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(ProbeError::Timeout(timeout)),
    };

    match outcome {
        Ok(metric) => {
            tracing::debug!(server = %server.name, load = metric, "Load probe succeeded");
            metrics::record_probe("load", &server.name, "ok", started.elapsed());
            ProbeResult {
                server,
                metric,
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!(server = %server.name, error = %e, "Load probe failed");
            metrics::record_probe("load", &server.name, e.kind(), started.elapsed());
            ProbeResult {
                server,
                metric: f64::INFINITY,
                error: Some(e),
            }
        }
    }
}

/// Probe every server concurrently. Results are in pool order.
///
/// Completes once all probes settle, which is bounded by `timeout` rather
/// than by the pool size.
pub async fn probe_all(probe: &dyn LoadProbe, pool: &ServerPool, timeout: Duration) -> Vec<ProbeResult> {
    join_all(
        pool.all()
            .iter()
            .map(|server| load_of(probe, server.clone(), timeout)),
    )
    .await
}
