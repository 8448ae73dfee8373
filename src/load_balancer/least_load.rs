//! Least-load selection strategy.

use std::sync::Arc;
use std::time::Duration;

use crate::health::{load::probe_all, LoadProbe, ProbeResult};
use crate::load_balancer::pool::ServerPool;
use crate::load_balancer::{Selection, SelectionReason};

/// The result with the strictly smallest finite load.
/// In case of tie, the first one in pool order is selected (stability).
/// `None` when every probe failed.
pub fn pick_least_loaded(results: &[ProbeResult]) -> Option<&ProbeResult> {
    let mut best: Option<&ProbeResult> = None;
    for result in results.iter().filter(|r| r.reachable()) {
        match best {
            Some(current) if result.metric >= current.metric => {}
            _ => best = Some(result),
        }
    }
    best
}

/// Probe the whole pool and pick the least loaded server, or the default
/// when no server answered.
pub async fn select(probe: &dyn LoadProbe, pool: &ServerPool, timeout: Duration) -> Selection {
    let results = probe_all(probe, pool, timeout).await;

    match pick_least_loaded(&results) {
        Some(best) => Selection {
            server: Arc::clone(&best.server),
            reason: SelectionReason::LeastLoaded { load: best.metric },
        },
        None => {
            tracing::warn!(
                servers = pool.len(),
                default = %pool.default().name,
                "Every load probe failed, using default server"
            );
            Selection {
                server: Arc::clone(pool.default()),
                reason: SelectionReason::AllProbesFailed,
            }
        }
    }
}
