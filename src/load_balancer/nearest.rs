//! Nearest-server selection strategy.
//!
//! # Design Decisions
//! - Only the nearest server is health checked
//! - If it is unhealthy, the next server in the ranking with a different
//!   base URL is taken as-is: a single hop, never a search down the list

use std::sync::Arc;
use std::time::Duration;

use crate::geo::ClientOrigin;
use crate::health::{check, HealthProbe};
use crate::load_balancer::distance::DistanceRanker;
use crate::load_balancer::pool::ServerPool;
use crate::load_balancer::{Selection, SelectionReason};

fn default_selection(pool: &ServerPool, reason: SelectionReason) -> Selection {
    Selection {
        server: Arc::clone(pool.default()),
        reason,
    }
}

pub async fn select(
    probe: &dyn HealthProbe,
    pool: &ServerPool,
    origin: &ClientOrigin,
    timeout: Duration,
) -> Selection {
    let Some(location) = origin.location else {
        tracing::debug!(ip = %origin.ip, "Client location unknown, using default server");
        return default_selection(pool, SelectionReason::OriginUnresolved);
    };

    let ranked = DistanceRanker::closest(location, pool);
    let Some(nearest) = ranked.first() else {
        return default_selection(pool, SelectionReason::OriginUnresolved);
    };

    if check(probe, nearest, timeout).await.is_healthy() {
        return Selection {
            server: Arc::clone(nearest),
            reason: SelectionReason::Nearest,
        };
    }

    match ranked.iter().skip(1).find(|s| s.base_url != nearest.base_url) {
        Some(fallback) => {
            tracing::warn!(
                unhealthy = %nearest.name,
                fallback = %fallback.name,
                "Nearest server unhealthy, falling back to next nearest"
            );
            Selection {
                server: Arc::clone(fallback),
                reason: SelectionReason::NearestFallback,
            }
        }
        None => {
            tracing::warn!(
                unhealthy = %nearest.name,
                "Nearest server unhealthy and no alternative, using default server"
            );
            default_selection(pool, SelectionReason::NoAlternative)
        }
    }
}
