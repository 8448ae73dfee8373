//! Server selection subsystem.
//!
//! # Data Flow
//! ```text
//! Retrieval request + ClientOrigin
//!     → pool.rs (read-only snapshot of candidate servers)
//!     → SelectionPolicy runs exactly one strategy:
//!         - least_load.rs (probe every /load concurrently, pick minimum)
//!         - nearest.rs (rank by distance.rs, confirm /health, one-hop fallback)
//!     → Selection (chosen server + reason)
//! ```
//!
//! # Design Decisions
//! - Policy is stateless; every selection re-probes from scratch
//! - Strategies are alternatives, never layered in one call
//! - Every path ends in a server: the pool's default is the last resort

pub mod distance;
pub mod least_load;
pub mod nearest;
pub mod pool;
pub mod server;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{RoutingConfig, SelectionStrategy};
use crate::geo::ClientOrigin;
use crate::health::{HealthProbe, LoadProbe};
use crate::observability::metrics;

pub use distance::DistanceRanker;
pub use pool::{PoolError, ServerPool};
pub use server::ServerDescriptor;

/// Which branch of a strategy produced the choice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionReason {
    /// Smallest reported load.
    LeastLoaded { load: f64 },
    /// No load probe succeeded.
    AllProbesFailed,
    /// Nearest server passed its health check.
    Nearest,
    /// Nearest server failed its health check; next distinct server taken.
    NearestFallback,
    /// Nearest server failed and no distinct server exists.
    NoAlternative,
    /// Client location unknown.
    OriginUnresolved,
}

impl SelectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionReason::LeastLoaded { .. } => "least_loaded",
            SelectionReason::AllProbesFailed => "all_probes_failed",
            SelectionReason::Nearest => "nearest",
            SelectionReason::NearestFallback => "nearest_fallback",
            SelectionReason::NoAlternative => "no_alternative",
            SelectionReason::OriginUnresolved => "origin_unresolved",
        }
    }

    /// True when the choice came from the default server rather than a signal.
    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            SelectionReason::AllProbesFailed
                | SelectionReason::NoAlternative
                | SelectionReason::OriginUnresolved
        )
    }
}

/// The outcome of one selection.
#[derive(Debug, Clone)]
pub struct Selection {
    pub server: Arc<ServerDescriptor>,
    pub reason: SelectionReason,
}

/// Composes probes and ranking into one decision per request.
#[derive(Clone)]
pub struct SelectionPolicy {
    strategy: SelectionStrategy,
    load_probe: Arc<dyn LoadProbe>,
    health_probe: Arc<dyn HealthProbe>,
    probe_timeout: Duration,
    health_timeout: Duration,
}

impl std::fmt::Debug for SelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionPolicy")
            .field("strategy", &self.strategy)
            .field("probe_timeout", &self.probe_timeout)
            .field("health_timeout", &self.health_timeout)
            .finish()
    }
}

impl SelectionPolicy {
    pub fn new(
        strategy: SelectionStrategy,
        load_probe: Arc<dyn LoadProbe>,
        health_probe: Arc<dyn HealthProbe>,
    ) -> Self {
        let defaults = RoutingConfig::default();
        Self {
            strategy,
            load_probe,
            health_probe,
            probe_timeout: Duration::from_millis(defaults.probe_timeout_ms),
            health_timeout: Duration::from_millis(defaults.health_timeout_ms),
        }
    }

    /// Build from routing configuration.
    pub fn from_config(
        config: &RoutingConfig,
        load_probe: Arc<dyn LoadProbe>,
        health_probe: Arc<dyn HealthProbe>,
    ) -> Self {
        Self::new(config.strategy, load_probe, health_probe)
            .with_probe_timeout(Duration::from_millis(config.probe_timeout_ms))
            .with_health_timeout(Duration::from_millis(config.health_timeout_ms))
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    pub fn load_probe(&self) -> &dyn LoadProbe {
        self.load_probe.as_ref()
    }

    /// Choose one server for a request.
    pub async fn select(&self, pool: &ServerPool, origin: &ClientOrigin) -> Selection {
        let selection = match self.strategy {
            SelectionStrategy::LeastLoad => {
                least_load::select(self.load_probe.as_ref(), pool, self.probe_timeout).await
            }
            SelectionStrategy::Nearest => {
                nearest::select(self.health_probe.as_ref(), pool, origin, self.health_timeout).await
            }
        };

        tracing::debug!(
            strategy = self.strategy.as_str(),
            server = %selection.server.name,
            reason = selection.reason.as_str(),
            fallback = selection.reason.is_fallback(),
            "Server selected"
        );
        metrics::record_selection(
            self.strategy.as_str(),
            &selection.server.name,
            selection.reason.as_str(),
        );

        selection
    }
}
