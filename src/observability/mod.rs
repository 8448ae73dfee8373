//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Probes, selection and HTTP handlers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (server, strategy, reason) on every decision
//! - Request ID from the x-request-id header is logged with each retrieval
//! - Metrics are optional; recording without a recorder is a no-op

pub mod logging;
pub mod metrics;
