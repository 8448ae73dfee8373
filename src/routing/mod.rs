//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Retrieval request (h, e, f) + client IP
//!     → router.rs resolve_origin (geolocation under nearest only)
//!     → SelectionPolicy (load_balancer)
//!     → router.rs redirect_url
//!     → RoutingDecision { chosen, redirect_url }
//! ```
//!
//! # Design Decisions
//! - Routers are built at startup (or reload), immutable at runtime
//! - Deterministic given the same probe answers
//! - Never a routing error at request time: the default server is the floor

pub mod router;

pub use router::{redirect_url, RequestRouter, RetrievalRequest, RoutingDecision};
