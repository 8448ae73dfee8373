//! Download router for a pomf-style file host.
//!
//! Picks one storage server per retrieval request and redirects the client
//! to it.

pub mod config;
pub mod geo;
pub mod http;
pub mod routing;
pub mod health;
pub mod load_balancer;
pub mod lifecycle;
pub mod observability;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::schema::RouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RequestRouter;
