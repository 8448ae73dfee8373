//! Request routing: from a retrieval request to a redirect target.
//!
//! # Responsibilities
//! - Resolve the client's origin (geolocation only when it matters)
//! - Run the selection policy against the pool
//! - Format the redirect URL on the chosen server
//!
//! # Design Decisions
//! - Immutable after construction; a config reload builds a new router
//! - An empty pool cannot be constructed, so routing always yields a server

use std::sync::Arc;
use serde::Deserialize;
use url::form_urlencoded::byte_serialize;

use crate::config::{RouterConfig, SelectionStrategy};
use crate::geo::{ClientOrigin, GeoLocator, IpApiLocator};
use crate::health::HttpProbe;
use crate::load_balancer::{PoolError, SelectionPolicy, SelectionReason, ServerDescriptor, ServerPool};

/// Download path on every storage server.
pub const RETRIEVAL_PATH: &str = "/get2/";

fn default_hash() -> String {
    "0".to_string()
}

fn default_ext() -> String {
    "bin".to_string()
}

fn default_filename() -> String {
    "file.bin".to_string()
}

/// The file a client asked for, as carried in the `h`, `e`, `f` query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RetrievalRequest {
    #[serde(rename = "h", default = "default_hash")]
    pub hash: String,
    #[serde(rename = "e", default = "default_ext")]
    pub ext: String,
    #[serde(rename = "f", default = "default_filename")]
    pub filename: String,
}

impl RetrievalRequest {
    pub fn new(hash: impl Into<String>, ext: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            ext: ext.into(),
            filename: filename.into(),
        }
    }
}

impl Default for RetrievalRequest {
    fn default() -> Self {
        Self::new(default_hash(), default_ext(), default_filename())
    }
}

/// Terminal output of one routing call.
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    pub chosen: Arc<ServerDescriptor>,
    pub redirect_url: String,
    pub reason: SelectionReason,
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

/// `{base}/get2/?h={hash}&e={ext}&f={filename}` with form-encoded values.
pub fn redirect_url(server: &ServerDescriptor, request: &RetrievalRequest) -> String {
    format!(
        "{}?h={}&e={}&f={}",
        server.endpoint(RETRIEVAL_PATH),
        encode(&request.hash),
        encode(&request.ext),
        encode(&request.filename)
    )
}

/// Entry point for routing retrieval requests.
pub struct RequestRouter {
    pool: ServerPool,
    policy: SelectionPolicy,
    locator: Arc<dyn GeoLocator>,
}

impl RequestRouter {
    pub fn new(pool: ServerPool, policy: SelectionPolicy, locator: Arc<dyn GeoLocator>) -> Self {
        Self { pool, policy, locator }
    }

    /// Build a router wired to real HTTP probes and ip-api geolocation.
    pub fn from_config(config: &RouterConfig, client: reqwest::Client) -> Result<Self, PoolError> {
        let pool = ServerPool::from_config(config)?;
        let probe = Arc::new(HttpProbe::new(client.clone()));
        let policy = SelectionPolicy::from_config(&config.routing, probe.clone(), probe);
        let locator = Arc::new(IpApiLocator::new(client, &config.geolocation));
        Ok(Self::new(pool, policy, locator))
    }

    pub fn pool(&self) -> &ServerPool {
        &self.pool
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    /// Origin for a client IP. Looks the IP up only under the nearest strategy.
    pub async fn resolve_origin(&self, ip: &str) -> ClientOrigin {
        let origin = ClientOrigin::from_ip(ip);
        if origin.is_unknown() || self.policy.strategy() != SelectionStrategy::Nearest {
            return origin;
        }

        match self.locator.locate(ip).await {
            Ok(location) => origin.with_location(location),
            Err(e) => {
                tracing::warn!(ip = %ip, error = %e, "Client geolocation failed");
                origin
            }
        }
    }

    /// Choose a server for the request and build its redirect target.
    pub async fn route(&self, request: &RetrievalRequest, origin: &ClientOrigin) -> RoutingDecision {
        let selection = self.policy.select(&self.pool, origin).await;
        let redirect_url = redirect_url(&selection.server, request);

        tracing::info!(
            hash = %request.hash,
            server = %selection.server.name,
            reason = selection.reason.as_str(),
            client_ip = %origin.ip,
            "Routed retrieval request"
        );

        RoutingDecision {
            chosen: selection.server,
            redirect_url,
            reason: selection.reason,
        }
    }
}
