//! Server pool management.
//!
//! # Responsibilities
//! - Hold the ordered list of candidate servers
//! - Enforce unique names and a non-empty pool
//! - Designate the last-resort default server

use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

use crate::config::RouterConfig;
use crate::load_balancer::server::ServerDescriptor;

/// Errors raised while building a pool. All of them are fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("server pool is empty")]
    Empty,

    #[error("duplicate server name '{0}'")]
    DuplicateName(String),

    #[error("default server '{0}' is not in the pool")]
    UnknownDefault(String),
}

/// Ordered, read-only registry of candidate servers.
///
/// Order is the fallback priority and the tie-break order for selection.
#[derive(Debug, Clone)]
pub struct ServerPool {
    servers: Vec<Arc<ServerDescriptor>>,
    default_index: usize,
}

impl ServerPool {
    /// Build a pool. The default is `default_name`, or the first server.
    pub fn new(
        servers: Vec<ServerDescriptor>,
        default_name: Option<&str>,
    ) -> Result<Self, PoolError> {
        if servers.is_empty() {
            return Err(PoolError::Empty);
        }

        let mut names = HashSet::new();
        for server in &servers {
            if !names.insert(server.name.as_str()) {
                return Err(PoolError::DuplicateName(server.name.clone()));
            }
        }

        let default_index = match default_name {
            Some(name) => servers
                .iter()
                .position(|s| s.name == name)
                .ok_or_else(|| PoolError::UnknownDefault(name.to_string()))?,
            None => 0,
        };

        Ok(Self {
            servers: servers.into_iter().map(Arc::new).collect(),
            default_index,
        })
    }

    /// Build the pool described by a configuration.
    pub fn from_config(config: &RouterConfig) -> Result<Self, PoolError> {
        let servers = config.servers.iter().map(ServerDescriptor::from).collect();
        Self::new(servers, config.routing.default_server.as_deref())
    }

    /// All servers in configured order.
    pub fn all(&self) -> &[Arc<ServerDescriptor>] {
        &self.servers
    }

    /// The last-resort server.
    pub fn default(&self) -> &Arc<ServerDescriptor> {
        &self.servers[self.default_index]
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ServerDescriptor>> {
        self.servers.iter().find(|s| s.name == name)
    }

    pub fn is_default(&self, server: &ServerDescriptor) -> bool {
        self.default().name == server.name
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Always false for a constructed pool.
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
