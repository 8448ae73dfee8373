//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration (file or built-in default)
//! - Classify fatal startup failures
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, including an empty pool
//! - Listeners start last (traffic only when ready)

use std::path::Path;
use thiserror::Error;

use crate::config::loader::{load_config, ConfigError};
use crate::config::validation::validate_config;
use crate::config::RouterConfig;
use crate::load_balancer::PoolError;

/// Reasons the router cannot start.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("server pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration from `path`, or the validated built-in default.
pub fn resolve_config(path: Option<&Path>) -> Result<RouterConfig, StartupError> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => {
            let config = RouterConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_when_no_path() {
        let config = resolve_config(None).unwrap();
        assert_eq!(config.servers.len(), 1);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = resolve_config(Some(Path::new("/nonexistent/router.toml"))).unwrap_err();
        assert!(matches!(err, StartupError::Config(ConfigError::Io(_))));
        assert!(err.to_string().starts_with("configuration error: IO error"));
    }

    #[test]
    fn test_pool_error_display() {
        let err = StartupError::from(PoolError::Empty);
        assert_eq!(err.to_string(), "server pool error: server pool is empty");
    }
}
