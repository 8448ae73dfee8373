//! Response construction.
//!
//! # Responsibilities
//! - Build the 301 redirect to the chosen storage server
//! - Shape the `/servers` probe snapshot

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::health::ProbeResult;
use crate::load_balancer::ServerPool;

/// `301 Moved Permanently` to `location`.
pub fn redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::error!(location = %location, "Redirect target is not a valid header value");
            (StatusCode::INTERNAL_SERVER_ERROR, "Invalid redirect target").into_response()
        }
    }
}

/// One row of the `/servers` snapshot.
#[derive(Debug, Serialize)]
pub struct ServerStatus {
    pub name: String,
    pub url: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub default: bool,
    /// `None` when the probe failed.
    pub load: Option<f64>,
    pub error: Option<String>,
}

impl ServerStatus {
    pub fn from_probe(pool: &ServerPool, result: &ProbeResult) -> Self {
        let server = &result.server;
        Self {
            name: server.name.clone(),
            url: server.base_url.clone(),
            lat: server.location.map(|l| l.lat),
            lon: server.location.map(|l| l.lon),
            default: pool.is_default(server),
            load: result.reachable().then_some(result.metric),
            error: result.error.as_ref().map(|e| e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::health::ProbeError;
    use crate::load_balancer::ServerDescriptor;

    #[test]
    fn test_redirect_response() {
        let response = redirect("https://pomf1.example/get2/?h=abc123&e=bin&f=file.bin");
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://pomf1.example/get2/?h=abc123&e=bin&f=file.bin"
        );
    }

    #[test]
    fn test_invalid_location() {
        let response = redirect("https://bad\nheader");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_status_of_failed_probe() {
        let pool = ServerPool::new(
            vec![ServerDescriptor::new("a", "http://a.example").with_location(1.0, 2.0)],
            None,
        )
        .unwrap();
        let result = ProbeResult {
            server: Arc::clone(pool.default()),
            metric: f64::INFINITY,
            error: Some(ProbeError::Status(503)),
        };

        let status = ServerStatus::from_probe(&pool, &result);
        assert!(status.default);
        assert_eq!(status.load, None);
        assert_eq!(status.lat, Some(1.0));
        assert_eq!(status.error.as_deref(), Some("unexpected status 503"));
    }
}
