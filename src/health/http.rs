//! HTTP transport for health and load probes.

use futures_util::future::{BoxFuture, FutureExt};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::health::{HealthProbe, LoadProbe, LoadReport, ProbeError};
use crate::load_balancer::server::ServerDescriptor;

/// Path of the liveness endpoint on every storage server.
pub const HEALTH_PATH: &str = "/health";
/// Path of the load endpoint on every storage server.
pub const LOAD_PATH: &str = "/load";

/// Probes servers over HTTP with a shared client.
///
/// Deadlines are applied by the callers (`check`, `load_of`), not here.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: String) -> Result<reqwest::Response, ProbeError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status.as_u16()));
        }
        Ok(response)
    }

    async fn fetch_load(&self, server: &ServerDescriptor) -> Result<LoadReport, ProbeError> {
        let response = self.get(server.endpoint(LOAD_PATH)).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ProbeError::Malformed(e.to_string()))
    }
}

impl HealthProbe for HttpProbe {
    fn probe_health<'a>(&'a self, server: &'a ServerDescriptor) -> BoxFuture<'a, Result<(), ProbeError>> {
        async move {
            self.get(server.endpoint(HEALTH_PATH)).await?;
            Ok(())
        }
        .boxed()
    }
}

impl LoadProbe for HttpProbe {
    fn probe_load<'a>(&'a self, server: &'a ServerDescriptor) -> BoxFuture<'a, Result<LoadReport, ProbeError>> {
        self.fetch_load(server).boxed()
    }
}

/// Build the process-wide HTTP client shared by probes and geolocation.
pub fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("pomf-router/", env!("CARGO_PKG_VERSION"))),
    );
    reqwest::Client::builder().default_headers(headers).build()
}
