//! ip-api.com geolocation client.

use std::time::Duration;
use futures_util::future::{BoxFuture, FutureExt};
use serde::Deserialize;
use tokio::time::timeout;
use url::Url;

use crate::config::GeolocationConfig;
use crate::geo::{Coordinates, GeoError, GeoLocator};

/// Response body of `GET {endpoint}/{ip}`.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl LookupResponse {
    fn into_coordinates(self) -> Result<Coordinates, GeoError> {
        if self.status.as_deref() == Some("fail") {
            return Err(GeoError::Lookup(
                self.message.unwrap_or_else(|| "lookup refused".to_string()),
            ));
        }
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Ok(Coordinates::new(lat, lon))
            }
            _ => Err(GeoError::Lookup("response carries no coordinates".to_string())),
        }
    }
}

/// Looks up client coordinates through an ip-api compatible service.
#[derive(Debug, Clone)]
pub struct IpApiLocator {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl IpApiLocator {
    pub fn new(client: reqwest::Client, config: &GeolocationConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// `{endpoint}/{ip}`, with the IP encoded as exactly one path segment.
    fn lookup_url(&self, ip: &str) -> Result<Url, GeoError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| GeoError::Lookup(format!("invalid endpoint {}: {}", self.endpoint, e)))?;
        url.path_segments_mut()
            .map_err(|_| GeoError::Lookup(format!("endpoint {} cannot take a path", self.endpoint)))?
            .pop_if_empty()
            .push(ip);
        Ok(url)
    }

    async fn lookup(&self, ip: &str) -> Result<Coordinates, GeoError> {
        let url = self.lookup_url(ip)?;
        let request = async {
            let response = self.client.get(url).send().await?.error_for_status()?;
            let body: LookupResponse = response.json().await?;
            body.into_coordinates()
        };

        match timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(GeoError::Timeout(self.timeout)),
        }
    }
}

impl GeoLocator for IpApiLocator {
    fn locate<'a>(&'a self, ip: &'a str) -> BoxFuture<'a, Result<Coordinates, GeoError>> {
        self.lookup(ip).boxed()
    }
}
