//! Shared test helpers: scripted probes and locators.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use futures_util::future::{BoxFuture, FutureExt};

use crate::geo::{Coordinates, GeoError, GeoLocator};
use crate::health::{HealthProbe, LoadProbe, LoadReport, ProbeError};
use crate::load_balancer::server::ServerDescriptor;

/// How a scripted server answers.
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Reachable, reporting this load.
    Load(f64),
    /// Answers with this non-success status.
    Status(u16),
    /// Never answers within any test deadline.
    Hang,
}

/// A probe whose answers are scripted per server name.
#[derive(Debug, Default)]
pub struct ScriptedProbe {
    behaviors: HashMap<String, Behavior>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, behavior: Behavior) -> Self {
        self.behaviors.insert(name.to_string(), behavior);
        self
    }

    /// Names of the servers probed so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn answer(&self, server: &ServerDescriptor) -> Result<f64, ProbeError> {
        self.calls.lock().unwrap().push(server.name.clone());
        match self.behaviors.get(&server.name).copied() {
            Some(Behavior::Load(load)) => Ok(load),
            Some(Behavior::Status(code)) => Err(ProbeError::Status(code)),
            Some(Behavior::Hang) => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(0.0)
            }
            None => Err(ProbeError::Malformed(format!("no script for {}", server.name))),
        }
    }
}

impl LoadProbe for ScriptedProbe {
    fn probe_load<'a>(&'a self, server: &'a ServerDescriptor) -> BoxFuture<'a, Result<LoadReport, ProbeError>> {
        async move {
            let load = self.answer(server).await?;
            Ok(LoadReport {
                uploads: load,
                downloads: 0.0,
            })
        }
        .boxed()
    }
}

impl HealthProbe for ScriptedProbe {
    fn probe_health<'a>(&'a self, server: &'a ServerDescriptor) -> BoxFuture<'a, Result<(), ProbeError>> {
        async move { self.answer(server).await.map(|_| ()) }.boxed()
    }
}

/// A locator returning a fixed answer.
#[derive(Debug, Default)]
pub struct FixedLocator {
    pub location: Option<Coordinates>,
    lookups: Mutex<Vec<String>>,
}

impl FixedLocator {
    pub fn at(lat: f64, lon: f64) -> Self {
        Self {
            location: Some(Coordinates::new(lat, lon)),
            lookups: Mutex::default(),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

impl GeoLocator for FixedLocator {
    fn locate<'a>(&'a self, ip: &'a str) -> BoxFuture<'a, Result<Coordinates, GeoError>> {
        self.lookups.lock().unwrap().push(ip.to_string());
        let result = self
            .location
            .ok_or_else(|| GeoError::Lookup("no location scripted".to_string()));
        async move { result }.boxed()
    }
}
