//! Great-circle distance ranking.

use std::sync::Arc;

use crate::geo::Coordinates;
use crate::load_balancer::pool::ServerPool;
use crate::load_balancer::server::ServerDescriptor;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points, in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Orders servers by distance from a client.
#[derive(Debug, Default, Clone, Copy)]
pub struct DistanceRanker;

impl DistanceRanker {
    /// Distance from `origin` to `server`; servers without coordinates are infinitely far.
    pub fn distance(origin: Coordinates, server: &ServerDescriptor) -> f64 {
        server
            .location
            .map(|loc| haversine_km(origin, loc))
            .unwrap_or(f64::INFINITY)
    }

    /// Pool members nearest first. Equal distances keep pool order.
    pub fn closest(origin: Coordinates, pool: &ServerPool) -> Vec<Arc<ServerDescriptor>> {
        let mut ranked: Vec<(f64, Arc<ServerDescriptor>)> = pool
            .all()
            .iter()
            .map(|s| (Self::distance(origin, s), s.clone()))
            .collect();

        // Stable: ties (including every server without coordinates) stay in pool order.
        ranked.sort_by(|(a, _), (b, _)| a.total_cmp(b));
        ranked.into_iter().map(|(_, s)| s).collect()
    }
}
