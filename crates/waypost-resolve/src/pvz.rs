//! Pickup point lookup, coordinate backfill, and proximity filtering.

use async_trait::async_trait;
use tracing::{debug, warn};

use waypost_carrier::{CarrierClient, DeliveryPointQuery};
use waypost_core::{GeoPoint, PickupPoint, ResolutionTrace};
use waypost_geocode::GeocodeClient;

use crate::city::CityResolution;
use crate::error::ResolveError;
use crate::geo::haversine_km;

/// Proximity tiers tried in order: walkable first, then same-agglomeration.
pub const RADIUS_TIERS_KM: [f64; 2] = [10.0, 50.0];

/// Hard cap on returned pickup points.
pub const MAX_POINTS: usize = 10;

/// Durable cache for backfilled pickup point coordinates, keyed by point
/// code. Lookups that miss fall back to geocoding.
#[async_trait]
pub trait CoordinateStore: Send + Sync {
    async fn get(&self, code: &str) -> Option<GeoPoint>;
    async fn put(&self, code: &str, point: GeoPoint);
}

/// Store that remembers nothing. Every backfill geocodes afresh.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCoordinateStore;

#[async_trait]
impl CoordinateStore for NoopCoordinateStore {
    async fn get(&self, _code: &str) -> Option<GeoPoint> {
        None
    }

    async fn put(&self, _code: &str, _point: GeoPoint) {}
}

pub struct PvzLocator<'a, S: CoordinateStore> {
    pub carrier: &'a CarrierClient,
    pub geocode: &'a GeocodeClient,
    pub store: &'a S,
}

impl<S: CoordinateStore> PvzLocator<'_, S> {
    /// Fetches pickup points for a resolved city.
    ///
    /// # Errors
    ///
    /// Only [`ResolveError::Auth`]. Transient carrier failures log a warning
    /// and return an empty list so the caller can try another query shape.
    pub async fn locate_by_city(
        &self,
        city: &CityResolution,
    ) -> Result<Vec<PickupPoint>, ResolveError> {
        let query = DeliveryPointQuery::by_city_code(city.code, city.admin_id.clone());
        self.fetch(&query).await
    }

    /// Fetches pickup points by free-text city and street address.
    ///
    /// # Errors
    ///
    /// Only [`ResolveError::Auth`].
    pub async fn locate_by_address(
        &self,
        city: String,
        region: Option<String>,
        address: String,
    ) -> Result<Vec<PickupPoint>, ResolveError> {
        let query = DeliveryPointQuery::by_address(city, region, address);
        self.fetch(&query).await
    }

    async fn fetch(&self, query: &DeliveryPointQuery) -> Result<Vec<PickupPoint>, ResolveError> {
        match self.carrier.delivery_points(query).await {
            Ok(points) => Ok(points
                .into_iter()
                .map(waypost_carrier::CarrierPoint::into_pickup_point)
                .collect()),
            Err(err) if err.is_auth() => Err(ResolveError::Auth(err)),
            Err(err) => {
                warn!(error = %err, "delivery point lookup failed, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Fills in missing coordinates: the store first, then geocoding the
    /// point's address. Newly geocoded coordinates are written back to the
    /// store. Points that still lack coordinates stay as they are.
    pub async fn backfill_coordinates(&self, points: &mut [PickupPoint]) {
        for point in points.iter_mut().filter(|p| p.point.is_none()) {
            if let Some(cached) = self.store.get(&point.code).await {
                point.point = Some(cached);
                continue;
            }
            if point.address.is_empty() {
                continue;
            }
            if let Some(resolved) = self.geocode.resolve(&point.address).await {
                if let Some(coords) = resolved.point {
                    point.point = Some(coords);
                    self.store.put(&point.code, coords).await;
                } else {
                    debug!(code = %point.code, "geocoder candidate lacks coordinates");
                }
            }
        }
    }
}

/// Points within `radius_km` of `center`, sorted by distance (point code
/// breaks ties) and capped at [`MAX_POINTS`]. Points without coordinates
/// never pass.
#[must_use]
pub fn filter_by_radius(
    points: &[PickupPoint],
    center: GeoPoint,
    radius_km: f64,
) -> Vec<PickupPoint> {
    let mut within: Vec<(f64, &PickupPoint)> = points
        .iter()
        .filter_map(|point| {
            let coords = point.point?;
            let distance = haversine_km(center, coords);
            (distance <= radius_km).then_some((distance, point))
        })
        .collect();
    within.sort_by(|(da, pa), (db, pb)| {
        da.partial_cmp(db)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| pa.code.cmp(&pb.code))
    });
    within
        .into_iter()
        .take(MAX_POINTS)
        .map(|(_, point)| point.clone())
        .collect()
}

/// Applies [`RADIUS_TIERS_KM`] in order and returns the first non-empty
/// tier's points. Every widening step is recorded in the trace.
#[must_use]
pub fn filter_by_tiers(
    points: &[PickupPoint],
    center: GeoPoint,
    trace: &mut ResolutionTrace,
) -> Vec<PickupPoint> {
    for radius_km in RADIUS_TIERS_KM {
        let within = filter_by_radius(points, center, radius_km);
        if within.is_empty() {
            trace.push(format!("no pickup points within {radius_km} km"));
        } else {
            trace.push(format!(
                "{} pickup point(s) within {radius_km} km",
                within.len()
            ));
            return within;
        }
    }
    Vec::new()
}
