//! Great-circle distance and point-in-polygon containment.

use waypost_core::GeoPoint;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance between two points, in kilometers.
#[must_use]
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Ray-casting containment test against a polygon ring.
///
/// The ring's closing vertex is implicit. Edges are half-open intervals in
/// latitude, so points exactly on an edge classify deterministically (the
/// exact side is implementation-defined but stable).
#[must_use]
pub fn point_in_ring(point: GeoPoint, ring: &[GeoPoint]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        let crosses = (a.lat > point.lat) != (b.lat > point.lat);
        if crosses {
            let lon_at_lat = (b.lon - a.lon) * (point.lat - a.lat) / (b.lat - a.lat) + a.lon;
            if point.lon < lon_at_lat {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
