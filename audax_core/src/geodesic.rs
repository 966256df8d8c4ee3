//! Great-circle distance between two coordinates.

use geo::Point;

/// Radius of the Earth used by the Haversine formula, in km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Returns the Haversine distance in km between two points.
///
/// n.b. x=lon, y=lat, as everywhere else in `geo`. If you build the points
/// the other way round the distances are wrong - a lot wrong.
pub fn haversine_km(p1: Point, p2: Point) -> f64 {
    let lat1 = p1.y().to_radians();
    let lat2 = p2.y().to_radians();
    let d_lat = (p2.y() - p1.y()).to_radians();
    let d_lon = (p2.x() - p1.x()).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Convenience wrapper over `haversine_km` for callers holding raw degrees.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    haversine_km(Point::new(lon1, lat1), Point::new(lon2, lat2))
}
