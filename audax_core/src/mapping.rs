//! Places checkpoints on the track.
//!
//! Each checkpoint takes the cumulative distance of the track point nearest
//! to it. The search is a linear scan, so mapping is
//! O(checkpoints x track points). That is fine for brevet-sized tracks of a
//! few thousand points; a grid or k-d tree could replace `nearest_track_point`
//! without changing anything else here.

use geo::point;
use log::debug;

use crate::{
    geodesic::haversine_km,
    model::{Checkpoint, RawWaypoint, TrackPoint},
};

/// Checkpoints closer together than this, in km, are the same control.
pub const SAME_CONTROL_TOLERANCE_KM: f64 = 0.1;

/// Returns the track point closest to (lat, lon), or `None` if `points` is
/// empty. Ties go to the earliest point.
pub fn nearest_track_point(points: &[TrackPoint], lat: f64, lon: f64) -> Option<&TrackPoint> {
    let target = point!(x: lon, y: lat);

    points
        .iter()
        .map(|tp| (tp, haversine_km(point!(x: tp.lon, y: tp.lat), target)))
        .min_by(|(_, d1), (_, d2)| d1.total_cmp(d2))
        .map(|(tp, _)| tp)
}

/// Assigns every waypoint the distance of its nearest track point and
/// returns the resulting checkpoints sorted by distance. Checkpoints landing
/// on exactly the same distance are collapsed into the first one.
pub fn map_checkpoints(waypoints: &[RawWaypoint], points: &[TrackPoint]) -> Vec<Checkpoint> {
    let mut checkpoints: Vec<Checkpoint> = waypoints
        .iter()
        .filter_map(|wpt| {
            let nearest = nearest_track_point(points, wpt.lat, wpt.lon)?;
            debug!(
                "Checkpoint {:?} placed at {:.1} km",
                wpt.name, nearest.cum_distance_km
            );
            Some(Checkpoint {
                lat: wpt.lat,
                lon: wpt.lon,
                name: wpt.name.clone(),
                description: wpt.description.clone(),
                distance_km: nearest.cum_distance_km,
            })
        })
        .collect();

    // Stable, so duplicates keep document order and the first one wins.
    checkpoints.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    checkpoints.dedup_by(|later, earlier| {
        let same = later.distance_km == earlier.distance_km;
        if same {
            debug!(
                "Checkpoint {:?} duplicates {:?} at {:.1} km",
                later.name, earlier.name, later.distance_km
            );
        }
        same
    });

    checkpoints
}

/// Finds the checkpoint at `distance_km`, allowing for the
/// `SAME_CONTROL_TOLERANCE_KM` slack. The first match wins.
pub fn checkpoint_near(checkpoints: &[Checkpoint], distance_km: f64) -> Option<&Checkpoint> {
    checkpoints
        .iter()
        .find(|cp| (cp.distance_km - distance_km).abs() <= SAME_CONTROL_TOLERANCE_KM)
}
