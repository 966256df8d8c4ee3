//! Turns a GPX document into a measured track with its checkpoints.

use geo::point;
use log::{debug, info, warn};
use logging_timer::time;

use crate::{
    classify::{classify_waypoint, WaypointKind},
    error::{AudaxError, Result},
    geodesic::haversine_km,
    mapping::map_checkpoints,
    model::{
        is_valid_coordinate, Checkpoint, GpxTrack, RawPoint, RawWaypoint, RouteDocument,
        TrackPoint,
    },
    read::read_route_from_str,
};

/// Parses GPX text into a track with cumulative distances and the
/// checkpoints found among its waypoints.
///
/// Fails with `AudaxError::Parse` if the text is not XML, and with
/// `AudaxError::InsufficientData` if fewer than 2 valid points remain.
#[time]
pub fn parse_gpx_track(text: &str) -> Result<GpxTrack> {
    let doc = read_route_from_str(text)?;
    build_track(doc)
}

/// Builds the measured track from an already-read document. Track points
/// are used if there are any valid ones, otherwise route points.
pub fn build_track(doc: RouteDocument) -> Result<GpxTrack> {
    let mut points = measure_points(&doc.track_points);
    if points.is_empty() && !doc.route_points.is_empty() {
        info!("No valid track points, using the route points instead");
        points = measure_points(&doc.route_points);
    }

    if points.len() < 2 {
        warn!("Only {} valid point(s) in the document", points.len());
        return Err(AudaxError::InsufficientData {
            found: points.len(),
        });
    }

    let checkpoints = extract_checkpoints(&doc.waypoints, &points);

    let track = GpxTrack {
        name: doc.name,
        points,
        checkpoints,
    };

    info!(
        "Track {:?} has {} points, {:.1} km and {} checkpoints",
        track.name,
        track.points.len(),
        track.total_distance_km(),
        track.checkpoints().len()
    );

    Ok(track)
}

/// Drops points with out-of-range coordinates and accumulates the
/// Haversine distance along the points that remain.
pub fn measure_points(raw: &[RawPoint]) -> Vec<TrackPoint> {
    let mut points: Vec<TrackPoint> = Vec::with_capacity(raw.len());

    for (idx, rp) in raw.iter().enumerate() {
        if !is_valid_coordinate(rp.lat, rp.lon) {
            debug!("Dropping point {idx} with invalid coordinates ({}, {})", rp.lat, rp.lon);
            continue;
        }

        let cum_distance_km = match points.last() {
            Some(prev) => {
                prev.cum_distance_km
                    + haversine_km(point!(x: prev.lon, y: prev.lat), point!(x: rp.lon, y: rp.lat))
            }
            None => 0.0,
        };

        points.push(TrackPoint {
            lat: rp.lat,
            lon: rp.lon,
            ele: rp.ele,
            cum_distance_km,
        });
    }

    points
}

/// Returns the waypoints that are checkpoints, placed on the track, or
/// `None` if there are none.
pub fn extract_checkpoints(
    waypoints: &[RawWaypoint],
    points: &[TrackPoint],
) -> Option<Vec<Checkpoint>> {
    let accepted: Vec<_> = waypoints
        .iter()
        .filter(|wpt| {
            if !is_valid_coordinate(wpt.lat, wpt.lon) {
                debug!("Dropping waypoint {:?} with invalid coordinates", wpt.name);
                return false;
            }
            if wpt.name.is_empty() {
                warn!("Waypoint at ({}, {}) has no name", wpt.lat, wpt.lon);
            }
            classify_waypoint(wpt) == WaypointKind::Checkpoint
        })
        .cloned()
        .collect();

    if accepted.is_empty() {
        return None;
    }

    let checkpoints = map_checkpoints(&accepted, points);
    Some(checkpoints)
}
