use serde::Serialize;
use time::OffsetDateTime;

pub type Lat = f64; // -90..90
pub type Lon = f64; // -180..180

/// Returns true if the pair is a usable WGS84 coordinate. NaN fails both
/// range checks, so non-numeric input that slipped through parsing is
/// rejected here too.
pub fn is_valid_coordinate(lat: Lat, lon: Lon) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// The parts of a GPX document the engine cares about, in document order.
/// Points and waypoints are exactly as read: no validity filtering has been
/// applied yet.
#[derive(Debug, Clone, Default)]
pub struct RouteDocument {
    /// The first name found in `metadata`, `trk` or `rte`, in that order of
    /// preference.
    pub name: Option<String>,
    /// Every `trkpt`, across all tracks and segments.
    pub track_points: Vec<RawPoint>,
    /// Every `rtept`, across all routes.
    pub route_points: Vec<RawPoint>,
    /// Every top-level `wpt`.
    pub waypoints: Vec<RawWaypoint>,
}

/// A `trkpt` or `rtept` as read from the document. Coordinates that were
/// missing or non-numeric are NaN.
#[derive(Debug, Clone, Copy)]
pub struct RawPoint {
    pub lat: Lat,
    pub lon: Lon,
    /// Elevation in metres, 0 if absent or non-numeric.
    pub ele: f64,
}

/// A point on the track with the distance travelled to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackPoint {
    pub lat: Lat,
    pub lon: Lon,
    pub ele: f64,
    /// Distance along the track from the first point, in km. Never
    /// decreases from one point to the next.
    pub cum_distance_km: f64,
}

/// A `wpt` element. Transient: waypoints are classified and either become
/// a `Checkpoint` or are discarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawWaypoint {
    pub lat: Lat,
    pub lon: Lon,
    /// Empty if the waypoint had no `name` child.
    pub name: String,
    pub description: Option<String>,
    pub symbol: Option<String>,
    pub r#type: Option<String>,
}

/// A waypoint accepted as a control, placed on the track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Checkpoint {
    pub lat: Lat,
    pub lon: Lon,
    pub name: String,
    pub description: Option<String>,
    /// Cumulative distance of the nearest track point, in km.
    pub distance_km: f64,
}

/// The result of reading a GPX document into a measured track.
#[derive(Debug, Clone, Serialize)]
pub struct GpxTrack {
    pub name: Option<String>,
    /// At least two points, in document order.
    pub points: Vec<TrackPoint>,
    /// Sorted by distance. `None` when the document has no checkpoints.
    pub checkpoints: Option<Vec<Checkpoint>>,
}

impl GpxTrack {
    /// Returns the total length of the track in km.
    pub fn total_distance_km(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.cum_distance_km)
    }

    /// Returns the checkpoints, or an empty slice if there are none.
    pub fn checkpoints(&self) -> &[Checkpoint] {
        self.checkpoints.as_deref().unwrap_or_default()
    }
}

/// The opening and closing times of a single control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlTime {
    /// Distance of the control from the start, in km, as supplied.
    pub distance_km: f64,
    /// Hours after the start at which the control opens.
    pub opening_hours: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub opening_clock: OffsetDateTime,
    /// Hours after the start at which the control closes.
    pub closing_hours: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub closing_clock: OffsetDateTime,
}

/// The overall time limits for a brevet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BrevetTimeLimits {
    pub brevet_distance_km: u32,
    pub official_distance_km: u32,
    /// Fastest permitted completion time.
    pub min_hours: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub min_clock: OffsetDateTime,
    /// Slowest permitted completion time.
    pub max_hours: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub max_clock: OffsetDateTime,
}
