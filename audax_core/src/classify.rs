//! Decides which waypoints are controls and which are turn-by-turn notes.
//!
//! Route planners export cue sheet entries ("Turn left onto High St") as
//! waypoints alongside the real controls, so both need recognising.

use log::debug;

use crate::model::RawWaypoint;

/// Words which mark a waypoint as a navigation cue.
pub const NAVIGATION_TERMS: [&str; 7] = [
    "turn", "left", "right", "continue", "straight", "onto", "head",
];

/// Words which mark a waypoint as a control.
pub const CHECKPOINT_TERMS: [&str; 6] = [
    "checkpoint",
    "check point",
    "chk",
    "cp",
    "kontroll",
    "control",
];

/// What a waypoint turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaypointKind {
    /// A control; it will be placed on the track.
    Checkpoint,
    /// A cue sheet entry.
    Navigation,
    /// Anything else (cafes, viewpoints...).
    Other,
}

/// Returns true if the name or description reads like a navigation cue.
pub fn is_navigation_instruction(wpt: &RawWaypoint) -> bool {
    let text = format!(
        "{} {}",
        wpt.name,
        wpt.description.as_deref().unwrap_or_default()
    )
    .to_lowercase();

    NAVIGATION_TERMS.iter().any(|term| text.contains(term))
}

/// Returns true if the name, symbol or type identifies a control. An exact
/// match on any of them is checked first, then a substring match.
pub fn is_checkpoint(wpt: &RawWaypoint) -> bool {
    let fields: Vec<String> = [
        Some(wpt.name.as_str()),
        wpt.symbol.as_deref(),
        wpt.r#type.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(|f| f.trim().to_lowercase())
    .filter(|f| !f.is_empty())
    .collect();

    let exact = fields
        .iter()
        .any(|f| CHECKPOINT_TERMS.contains(&f.as_str()));

    exact
        || fields
            .iter()
            .any(|f| CHECKPOINT_TERMS.iter().any(|term| f.contains(term)))
}

/// Classifies a waypoint. Navigation cues are excluded even if they also
/// contain a checkpoint term.
pub fn classify_waypoint(wpt: &RawWaypoint) -> WaypointKind {
    if is_navigation_instruction(wpt) {
        debug!("Waypoint {:?} is a navigation cue", wpt.name);
        WaypointKind::Navigation
    } else if is_checkpoint(wpt) {
        WaypointKind::Checkpoint
    } else {
        debug!("Waypoint {:?} is not a checkpoint", wpt.name);
        WaypointKind::Other
    }
}
