//! Assembles the control schedule handed to riders.

use log::info;
use logging_timer::time;
use serde::Serialize;
use time::{Duration, OffsetDateTime};

use crate::{
    acp::AcpRules,
    control_points::{control_point_distances, ControlPointMode},
    error::Result,
    formatting::ClockFormat,
    mapping::checkpoint_near,
    model::{BrevetTimeLimits, Checkpoint, ControlTime, GpxTrack},
};

/// What the caller wants from `build_schedule`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleOptions {
    /// How the control distances are chosen.
    pub mode: ControlPointMode,
    /// The brevet distance. Defaults to the length of the track.
    pub brevet_distance_km: Option<f64>,
    /// Shown instead of the name from the GPX.
    pub route_name: Option<String>,
    /// How clock times are rendered in the text export.
    pub clock_format: ClockFormat,
}

/// A control with the name riders will see, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledControl {
    #[serde(flatten)]
    pub time: ControlTime,
    pub name: Option<String>,
}

/// The finished schedule for a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlSchedule {
    pub route_name: Option<String>,
    pub total_distance_km: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    pub controls: Vec<ScheduledControl>,
    pub limits: BrevetTimeLimits,
    #[serde(skip)]
    pub clock_format: ClockFormat,
}

impl ControlSchedule {
    /// Returns true if the controls carry names.
    pub fn has_names(&self) -> bool {
        self.controls.iter().any(|c| c.name.is_some())
    }

    /// The time from the first control opening to the last control closing.
    pub fn time_window(&self) -> Duration {
        match (self.controls.first(), self.controls.last()) {
            (Some(first), Some(last)) => last.time.closing_clock - first.time.opening_clock,
            _ => Duration::ZERO,
        }
    }

    /// The time window as whole hours and remaining whole minutes.
    pub fn time_window_hours_minutes(&self) -> (i64, i64) {
        let window = self.time_window();
        (window.whole_hours(), window.whole_minutes() % 60)
    }
}

/// Builds the control schedule for a track.
///
/// The control distances come from `options.mode`, their times from `rules`.
/// In checkpoint mode each control is named after the checkpoint within
/// 0.1 km of it, or "Start", "Finish" or "Control N" by position.
#[time]
pub fn build_schedule(
    rules: &AcpRules,
    track: &GpxTrack,
    start: OffsetDateTime,
    options: &ScheduleOptions,
) -> Result<ControlSchedule> {
    let total_distance_km = track.total_distance_km();
    let brevet = rules.brevet(options.brevet_distance_km.unwrap_or(total_distance_km))?;

    let distances = control_point_distances(options.mode, track.checkpoints(), total_distance_km)?;
    let times = rules.calculate_controls(&brevet, start, &distances)?;

    let controls = match options.mode {
        ControlPointMode::Checkpoints => name_controls(times, track.checkpoints()),
        ControlPointMode::RegularInterval { .. } => times
            .into_iter()
            .map(|time| ScheduledControl { time, name: None })
            .collect(),
    };

    let schedule = ControlSchedule {
        route_name: options.route_name.clone().or_else(|| track.name.clone()),
        total_distance_km,
        start,
        controls,
        limits: rules.time_limits(&brevet, start)?,
        clock_format: options.clock_format,
    };

    let (hours, minutes) = schedule.time_window_hours_minutes();
    info!(
        "Schedule for {:?}: {} controls over {:.1} km, window {hours}h {minutes}m",
        schedule.route_name,
        schedule.controls.len(),
        total_distance_km
    );

    Ok(schedule)
}

fn name_controls(times: Vec<ControlTime>, checkpoints: &[Checkpoint]) -> Vec<ScheduledControl> {
    let last_idx = times.len().saturating_sub(1);

    times
        .into_iter()
        .enumerate()
        .map(|(idx, time)| {
            let name = match checkpoint_near(checkpoints, time.distance_km) {
                Some(cp) => cp.name.clone(),
                None if idx == 0 => "Start".to_string(),
                None if idx == last_idx => "Finish".to_string(),
                None => format!("Control {idx}"),
            };
            ScheduledControl {
                time,
                name: Some(name),
            }
        })
        .collect()
}
