//! Control times for ACP brevets, worked out from a GPX route.
//!
//! The usual flow is `parse_gpx_track` to turn GPX text into a measured
//! track with its checkpoints, then `build_schedule` to work out the opening
//! and closing time of every control, then `format_schedule` for the text
//! handed to riders. Everything is synchronous and free of shared state.

pub mod acp;
pub mod classify;
pub mod control_points;
pub mod error;
pub mod export;
pub mod formatting;
pub mod geodesic;
pub mod gpx_track;
pub mod mapping;
pub mod model;
pub mod read;
pub mod schedule;

pub use acp::{format_time, hours_to_clock, AcpRules, BrevetIdentity, SpeedLimitSegment};
pub use control_points::{ControlPointMode, DEFAULT_INTERVAL_KM};
pub use error::{AudaxError, Result};
pub use export::{format_schedule, write_schedule_to_writer};
pub use formatting::ClockFormat;
pub use gpx_track::parse_gpx_track;
pub use model::{BrevetTimeLimits, Checkpoint, ControlTime, GpxTrack, TrackPoint};
pub use schedule::{build_schedule, ControlSchedule, ScheduleOptions, ScheduledControl};
