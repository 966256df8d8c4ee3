//! Plain-text export of a control schedule.

use std::io::Write;

use crate::{
    error::Result,
    formatting::format_clock,
    schedule::ControlSchedule,
};

const RULE: &str =
    "--------------------------------------------------------------------------------";

/// Used on the 'Route:' line when neither the GPX nor the caller named the
/// route.
pub const UNNAMED_ROUTE: &str = "Unnamed route";

/// Renders the schedule in the fixed-column text layout.
pub fn format_schedule(schedule: &ControlSchedule) -> Result<String> {
    let mut buf = Vec::with_capacity(1024);
    write_schedule_to_writer(&mut buf, schedule)?;
    // Everything written above came from `str`s.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Writes the schedule in the fixed-column text layout. Clock times use the
/// schedule's `clock_format`; the name column only appears if the controls
/// are named.
pub fn write_schedule_to_writer<W: Write>(w: &mut W, schedule: &ControlSchedule) -> Result<()> {
    let clock_format = schedule.clock_format;
    let (hours, minutes) = schedule.time_window_hours_minutes();

    writeln!(
        w,
        "Route: {}",
        schedule.route_name.as_deref().unwrap_or(UNNAMED_ROUTE)
    )?;
    writeln!(w, "Total Distance: {:.1} km", schedule.total_distance_km)?;
    writeln!(w, "Total Time Window: {hours}h {minutes}m")?;

    if let (Some(first), Some(last)) = (schedule.controls.first(), schedule.controls.last()) {
        writeln!(
            w,
            "Time Range: {} → {}",
            format_clock(&first.time.opening_clock, clock_format)?,
            format_clock(&last.time.closing_clock, clock_format)?
        )?;
    }

    let named = schedule.has_names();

    writeln!(w, "Control Points:")?;
    writeln!(w, "{RULE}")?;
    write!(
        w,
        "{:<13} | {:<22} | {:<22}",
        "Distance (km)", "Opening Time", "Closing Time"
    )?;
    if named {
        write!(w, " | Name")?;
    }
    writeln!(w)?;
    writeln!(w, "{RULE}")?;

    for control in &schedule.controls {
        let opening = format_clock(&control.time.opening_clock, clock_format)?;
        let closing = format_clock(&control.time.closing_clock, clock_format)?;
        write!(
            w,
            "{:<13} | {:<22} | {:<22}",
            format!("{:.1}", control.time.distance_km),
            opening,
            closing
        )?;
        if named {
            write!(w, " | {}", control.name.as_deref().unwrap_or_default())?;
        }
        writeln!(w)?;
    }

    w.flush()?;
    Ok(())
}
