use time::{format_description::well_known, macros::format_description, OffsetDateTime};

use crate::error::Result;

/// How clock times are shown to riders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClockFormat {
    /// e.g. "2024-06-01 19:05"
    #[default]
    TwentyFourHour,
    /// e.g. "2024-06-01 7:05 PM"
    TwelveHour,
}

/// Formats `date` as a date and clock time, in the offset it carries.
pub fn format_clock(date: &OffsetDateTime, clock_format: ClockFormat) -> Result<String> {
    let formatted = match clock_format {
        ClockFormat::TwentyFourHour => {
            date.format(format_description!("[year]-[month]-[day] [hour]:[minute]"))?
        }
        ClockFormat::TwelveHour => date.format(format_description!(
            "[year]-[month]-[day] [hour repr:12 padding:none]:[minute] [period]"
        ))?,
    };

    Ok(formatted)
}

/// Formats `date` into a string like "2024-09-01T05:10:44Z".
pub fn format_rfc3339(date: &OffsetDateTime) -> Result<String> {
    Ok(date.format(&well_known::Rfc3339)?)
}
