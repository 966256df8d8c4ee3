//! ACP brevet time limits.
//!
//! A control's opening time is how long the fastest permitted rider takes
//! to reach it, and its closing time is how long the slowest permitted
//! rider takes. Both are found by walking the speed bands from the start:
//! each band contributes the part of the distance that falls inside it,
//! divided by that band's maximum (opening) or minimum (closing) speed.
//!
//! The rule tables are plain data held by `AcpRules`. Everything that
//! depends on a particular brevet takes its `BrevetIdentity` explicitly.

use log::{debug, info};
use time::{Duration, OffsetDateTime};

use crate::{
    error::{require_distance, AudaxError, Result},
    model::{BrevetTimeLimits, ControlTime},
};

/// A band of the route, in km from the start, and the speeds which apply
/// within it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedLimitSegment {
    pub start_km: f64,
    pub end_km: f64,
    /// Used for closing times.
    pub min_speed_kmh: f64,
    /// Used for opening times.
    pub max_speed_kmh: f64,
}

impl SpeedLimitSegment {
    pub const fn new(start_km: f64, end_km: f64, min_speed_kmh: f64, max_speed_kmh: f64) -> Self {
        Self {
            start_km,
            end_km,
            min_speed_kmh,
            max_speed_kmh,
        }
    }

    /// Returns the length of the band in km.
    pub fn width_km(&self) -> f64 {
        self.end_km - self.start_km
    }
}

/// A standard brevet distance and its fixed overall time limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OfficialLimit {
    pub distance_km: u32,
    pub max_hours: f64,
}

/// The ACP speed bands, 0 to 1300 km.
pub const ACP_SPEED_LIMITS: [SpeedLimitSegment; 5] = [
    SpeedLimitSegment::new(0.0, 200.0, 15.0, 34.0),
    SpeedLimitSegment::new(200.0, 400.0, 15.0, 32.0),
    SpeedLimitSegment::new(400.0, 600.0, 15.0, 30.0),
    SpeedLimitSegment::new(600.0, 1000.0, 11.428, 28.0),
    SpeedLimitSegment::new(1000.0, 1300.0, 13.333, 26.0),
];

/// The standard brevet distances and their overall time limits.
pub const ACP_OFFICIAL_LIMITS: [OfficialLimit; 6] = [
    OfficialLimit { distance_km: 200, max_hours: 13.5 },
    OfficialLimit { distance_km: 300, max_hours: 20.0 },
    OfficialLimit { distance_km: 400, max_hours: 27.0 },
    OfficialLimit { distance_km: 600, max_hours: 40.0 },
    OfficialLimit { distance_km: 1000, max_hours: 75.0 },
    OfficialLimit { distance_km: 1200, max_hours: 90.0 },
];

/// The tables and constants the calculator runs on.
#[derive(Debug, Clone, PartialEq)]
pub struct AcpRules {
    /// Ascending, non-overlapping bands starting at 0. Distance beyond the
    /// last band adds no time.
    pub segments: Vec<SpeedLimitSegment>,
    /// Standard distances with their fixed time limits.
    pub official_limits: Vec<OfficialLimit>,
    /// A brevet up to this factor longer than a standard distance is
    /// treated as that distance.
    pub distance_tolerance: f64,
    /// Controls closer than this to the start close at a flat speed...
    pub relaxed_closing_below_km: f64,
    /// ...of this many km/h.
    pub relaxed_closing_speed_kmh: f64,
    /// How long the start control stays open.
    pub start_control_open_hours: f64,
}

impl Default for AcpRules {
    fn default() -> Self {
        Self {
            segments: ACP_SPEED_LIMITS.to_vec(),
            official_limits: ACP_OFFICIAL_LIMITS.to_vec(),
            distance_tolerance: 1.05,
            relaxed_closing_below_km: 60.0,
            relaxed_closing_speed_kmh: 20.0,
            start_control_open_hours: 1.0,
        }
    }
}

/// Which brevet a route is: its distance and the standard distance whose
/// rules apply to it. Computed once by `AcpRules::brevet` and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrevetIdentity {
    /// The route distance, floored to whole km.
    pub brevet_distance_km: u32,
    /// The standard distance, or the brevet distance itself if it is longer
    /// than every standard distance allows.
    pub official_distance_km: u32,
}

impl AcpRules {
    /// Checks that every speed is positive and every distance, limit and
    /// duration is finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        fn positive(what: &str, value: f64) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(AudaxError::InvalidInput(format!(
                    "{what} must be positive and finite, got {value}"
                )))
            }
        }

        for segment in &self.segments {
            require_distance("Speed band start", segment.start_km)?;
            require_distance("Speed band end", segment.end_km)?;
            if segment.end_km < segment.start_km {
                return Err(AudaxError::InvalidInput(format!(
                    "Speed band {}-{} km ends before it starts",
                    segment.start_km, segment.end_km
                )));
            }
            positive("Minimum speed", segment.min_speed_kmh)?;
            positive("Maximum speed", segment.max_speed_kmh)?;
        }
        for limit in &self.official_limits {
            require_distance("Official time limit", limit.max_hours)?;
        }
        positive("Distance tolerance", self.distance_tolerance)?;
        require_distance("Relaxed closing distance", self.relaxed_closing_below_km)?;
        positive("Relaxed closing speed", self.relaxed_closing_speed_kmh)?;
        require_distance("Start control open time", self.start_control_open_hours)?;
        Ok(())
    }

    /// Identifies the brevet for a route of `distance_km`. Fails if the
    /// rules themselves are invalid.
    pub fn brevet(&self, distance_km: f64) -> Result<BrevetIdentity> {
        self.validate()?;
        let distance_km = require_distance("Brevet distance", distance_km)?;
        let brevet_distance_km = distance_km.floor() as u32;
        let official_distance_km = self.official_distance_km(brevet_distance_km);
        debug!("A {distance_km} km route is a {official_distance_km} km brevet");

        Ok(BrevetIdentity {
            brevet_distance_km,
            official_distance_km,
        })
    }

    /// Returns the smallest standard distance `d` with
    /// `brevet_distance_km <= d * distance_tolerance`, or `brevet_distance_km`
    /// if there is none.
    pub fn official_distance_km(&self, brevet_distance_km: u32) -> u32 {
        self.official_limits
            .iter()
            .map(|limit| limit.distance_km)
            .filter(|&d| f64::from(brevet_distance_km) <= f64::from(d) * self.distance_tolerance)
            .min()
            .unwrap_or(brevet_distance_km)
    }

    /// Returns the fixed overall time limit for a standard distance.
    pub fn official_time_limit(&self, official_distance_km: u32) -> Option<f64> {
        self.official_limits
            .iter()
            .find(|limit| limit.distance_km == official_distance_km)
            .map(|limit| limit.max_hours)
    }

    /// Sums the time to cover `km` from the start, using `speed` to pick the
    /// speed of each band.
    fn integrate<F>(&self, km: f64, speed: F) -> f64
    where
        F: Fn(&SpeedLimitSegment) -> f64,
    {
        let mut remaining = km;
        let mut hours = 0.0;

        for segment in &self.segments {
            if remaining <= 0.0 {
                break;
            }
            let in_segment = remaining.min(segment.width_km());
            hours += in_segment / speed(segment);
            remaining -= in_segment;
        }

        hours
    }

    /// Floors the control distance to whole km and caps it at the official
    /// distance.
    fn control_km(brevet: &BrevetIdentity, control_km: f64) -> Result<f64> {
        let km = require_distance("Control distance", control_km)?.floor();
        Ok(km.min(f64::from(brevet.official_distance_km)))
    }

    /// Returns the opening time of a control, in hours after the start.
    pub fn opening_time_hours(&self, brevet: &BrevetIdentity, control_km: f64) -> Result<f64> {
        let km = Self::control_km(brevet, control_km)?;
        Ok(self.integrate(km, |s| s.max_speed_kmh))
    }

    /// Returns the closing time of a control, in hours after the start.
    ///
    /// Controls under `relaxed_closing_below_km` close at the flat relaxed
    /// speed. A control at or past the official distance closes at the
    /// official time limit, where there is one.
    pub fn closing_time_hours(&self, brevet: &BrevetIdentity, control_km: f64) -> Result<f64> {
        let km = require_distance("Control distance", control_km)?.floor();
        if km < self.relaxed_closing_below_km {
            return Ok(km / self.relaxed_closing_speed_kmh);
        }

        let official = f64::from(brevet.official_distance_km);
        let hours = self.integrate(km.min(official), |s| s.min_speed_kmh);

        if km >= official {
            if let Some(limit) = self.official_time_limit(brevet.official_distance_km) {
                return Ok(limit);
            }
        }

        Ok(hours)
    }

    /// The fastest permitted completion time, in hours.
    pub fn minimum_completion_hours(&self, brevet: &BrevetIdentity) -> f64 {
        let km = f64::from(brevet.brevet_distance_km.min(brevet.official_distance_km));
        self.integrate(km, |s| s.max_speed_kmh)
    }

    /// The slowest permitted completion time, in hours.
    pub fn maximum_completion_hours(&self, brevet: &BrevetIdentity) -> f64 {
        if let Some(limit) = self.official_time_limit(brevet.official_distance_km) {
            return limit;
        }

        let km = f64::from(brevet.brevet_distance_km);
        if km < self.relaxed_closing_below_km {
            km / self.relaxed_closing_speed_kmh
        } else {
            let km = km.min(f64::from(brevet.official_distance_km));
            self.integrate(km, |s| s.min_speed_kmh)
        }
    }

    /// Computes the opening and closing times of one control.
    pub fn control_time(
        &self,
        brevet: &BrevetIdentity,
        start: OffsetDateTime,
        control_km: f64,
    ) -> Result<ControlTime> {
        let opening_hours = self.opening_time_hours(brevet, control_km)?;
        let closing_hours = self.closing_time_hours(brevet, control_km)?;

        Ok(ControlTime {
            distance_km: control_km,
            opening_hours,
            opening_clock: hours_to_clock(start, opening_hours)?,
            closing_hours,
            closing_clock: hours_to_clock(start, closing_hours)?,
        })
    }

    /// Computes the times of every control, sorted by distance. The start
    /// control (distance 0) always closes `start_control_open_hours` after
    /// it opens.
    pub fn calculate_controls(
        &self,
        brevet: &BrevetIdentity,
        start: OffsetDateTime,
        distances_km: &[f64],
    ) -> Result<Vec<ControlTime>> {
        let mut distances_km = distances_km.to_vec();
        distances_km.sort_by(|a, b| a.total_cmp(b));

        let mut controls = distances_km
            .iter()
            .map(|&km| self.control_time(brevet, start, km))
            .collect::<Result<Vec<_>>>()?;

        for control in controls.iter_mut().filter(|c| c.distance_km == 0.0) {
            control.closing_hours = control.opening_hours + self.start_control_open_hours;
            control.closing_clock = hours_to_clock(start, control.closing_hours)?;
        }

        info!(
            "Calculated {} control times for a {} km brevet",
            controls.len(),
            brevet.official_distance_km
        );

        Ok(controls)
    }

    /// Computes the overall time limits of a brevet.
    pub fn time_limits(
        &self,
        brevet: &BrevetIdentity,
        start: OffsetDateTime,
    ) -> Result<BrevetTimeLimits> {
        let min_hours = self.minimum_completion_hours(brevet);
        let max_hours = self.maximum_completion_hours(brevet);

        Ok(BrevetTimeLimits {
            brevet_distance_km: brevet.brevet_distance_km,
            official_distance_km: brevet.official_distance_km,
            min_hours,
            min_clock: hours_to_clock(start, min_hours)?,
            max_hours,
            max_clock: hours_to_clock(start, max_hours)?,
        })
    }
}

impl BrevetTimeLimits {
    /// The minimum completion time, e.g. "5H53".
    pub fn min_time(&self) -> String {
        format_time(self.min_hours)
    }

    /// The maximum completion time, e.g. "13H30".
    pub fn max_time(&self) -> String {
        format_time(self.max_hours)
    }
}

/// Splits an hours value into whole hours and rounded minutes.
fn split_hours(hours: f64) -> (i64, i64) {
    let whole = hours.floor();
    let minutes = ((hours - whole) * 60.0).round();
    (whole as i64, minutes as i64)
}

/// Converts hours after `start` into a clock time. Minutes are rounded to
/// the nearest whole minute. Fails if the result is not a representable
/// date.
pub fn hours_to_clock(start: OffsetDateTime, hours: f64) -> Result<OffsetDateTime> {
    let out_of_range = || {
        AudaxError::InvalidInput(format!(
            "{hours} hours after {start} is not a representable time"
        ))
    };

    if !hours.is_finite() {
        return Err(out_of_range());
    }
    let (h, m) = split_hours(hours);
    let offset = Duration::HOUR
        .checked_mul(i32::try_from(h).map_err(|_| out_of_range())?)
        .and_then(|d| d.checked_add(Duration::minutes(m)))
        .ok_or_else(out_of_range)?;

    start.checked_add(offset).ok_or_else(out_of_range)
}

/// Renders hours as "{hours}H{minutes:02}", e.g. 13.5 is "13H30".
pub fn format_time(hours: f64) -> String {
    let (mut h, mut m) = split_hours(hours);
    if m == 60 {
        h += 1;
        m = 0;
    }
    format!("{h}H{m:02}")
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use time::macros::datetime;

    use super::*;
    use crate::error::AudaxError;

    const START: OffsetDateTime = datetime!(2024-06-01 07:00 UTC);

    fn brevet(km: f64) -> BrevetIdentity {
        AcpRules::default().brevet(km).unwrap()
    }

    #[test]
    fn official_distance_selection() {
        let rules = AcpRules::default();
        assert_eq!(rules.official_distance_km(195), 200);
        assert_eq!(rules.official_distance_km(210), 200);
        assert_eq!(rules.official_distance_km(211), 300);
        assert_eq!(rules.official_distance_km(600), 600);
        assert_eq!(rules.official_distance_km(1260), 1200);
        assert_eq!(rules.official_distance_km(1400), 1400);
        assert_eq!(rules.official_distance_km(50), 200);
    }

    #[test]
    fn brevet_distance_is_floored() {
        let b = brevet(203.9);
        assert_eq!(b.brevet_distance_km, 203);
        assert_eq!(b.official_distance_km, 200);
    }

    #[test]
    fn bad_distances_are_invalid_input() {
        let rules = AcpRules::default();
        assert!(matches!(rules.brevet(-1.0), Err(AudaxError::InvalidInput(_))));
        assert!(matches!(rules.brevet(f64::NAN), Err(AudaxError::InvalidInput(_))));
        assert!(matches!(
            rules.opening_time_hours(&brevet(200.0), f64::INFINITY),
            Err(AudaxError::InvalidInput(_))
        ));
        assert!(matches!(
            rules.closing_time_hours(&brevet(200.0), -0.5),
            Err(AudaxError::InvalidInput(_))
        ));
    }

    #[test]
    fn opening_time_at_the_start_is_zero() {
        let rules = AcpRules::default();
        for km in [200.0, 300.0, 400.0, 600.0, 1000.0, 1200.0, 1500.0] {
            assert_eq!(rules.opening_time_hours(&brevet(km), 0.0).unwrap(), 0.0);
        }
    }

    #[test]
    fn two_hundred_km_brevet() {
        let rules = AcpRules::default();
        let b = brevet(200.0);
        assert_relative_eq!(rules.opening_time_hours(&b, 200.0).unwrap(), 200.0 / 34.0);
        assert_eq!(rules.closing_time_hours(&b, 200.0).unwrap(), 13.5);
        assert_eq!(rules.maximum_completion_hours(&b), 13.5);
        assert_relative_eq!(rules.minimum_completion_hours(&b), 200.0 / 34.0);
    }

    #[test]
    fn controls_past_the_official_distance_are_capped() {
        let rules = AcpRules::default();
        let b = brevet(209.0);
        assert_relative_eq!(rules.opening_time_hours(&b, 209.0).unwrap(), 200.0 / 34.0);
        assert_eq!(rules.closing_time_hours(&b, 205.0).unwrap(), 13.5);
    }

    #[test]
    fn opening_time_spans_bands() {
        let rules = AcpRules::default();
        let b = brevet(600.0);
        let expected = 200.0 / 34.0 + 200.0 / 32.0 + 50.0 / 30.0;
        assert_relative_eq!(
            rules.opening_time_hours(&b, 450.0).unwrap(),
            expected,
            max_relative = 1e-12
        );
    }

    #[test]
    fn closing_time_uses_min_speeds() {
        let rules = AcpRules::default();
        let b = brevet(1000.0);
        assert_relative_eq!(rules.closing_time_hours(&b, 60.0).unwrap(), 4.0);
        assert_relative_eq!(
            rules.closing_time_hours(&b, 650.0).unwrap(),
            40.0 + 50.0 / 11.428,
            max_relative = 1e-12
        );
        assert_eq!(rules.closing_time_hours(&b, 1000.0).unwrap(), 75.0);
    }

    #[test]
    fn short_controls_close_at_twenty_kmh() {
        let rules = AcpRules::default();
        let b = brevet(200.0);
        assert_eq!(rules.closing_time_hours(&b, 30.0).unwrap(), 1.5);
        assert_eq!(rules.closing_time_hours(&b, 59.9).unwrap(), 59.0 / 20.0);
    }

    #[test]
    fn opening_time_never_decreases() {
        let rules = AcpRules::default();
        let b = brevet(1200.0);
        let mut previous = 0.0;
        for km in 0..=1300 {
            let hours = rules.opening_time_hours(&b, f64::from(km)).unwrap();
            assert!(hours >= previous, "opening time went down at {km} km");
            previous = hours;
        }
    }

    #[test]
    fn non_standard_brevet_uses_computed_maximum() {
        let rules = AcpRules::default();
        let b = brevet(1400.0);
        assert_eq!(b.official_distance_km, 1400);
        // The bands stop at 1300 km, so the last 100 km add nothing.
        let expected = 200.0 / 15.0 * 3.0 + 400.0 / 11.428 + 300.0 / 13.333;
        assert_relative_eq!(rules.maximum_completion_hours(&b), expected, max_relative = 1e-12);
    }

    #[test]
    fn start_control_closes_one_hour_after_opening() {
        let rules = AcpRules::default();
        let b = brevet(300.0);
        let controls = rules
            .calculate_controls(&b, START, &[300.0, 0.0, 150.0])
            .unwrap();

        let distances: Vec<_> = controls.iter().map(|c| c.distance_km).collect();
        assert_eq!(distances, [0.0, 150.0, 300.0]);
        assert_eq!(controls[0].closing_hours, controls[0].opening_hours + 1.0);
        assert_eq!(controls[0].closing_clock, datetime!(2024-06-01 08:00 UTC));
        assert_eq!(controls[2].closing_hours, 20.0);
        assert_eq!(controls[2].closing_clock, datetime!(2024-06-02 03:00 UTC));
    }

    #[test]
    fn closing_never_before_opening() {
        let rules = AcpRules::default();
        for km in [200.0, 300.0, 400.0, 600.0, 1000.0, 1200.0] {
            let b = brevet(km);
            let distances: Vec<f64> = (0..=km as u32).step_by(7).map(f64::from).collect();
            for c in rules.calculate_controls(&b, START, &distances).unwrap() {
                assert!(c.closing_hours >= c.opening_hours, "{km} km brevet, control {c:?}");
            }
        }
    }

    #[test]
    fn synthetic_rules_can_be_injected() {
        let rules = AcpRules {
            segments: vec![
                SpeedLimitSegment::new(0.0, 100.0, 10.0, 20.0),
                SpeedLimitSegment::new(100.0, 200.0, 5.0, 10.0),
            ],
            official_limits: vec![OfficialLimit { distance_km: 150, max_hours: 24.0 }],
            distance_tolerance: 1.0,
            relaxed_closing_below_km: 0.0,
            relaxed_closing_speed_kmh: 1.0,
            start_control_open_hours: 0.5,
        };
        let b = rules.brevet(150.0).unwrap();
        assert_eq!(b.official_distance_km, 150);
        assert_eq!(rules.opening_time_hours(&b, 150.0).unwrap(), 5.0 + 5.0);
        assert_eq!(rules.closing_time_hours(&b, 120.0).unwrap(), 10.0 + 4.0);
        assert_eq!(rules.closing_time_hours(&b, 150.0).unwrap(), 24.0);

        let controls = rules.calculate_controls(&b, START, &[0.0, 150.0]).unwrap();
        assert_eq!(controls[0].closing_hours, 0.5);
    }

    #[test]
    fn clock_conversion_rounds_minutes() -> Result<()> {
        assert_eq!(hours_to_clock(START, 13.5)?, datetime!(2024-06-01 20:30 UTC));
        assert_eq!(
            hours_to_clock(START, 200.0 / 34.0)?,
            datetime!(2024-06-01 12:53 UTC)
        );
        assert_eq!(hours_to_clock(START, 0.0)?, START);
        Ok(())
    }

    #[test]
    fn clock_times_past_the_last_date_are_invalid_input() {
        let late = datetime!(9999-12-31 20:00 UTC);
        assert!(matches!(hours_to_clock(late, 13.5), Err(AudaxError::InvalidInput(_))));
        assert!(matches!(
            hours_to_clock(START, f64::INFINITY),
            Err(AudaxError::InvalidInput(_))
        ));
        assert!(matches!(hours_to_clock(START, 1.0e15), Err(AudaxError::InvalidInput(_))));

        let rules = AcpRules::default();
        let b = brevet(200.0);
        assert!(matches!(
            rules.calculate_controls(&b, late, &[0.0, 200.0]),
            Err(AudaxError::InvalidInput(_))
        ));
        assert!(matches!(rules.time_limits(&b, late), Err(AudaxError::InvalidInput(_))));
    }

    #[test]
    fn invalid_rules_are_rejected() {
        let mut rules = AcpRules::default();
        rules.segments[0].min_speed_kmh = 0.0;
        assert!(matches!(rules.brevet(200.0), Err(AudaxError::InvalidInput(_))));

        let mut rules = AcpRules::default();
        rules.relaxed_closing_speed_kmh = -20.0;
        assert!(matches!(rules.validate(), Err(AudaxError::InvalidInput(_))));

        let mut rules = AcpRules::default();
        rules.segments[1].end_km = 100.0;
        assert!(matches!(rules.validate(), Err(AudaxError::InvalidInput(_))));

        let mut rules = AcpRules::default();
        rules.official_limits[0].max_hours = f64::NAN;
        assert!(matches!(rules.validate(), Err(AudaxError::InvalidInput(_))));

        assert!(AcpRules::default().validate().is_ok());
    }

    #[test]
    fn time_formatting() {
        assert_eq!(format_time(13.5), "13H30");
        assert_eq!(format_time(200.0 / 34.0), "5H53");
        assert_eq!(format_time(0.0), "0H00");
        assert_eq!(format_time(5.9999), "6H00");
    }

    #[test]
    fn time_limits_summary() -> Result<()> {
        let rules = AcpRules::default();
        let limits = rules.time_limits(&brevet(200.0), START)?;
        assert_eq!(limits.brevet_distance_km, 200);
        assert_eq!(limits.official_distance_km, 200);
        assert_eq!(limits.max_time(), "13H30");
        assert_eq!(limits.min_time(), "5H53");
        assert_eq!(limits.max_clock, datetime!(2024-06-01 20:30 UTC));
        Ok(())
    }
}
