//! Chooses the distances at which control times are calculated.

use crate::{
    error::{require_distance, AudaxError, Result},
    model::Checkpoint,
};

/// The interval used when the caller does not choose one.
pub const DEFAULT_INTERVAL_KM: f64 = 50.0;

/// How the control distances are chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlPointMode {
    /// A control every `interval_km`, plus the finish.
    RegularInterval { interval_km: f64 },
    /// A control at every checkpoint, plus the start and finish.
    Checkpoints,
}

impl Default for ControlPointMode {
    fn default() -> Self {
        ControlPointMode::RegularInterval {
            interval_km: DEFAULT_INTERVAL_KM,
        }
    }
}

/// Returns the control distances for `mode`. The list always starts at 0
/// and ends at `total_km`.
pub fn control_point_distances(
    mode: ControlPointMode,
    checkpoints: &[Checkpoint],
    total_km: f64,
) -> Result<Vec<f64>> {
    match mode {
        ControlPointMode::RegularInterval { interval_km } => {
            regular_interval_distances(total_km, interval_km)
        }
        ControlPointMode::Checkpoints => checkpoint_distances(checkpoints, total_km),
    }
}

/// Returns 0, then every multiple of `interval_km` below `total_km`, then
/// `total_km` itself.
pub fn regular_interval_distances(total_km: f64, interval_km: f64) -> Result<Vec<f64>> {
    let total_km = require_distance("Total distance", total_km)?;
    if !(interval_km.is_finite() && interval_km > 0.0) {
        return Err(AudaxError::InvalidInput(format!(
            "Control interval must be a positive number of km, got {interval_km}"
        )));
    }

    let mut distances = vec![0.0];
    let mut km = interval_km;
    while km < total_km {
        distances.push(km);
        km += interval_km;
    }

    push_finish(&mut distances, total_km);
    Ok(distances)
}

/// Returns 0, every distinct positive checkpoint distance, and `total_km`,
/// in ascending order.
pub fn checkpoint_distances(checkpoints: &[Checkpoint], total_km: f64) -> Result<Vec<f64>> {
    let total_km = require_distance("Total distance", total_km)?;

    let mut distances = vec![0.0];
    for cp in checkpoints {
        if cp.distance_km > 0.0 && !distances.contains(&cp.distance_km) {
            distances.push(cp.distance_km);
        }
    }
    distances.sort_by(|a, b| a.total_cmp(b));

    push_finish(&mut distances, total_km);
    Ok(distances)
}

fn push_finish(distances: &mut Vec<f64>, total_km: f64) {
    if distances.last() != Some(&total_km) {
        distances.push(total_km);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cp(distance_km: f64) -> Checkpoint {
        Checkpoint {
            lat: 0.0,
            lon: 0.0,
            name: format!("CP at {distance_km}"),
            description: None,
            distance_km,
        }
    }

    #[test]
    fn regular_interval() {
        assert_eq!(
            regular_interval_distances(205.3, 50.0).unwrap(),
            [0.0, 50.0, 100.0, 150.0, 200.0, 205.3]
        );
    }

    #[test]
    fn regular_interval_landing_on_the_finish() {
        assert_eq!(
            regular_interval_distances(200.0, 50.0).unwrap(),
            [0.0, 50.0, 100.0, 150.0, 200.0]
        );
    }

    #[test]
    fn regular_interval_on_a_short_route() {
        assert_eq!(regular_interval_distances(30.0, 50.0).unwrap(), [0.0, 30.0]);
    }

    #[test]
    fn bad_interval_is_rejected() {
        for interval in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                regular_interval_distances(200.0, interval),
                Err(AudaxError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn checkpoint_derived_always_has_start_and_finish() {
        let distances = checkpoint_distances(&[cp(120.5), cp(60.2)], 203.7).unwrap();
        assert_eq!(distances, [0.0, 60.2, 120.5, 203.7]);

        assert_eq!(checkpoint_distances(&[], 203.7).unwrap(), [0.0, 203.7]);
    }

    #[test]
    fn checkpoints_at_start_finish_or_repeated_are_not_duplicated() {
        let distances =
            checkpoint_distances(&[cp(0.0), cp(80.0), cp(80.0), cp(203.7)], 203.7).unwrap();
        assert_eq!(distances, [0.0, 80.0, 203.7]);
    }

    #[test]
    fn mode_dispatch() {
        let cps = [cp(42.0)];
        assert_eq!(
            control_point_distances(ControlPointMode::Checkpoints, &cps, 100.0).unwrap(),
            [0.0, 42.0, 100.0]
        );
        assert_eq!(
            control_point_distances(ControlPointMode::default(), &cps, 100.0).unwrap(),
            [0.0, 50.0, 100.0]
        );
    }
}
