use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::GhostlapError;
use crate::telemetry::TelemetrySeries;

use super::resample::{GRID_POINTS, common_grid, nearest_values, overlap, rezero};

/// Time gap at one point of the lap. Positive means driver B is behind driver A.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct DeltaPoint {
    pub distance: f64,
    pub delta_s: f64,
}

pub type DeltaSeries = Vec<DeltaPoint>;

/// Elapsed-time difference (B minus A) along the distance both laps share.
///
/// Session times are looked up with the nearest sample only and grid points where
/// either lap has no session time are dropped from the result. Each lap is measured
/// from its own first retained point, so the laps' absolute start times do not matter.
pub fn time_delta(a: &TelemetrySeries, b: &TelemetrySeries) -> Result<DeltaSeries, GhostlapError> {
    time_delta_with_grid(a, b, GRID_POINTS)
}

pub fn time_delta_with_grid(
    a: &TelemetrySeries,
    b: &TelemetrySeries,
    grid_points: usize,
) -> Result<DeltaSeries, GhostlapError> {
    let sorted_a = a.sorted_by_distance();
    let sorted_b = b.sorted_by_distance();
    if sorted_a.is_empty() || sorted_b.is_empty() {
        return Err(GhostlapError::EmptySeries);
    }

    let (low, high) = overlap(
        a.distance_range().ok_or(GhostlapError::EmptySeries)?,
        b.distance_range().ok_or(GhostlapError::EmptySeries)?,
    )
    .ok_or_else(|| GhostlapError::NoOverlap {
        axis: "distance".to_string(),
    })?;
    let grid = common_grid(low, high, grid_points);

    let times_a = nearest_values(
        &sorted_a.iter().map(|s| s.distance).collect_vec(),
        &sorted_a.iter().map(|s| s.session_seconds()).collect_vec(),
        &grid,
    );
    let times_b = nearest_values(
        &sorted_b.iter().map(|s| s.distance).collect_vec(),
        &sorted_b.iter().map(|s| s.session_seconds()).collect_vec(),
        &grid,
    );

    let (distances, retained_a, retained_b): (Vec<f64>, Vec<f64>, Vec<f64>) = grid
        .iter()
        .zip(times_a.iter().zip(times_b.iter()))
        .filter_map(|(d, (ta, tb))| Some((*d, (*ta)?, (*tb)?)))
        .multiunzip();
    if distances.is_empty() {
        return Err(GhostlapError::NoValidPoints);
    }
    if distances.len() < grid.len() {
        debug!(
            "Dropped {} grid points without session time",
            grid.len() - distances.len()
        );
    }

    let elapsed_a = rezero(&retained_a);
    let elapsed_b = rezero(&retained_b);
    Ok(distances
        .into_iter()
        .zip(elapsed_a.iter().zip(elapsed_b.iter()))
        .map(|(distance, (ea, eb))| DeltaPoint {
            distance,
            delta_s: eb - ea,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::TelemetrySample;
    use std::time::Duration;

    fn timed_lap(points: &[(f64, f64)]) -> TelemetrySeries {
        points
            .iter()
            .map(|(distance, t)| {
                TelemetrySample::new(*distance).with_session_time(Duration::from_secs_f64(*t))
            })
            .collect()
    }

    #[test]
    fn test_delta_sign_convention() {
        let a = timed_lap(&[(0., 100.), (100., 101.), (200., 102.)]);
        let b = timed_lap(&[(0., 200.), (100., 201.5), (200., 202.5)]);

        let delta = time_delta_with_grid(&a, &b, 3).unwrap();
        assert_eq!(delta.len(), 3);
        assert!(delta[0].delta_s.abs() < 1e-9);
        assert!((delta[1].delta_s - 0.5).abs() < 1e-9);
        assert!((delta[2].delta_s - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_constant_gap_on_full_grid() {
        // B starts half a second later than A relative to the lap start and keeps the gap
        let a = timed_lap(&[(0., 10.), (100., 11.), (200., 12.)]);
        let b = timed_lap(&[(0., 20.), (100., 21.5), (200., 22.5)]);

        let delta = time_delta(&a, &b).unwrap();
        assert_eq!(delta.len(), GRID_POINTS);
        // the nearest sample of every point past the first quarter is 100m or 200m
        for point in delta.iter().filter(|p| p.distance > 50.) {
            assert!((point.delta_s - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_absolute_offset_is_ignored() {
        let b = timed_lap(&[(0., 300.), (100., 301.2), (200., 302.9)]);
        let a = timed_lap(&[(0., 360.), (100., 361.2), (200., 362.9)]);

        let delta = time_delta(&a, &b).unwrap();
        assert!(delta.iter().all(|p| p.delta_s.abs() < 1e-9));
    }

    #[test]
    fn test_undefined_points_are_dropped_from_both_series() {
        let a: TelemetrySeries = (0..GRID_POINTS)
            .map(|i| {
                let sample = TelemetrySample::new(i as f64);
                if i == 3 || i == 7 {
                    sample
                } else {
                    sample.with_session_time(Duration::from_secs_f64(50. + i as f64 * 0.1))
                }
            })
            .collect();
        let b = timed_lap(
            &(0..GRID_POINTS)
                .map(|i| (i as f64, 80. + i as f64 * 0.1))
                .collect_vec(),
        );

        let delta = time_delta(&a, &b).unwrap();
        assert_eq!(delta.len(), GRID_POINTS - 2);
        let distances = delta.iter().map(|p| p.distance).collect_vec();
        assert!(!distances.contains(&3.));
        assert!(!distances.contains(&7.));
        assert!(distances.contains(&4.));
        assert!(delta.iter().all(|p| p.delta_s.abs() < 1e-6));
    }

    #[test]
    fn test_no_valid_points() {
        let a: TelemetrySeries = [0., 100.].into_iter().map(TelemetrySample::new).collect();
        let b = timed_lap(&[(0., 10.), (100., 11.)]);

        assert!(matches!(
            time_delta(&a, &b),
            Err(GhostlapError::NoValidPoints)
        ));
    }

    #[test]
    fn test_empty_series() {
        let b = timed_lap(&[(0., 10.), (100., 11.)]);
        assert!(matches!(
            time_delta(&TelemetrySeries::default(), &b),
            Err(GhostlapError::EmptySeries)
        ));
    }

    #[test]
    fn test_no_overlap() {
        let a = timed_lap(&[(0., 10.), (10., 11.)]);
        let b = timed_lap(&[(20., 10.), (30., 11.)]);
        assert!(matches!(
            time_delta(&a, &b),
            Err(GhostlapError::NoOverlap { .. })
        ));
    }

    #[test]
    fn test_same_lap_gives_zero_delta() {
        let a = timed_lap(&[(0., 10.), (150., 12.2), (300., 14.1)]);
        let delta = time_delta(&a, &a).unwrap();
        assert_eq!(delta.len(), GRID_POINTS);
        assert!(delta.iter().all(|p| p.delta_s == 0.));
    }
}
