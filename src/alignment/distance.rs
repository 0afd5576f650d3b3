use std::time::Duration;

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::GhostlapError;
use crate::telemetry::{TelemetrySample, TelemetrySeries, optional_seconds};

use super::resample::{GRID_POINTS, common_grid, fill_gaps, nearest_values, overlap};

/// A telemetry sample resampled onto the common distance grid.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AlignedSample {
    pub distance: f64,
    pub speed: Option<f64>,
    #[serde(with = "optional_seconds")]
    pub session_time: Option<Duration>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Two laps resampled onto the same distance grid. Index `i` of both series refers to the
/// same distance, so they can be zipped without further lookup.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AlignedPair {
    pub a: Vec<AlignedSample>,
    pub b: Vec<AlignedSample>,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    /// Common distance grid shared by both series
    pub fn distances(&self) -> Vec<f64> {
        self.a.iter().map(|s| s.distance).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AlignedSample, &AlignedSample)> {
        self.a.iter().zip(self.b.iter())
    }
}

/// Aligns two laps on a 500 point distance grid covering the distance both laps share.
pub fn align_by_distance(
    a: &TelemetrySeries,
    b: &TelemetrySeries,
) -> Result<AlignedPair, GhostlapError> {
    align_by_distance_with_grid(a, b, GRID_POINTS)
}

pub fn align_by_distance_with_grid(
    a: &TelemetrySeries,
    b: &TelemetrySeries,
    grid_points: usize,
) -> Result<AlignedPair, GhostlapError> {
    let sorted_a = a.sorted_by_distance();
    let sorted_b = b.sorted_by_distance();
    if sorted_a.is_empty() || sorted_b.is_empty() {
        return Err(GhostlapError::EmptyInput);
    }

    let range_a = a.distance_range().ok_or(GhostlapError::EmptyInput)?;
    let range_b = b.distance_range().ok_or(GhostlapError::EmptyInput)?;
    let (low, high) = overlap(range_a, range_b).ok_or_else(|| GhostlapError::NoOverlap {
        axis: "distance".to_string(),
    })?;
    debug!(
        "Aligning {} and {} samples over {:.1}m..{:.1}m",
        sorted_a.len(),
        sorted_b.len(),
        low,
        high
    );

    let grid = common_grid(low, high, grid_points);
    Ok(AlignedPair {
        a: resample_lap(&sorted_a, &grid),
        b: resample_lap(&sorted_b, &grid),
    })
}

/// Resamples every channel of a distance-sorted lap: nearest sample first, then linear
/// refinement of the grid points whose nearest sample had no value.
fn resample_lap(sorted: &[&TelemetrySample], grid: &[f64]) -> Vec<AlignedSample> {
    let distances = sorted.iter().map(|s| s.distance).collect_vec();
    let channel = |value: fn(&TelemetrySample) -> Option<f64>| {
        let values = sorted.iter().map(|s| value(s)).collect_vec();
        fill_gaps(grid, &nearest_values(&distances, &values, grid))
    };

    let speed = channel(|s| s.speed);
    let x = channel(|s| s.x);
    let y = channel(|s| s.y);
    let session_seconds = channel(TelemetrySample::session_seconds);

    grid.iter()
        .enumerate()
        .map(|(i, distance)| AlignedSample {
            distance: *distance,
            speed: speed[i],
            session_time: session_seconds[i].and_then(|s| Duration::try_from_secs_f64(s).ok()),
            x: x[i],
            y: y[i],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lap(points: &[(f64, f64)]) -> TelemetrySeries {
        points
            .iter()
            .map(|(distance, speed)| {
                TelemetrySample::new(*distance)
                    .with_speed(*speed)
                    .with_session_time(Duration::from_secs_f64(1000. + distance / 50.))
                    .with_position(*distance, -distance)
            })
            .collect()
    }

    #[test]
    fn test_aligned_pair_has_grid_length() {
        let a = lap(&[(0., 100.), (1000., 200.), (2000., 150.)]);
        let b = lap(&[(50., 110.), (900., 210.), (2100., 160.)]);

        let aligned = align_by_distance(&a, &b).unwrap();
        assert_eq!(aligned.a.len(), GRID_POINTS);
        assert_eq!(aligned.b.len(), GRID_POINTS);
        assert_eq!(aligned.a[0].distance, 50.);
        assert_eq!(aligned.a[GRID_POINTS - 1].distance, 2000.);
    }

    #[test]
    fn test_index_correspondence() {
        let a = lap(&[(0., 100.), (400., 200.), (800., 150.)]);
        let b = lap(&[(10., 110.), (350., 210.), (700., 160.), (820., 90.)]);

        let aligned = align_by_distance(&a, &b).unwrap();
        for (sa, sb) in aligned.iter() {
            assert_eq!(sa.distance, sb.distance);
        }
        assert!(aligned.distances().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_disjoint_ranges_fail_with_no_overlap() {
        let a = lap(&[(0., 100.), (10., 100.)]);
        let b = lap(&[(20., 100.), (30., 100.)]);

        assert!(matches!(
            align_by_distance(&a, &b),
            Err(GhostlapError::NoOverlap { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        let b = lap(&[(0., 100.), (10., 100.)]);

        assert!(matches!(
            align_by_distance(&TelemetrySeries::default(), &b),
            Err(GhostlapError::EmptyInput)
        ));
        assert!(matches!(
            align_by_distance(&b, &TelemetrySeries::default()),
            Err(GhostlapError::EmptyInput)
        ));
    }

    #[test]
    fn test_single_point_laps_do_not_overlap() {
        let a = lap(&[(5., 100.)]);
        let b = lap(&[(5., 100.)]);
        assert!(matches!(
            align_by_distance(&a, &b),
            Err(GhostlapError::NoOverlap { .. })
        ));
    }

    #[test]
    fn test_values_come_from_nearest_sample() {
        let a = lap(&[(0., 100.), (10., 200.)]);
        let b = lap(&[(0., 300.), (10., 400.)]);

        let aligned = align_by_distance_with_grid(&a, &b, 5).unwrap();
        let speeds = aligned.a.iter().map(|s| s.speed.unwrap()).collect_vec();
        // 0, 2.5 -> first sample; 5 is a tie and goes to the farther sample
        assert_eq!(speeds, vec![100., 100., 200., 200., 200.]);
    }

    #[test]
    fn test_unsorted_input_is_sorted_before_alignment() {
        let a = lap(&[(10., 200.), (0., 100.)]);
        let b = lap(&[(0., 300.), (10., 400.)]);

        let aligned = align_by_distance_with_grid(&a, &b, 3).unwrap();
        assert_eq!(aligned.a[0].speed, Some(100.));
        assert_eq!(aligned.a[2].speed, Some(200.));
    }

    #[test]
    fn test_missing_values_are_refined_by_interpolation() {
        let a = TelemetrySeries::new(vec![
            TelemetrySample::new(0.).with_speed(100.),
            TelemetrySample::new(10.),
            TelemetrySample::new(20.),
            TelemetrySample::new(30.).with_speed(160.),
        ]);
        let b = lap(&[(0., 300.), (30., 400.)]);

        let aligned = align_by_distance_with_grid(&a, &b, 4).unwrap();
        let speeds = aligned.a.iter().map(|s| s.speed).collect_vec();
        assert_eq!(speeds, vec![Some(100.), Some(120.), Some(140.), Some(160.)]);
        // no position data at all stays undefined
        assert!(aligned.a.iter().all(|s| s.x.is_none() && s.y.is_none()));
    }

    #[test]
    fn test_session_time_is_resampled_as_duration() {
        let a = TelemetrySeries::new(vec![
            TelemetrySample::new(0.).with_session_time(Duration::from_secs(60)),
            TelemetrySample::new(10.),
            TelemetrySample::new(20.).with_session_time(Duration::from_secs(62)),
        ]);
        let b = lap(&[(0., 300.), (20., 400.)]);

        let aligned = align_by_distance_with_grid(&a, &b, 3).unwrap();
        let times = aligned.a.iter().map(|s| s.session_time).collect_vec();
        assert_eq!(
            times,
            vec![
                Some(Duration::from_secs(60)),
                Some(Duration::from_secs(61)),
                Some(Duration::from_secs(62))
            ]
        );
    }

    #[test]
    fn test_inputs_are_not_modified() {
        let a = lap(&[(10., 200.), (0., 100.)]);
        let b = lap(&[(0., 300.), (10., 400.)]);
        let before = a.clone();

        align_by_distance(&a, &b).unwrap();
        assert_eq!(a, before);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_aligned_pair_is_index_aligned(
            start_a in 0.0f64..100.0f64,
            start_b in 0.0f64..100.0f64,
            len_a in 2usize..200,
            len_b in 2usize..200,
            step_a in 1.0f64..30.0f64,
            step_b in 1.0f64..30.0f64,
        ) {
            let a = lap(&(0..len_a).map(|i| (start_a + i as f64 * step_a, 200.)).collect_vec());
            let b = lap(&(0..len_b).map(|i| (start_b + i as f64 * step_b, 210.)).collect_vec());
            let high = (start_a + (len_a - 1) as f64 * step_a).min(start_b + (len_b - 1) as f64 * step_b);
            let low = start_a.max(start_b);
            prop_assume!(low < high);

            let aligned = align_by_distance(&a, &b).unwrap();
            prop_assert_eq!(aligned.a.len(), GRID_POINTS);
            prop_assert_eq!(aligned.b.len(), GRID_POINTS);
            for (sa, sb) in aligned.iter() {
                prop_assert_eq!(sa.distance, sb.distance);
            }
            prop_assert!((aligned.a[0].distance - low).abs() < 1e-9);
            prop_assert!((aligned.a[GRID_POINTS - 1].distance - high).abs() < 1e-9);
        }
    }
}
