use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::GhostlapError;
use crate::telemetry::{TelemetrySample, TelemetrySeries};

use super::resample::{GRID_POINTS, common_grid, interpolate, overlap};

/// Car position at one instant of the replay
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct GhostFrame {
    /// Seconds since the start of the lap
    pub time: f64,
    pub x: f64,
    pub y: f64,
}

/// Car positions sampled on the shared replay clock.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PositionTrack {
    frames: Vec<GhostFrame>,
}

impl PositionTrack {
    pub fn frames(&self) -> &[GhostFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The trail drawn at animation frame `frame`: every position up to and including it.
    pub fn prefix(&self, frame: usize) -> &[GhostFrame] {
        &self.frames[..frame.saturating_add(1).min(self.frames.len())]
    }
}

/// Fixed plot bounds that keep both cars in view for the whole replay.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrackBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl TrackBounds {
    pub fn from_tracks(a: &PositionTrack, b: &PositionTrack) -> Option<Self> {
        let frames = a.frames.iter().chain(b.frames.iter());
        let (x_min, x_max) = frames
            .clone()
            .map(|f| f.x)
            .minmax_by(|l, r| l.total_cmp(r))
            .into_option()?;
        let (y_min, y_max) = frames
            .map(|f| f.y)
            .minmax_by(|l, r| l.total_cmp(r))
            .into_option()?;
        Some(Self {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }
}

/// Resamples both cars' positions onto one elapsed-time clock so frame `i` of each track
/// shows where the car was at the same moment of its lap.
pub fn ghost_positions(
    a: &TelemetrySeries,
    b: &TelemetrySeries,
) -> Result<(PositionTrack, PositionTrack), GhostlapError> {
    ghost_positions_with_grid(a, b, GRID_POINTS)
}

pub fn ghost_positions_with_grid(
    a: &TelemetrySeries,
    b: &TelemetrySeries,
    grid_points: usize,
) -> Result<(PositionTrack, PositionTrack), GhostlapError> {
    let lap_a = ElapsedPositions::from_series(a).ok_or(GhostlapError::EmptyInput)?;
    let lap_b = ElapsedPositions::from_series(b).ok_or(GhostlapError::EmptyInput)?;

    let (low, high) =
        overlap(lap_a.range(), lap_b.range()).ok_or_else(|| GhostlapError::NoOverlap {
            axis: "elapsed time".to_string(),
        })?;
    debug!("Ghost replay covers {:.3}s..{:.3}s", low, high);

    let clock = common_grid(low, high, grid_points);
    Ok((lap_a.resample(&clock), lap_b.resample(&clock)))
}

/// Positions of one lap keyed by seconds since its first sample, ascending.
struct ElapsedPositions {
    elapsed: Vec<f64>,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl ElapsedPositions {
    fn from_series(series: &TelemetrySeries) -> Option<Self> {
        // The clock starts with the lap, even if the first positions arrive later
        let start = series.iter().find_map(TelemetrySample::session_seconds)?;
        let usable = series
            .iter()
            .filter_map(|s| Some((s.session_seconds()? - start, s.x?, s.y?)))
            .collect_vec();
        if usable.is_empty() {
            return None;
        }
        let (elapsed, x, y): (Vec<f64>, Vec<f64>, Vec<f64>) = usable
            .into_iter()
            .sorted_by(|l, r| l.0.total_cmp(&r.0))
            .multiunzip();
        Some(Self { elapsed, x, y })
    }

    fn range(&self) -> (f64, f64) {
        (self.elapsed[0], self.elapsed[self.elapsed.len() - 1])
    }

    fn resample(&self, clock: &[f64]) -> PositionTrack {
        let frames = clock
            .iter()
            .filter_map(|t| {
                Some(GhostFrame {
                    time: *t,
                    x: interpolate(&self.elapsed, &self.x, *t)?,
                    y: interpolate(&self.elapsed, &self.y, *t)?,
                })
            })
            .collect();
        PositionTrack { frames }
    }
}
