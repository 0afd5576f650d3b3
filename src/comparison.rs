// Runs a full fastest-lap comparison between two drivers through a telemetry provider

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::GhostlapError;
use crate::alignment::{
    AlignedPair, DeltaSeries, PositionTrack, TrackBounds, align_by_distance_with_grid,
    ghost_positions_with_grid, time_delta_with_grid,
};
use crate::config::ComparisonConfig;
use crate::telemetry::{SessionHandle, TelemetryProvider, TelemetrySeries};

/// Result of one plot of the comparison. A plot that cannot be produced carries the
/// reason so the caller can show a warning instead.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum PlotOutcome<T> {
    Ready(T),
    Unavailable { reason: String },
}

impl<T> PlotOutcome<T> {
    fn from_result(plot: &str, result: Result<T, GhostlapError>) -> Result<Self, GhostlapError> {
        match result {
            Ok(value) => Ok(PlotOutcome::Ready(value)),
            Err(e) if e.is_recoverable() => {
                warn!("Skipping {} plot: {}", plot, e);
                Ok(PlotOutcome::Unavailable {
                    reason: e.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            PlotOutcome::Ready(value) => Some(value),
            PlotOutcome::Unavailable { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PlotOutcome::Ready(_))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GhostReplay {
    pub a: PositionTrack,
    pub b: PositionTrack,
    pub bounds: Option<TrackBounds>,
}

/// Everything the rendering layer needs to draw a head to head comparison.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LapComparison {
    pub session: SessionHandle,
    pub driver_a: String,
    pub driver_b: String,
    pub speed: PlotOutcome<AlignedPair>,
    pub delta: PlotOutcome<DeltaSeries>,
    pub ghost: PlotOutcome<GhostReplay>,
}

fn fetch_fastest_lap(
    provider: &impl TelemetryProvider,
    session: &SessionHandle,
    driver: &str,
) -> Result<TelemetrySeries, GhostlapError> {
    provider
        .fastest_lap_telemetry(session, driver)?
        .ok_or_else(|| GhostlapError::NoLap {
            driver: driver.to_string(),
        })
}

/// Time delta between two drivers' fastest laps in a session.
pub fn fastest_lap_delta(
    provider: &impl TelemetryProvider,
    session: &SessionHandle,
    driver_a: &str,
    driver_b: &str,
    config: &ComparisonConfig,
) -> Result<DeltaSeries, GhostlapError> {
    let lap_a = fetch_fastest_lap(provider, session, driver_a)?;
    let lap_b = fetch_fastest_lap(provider, session, driver_b)?;
    time_delta_with_grid(&lap_a, &lap_b, config.grid_points)
}

/// Compares two drivers' fastest laps.
///
/// Fails with [`GhostlapError::NoLap`] when either driver has no timed lap. Alignment
/// failures of the individual plots do not fail the comparison, they are reported as
/// [`PlotOutcome::Unavailable`].
pub fn compare_fastest_laps(
    provider: &impl TelemetryProvider,
    session: &SessionHandle,
    driver_a: &str,
    driver_b: &str,
    config: &ComparisonConfig,
) -> Result<LapComparison, GhostlapError> {
    let lap_a = fetch_fastest_lap(provider, session, driver_a)?;
    let lap_b = fetch_fastest_lap(provider, session, driver_b)?;
    info!(
        "Comparing {} ({} samples) with {} ({} samples) in {}",
        driver_a,
        lap_a.len(),
        driver_b,
        lap_b.len(),
        session
    );

    let speed = PlotOutcome::from_result(
        "speed",
        align_by_distance_with_grid(&lap_a, &lap_b, config.grid_points),
    )?;
    let delta = PlotOutcome::from_result(
        "delta",
        time_delta_with_grid(&lap_a, &lap_b, config.grid_points),
    )?;
    let ghost = PlotOutcome::from_result(
        "ghost",
        ghost_positions_with_grid(&lap_a, &lap_b, config.grid_points).map(|(a, b)| {
            GhostReplay {
                bounds: TrackBounds::from_tracks(&a, &b),
                a,
                b,
            }
        }),
    )?;

    Ok(LapComparison {
        session: *session,
        driver_a: driver_a.to_string(),
        driver_b: driver_b.to_string(),
        speed,
        delta,
        ghost,
    })
}
