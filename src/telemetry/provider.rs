use std::collections::HashMap;
use std::fmt::Display;

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::GhostlapError;

use super::{LapRecord, TelemetrySeries};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SessionKind {
    Practice(u8),
    Qualifying,
    Sprint,
    Race,
}

impl Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionKind::Practice(n) => write!(f, "FP{}", n),
            SessionKind::Qualifying => write!(f, "Q"),
            SessionKind::Sprint => write!(f, "S"),
            SessionKind::Race => write!(f, "R"),
        }
    }
}

/// Identifies one session of an event, e.g. qualifying of round 5 in 2024.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    pub season: u16,
    pub round: u32,
    pub kind: SessionKind,
}

impl SessionHandle {
    pub fn qualifying(season: u16, round: u32) -> Self {
        Self {
            season,
            round,
            kind: SessionKind::Qualifying,
        }
    }
}

impl Display for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} round {} {}", self.season, self.round, self.kind)
    }
}

/// Source of per-driver lap telemetry.
///
/// Implementations own fetching and caching of session data; the alignment code only
/// ever sees the [`TelemetrySeries`] they return.
pub trait TelemetryProvider {
    /// Telemetry of the driver's fastest timed lap in the session.
    ///
    /// Returns `Ok(None)` when the driver has no valid timed lap in the session.
    fn fastest_lap_telemetry(
        &self,
        session: &SessionHandle,
        driver: &str,
    ) -> Result<Option<TelemetrySeries>, GhostlapError>;

    /// Drivers that set at least one lap in the session, sorted alphabetically.
    fn drivers(&self, session: &SessionHandle) -> Result<Vec<String>, GhostlapError>;
}

/// Provider backed by laps already held in memory, typically loaded from a lap file.
#[derive(Default, Clone, Debug)]
pub struct InMemoryProvider {
    sessions: HashMap<SessionHandle, Vec<LapRecord>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_lap(&mut self, session: SessionHandle, lap: LapRecord) {
        self.sessions.entry(session).or_default().push(lap);
    }

    pub fn sessions(&self) -> impl Iterator<Item = &SessionHandle> {
        self.sessions.keys()
    }

    pub fn lap_count(&self) -> usize {
        self.sessions.values().map(Vec::len).sum()
    }

    /// Fastest timed lap of a driver. Ties are won by the earlier lap.
    pub fn fastest_lap(&self, session: &SessionHandle, driver: &str) -> Option<&LapRecord> {
        self.sessions
            .get(session)?
            .iter()
            .filter(|lap| lap.driver == driver)
            .filter(|lap| lap.lap_time_s.is_some_and(|t| t.is_finite() && t > 0.))
            .min_by(|a, b| {
                a.lap_time_s
                    .unwrap_or(f64::INFINITY)
                    .total_cmp(&b.lap_time_s.unwrap_or(f64::INFINITY))
                    .then(a.lap_number.cmp(&b.lap_number))
            })
    }
}

impl TelemetryProvider for InMemoryProvider {
    fn fastest_lap_telemetry(
        &self,
        session: &SessionHandle,
        driver: &str,
    ) -> Result<Option<TelemetrySeries>, GhostlapError> {
        let lap = self.fastest_lap(session, driver);
        match lap {
            Some(lap) => debug!(
                "Fastest lap for {} in {}: lap {} ({:?}s, {} samples)",
                driver,
                session,
                lap.lap_number,
                lap.lap_time_s,
                lap.samples.len()
            ),
            None => debug!("No timed lap for {} in {}", driver, session),
        }
        Ok(lap.map(|l| l.samples.clone()))
    }

    fn drivers(&self, session: &SessionHandle) -> Result<Vec<String>, GhostlapError> {
        Ok(self
            .sessions
            .get(session)
            .map(|laps| {
                laps.iter()
                    .map(|lap| lap.driver.clone())
                    .unique()
                    .sorted()
                    .collect()
            })
            .unwrap_or_default())
    }
}
