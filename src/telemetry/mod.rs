pub mod loader;
pub mod provider;

use std::time::Duration;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub use loader::load_lap_file;
pub use provider::{InMemoryProvider, SessionHandle, SessionKind, TelemetryProvider};

/// A single telemetry measurement along a lap.
///
/// Channels other than `distance` are optional: a provider may be missing any of them
/// for a given sample and the alignment code treats a missing value as undefined
/// rather than zero.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TelemetrySample {
    /// Meters traveled from the start of the lap
    pub distance: f64,
    /// Speed in km/h
    #[serde(default)]
    pub speed: Option<f64>,
    /// Time elapsed since the start of the session
    #[serde(default, with = "optional_seconds")]
    pub session_time: Option<Duration>,
    /// Planar X position
    #[serde(default)]
    pub x: Option<f64>,
    /// Planar Y position
    #[serde(default)]
    pub y: Option<f64>,
}

impl TelemetrySample {
    pub fn new(distance: f64) -> Self {
        Self {
            distance,
            ..Default::default()
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_session_time(mut self, session_time: Duration) -> Self {
        self.session_time = Some(session_time);
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    /// Session time as fractional seconds
    pub fn session_seconds(&self) -> Option<f64> {
        self.session_time.map(|t| t.as_secs_f64())
    }
}

/// Ordered telemetry samples for one driver's lap.
///
/// Samples usually arrive in increasing distance order, but nothing here relies on
/// it: consumers call [`TelemetrySeries::sorted_by_distance`] before resampling.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct TelemetrySeries {
    samples: Vec<TelemetrySample>,
}

impl TelemetrySeries {
    pub fn new(samples: Vec<TelemetrySample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[TelemetrySample] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &TelemetrySample> {
        self.samples.iter()
    }

    /// Samples with a finite distance, stable-sorted by distance ascending.
    pub fn sorted_by_distance(&self) -> Vec<&TelemetrySample> {
        self.samples
            .iter()
            .filter(|s| s.distance.is_finite())
            .sorted_by(|a, b| a.distance.total_cmp(&b.distance))
            .collect()
    }

    /// Minimum and maximum finite distance, `None` for a series without usable samples.
    pub fn distance_range(&self) -> Option<(f64, f64)> {
        self.samples
            .iter()
            .map(|s| s.distance)
            .filter(|d| d.is_finite())
            .minmax_by(|a, b| a.total_cmp(b))
            .into_option()
    }

    /// Lap duration covered by the samples, from the earliest to the latest session time.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = self
            .samples
            .iter()
            .filter_map(|s| s.session_time)
            .minmax()
            .into_option()?;
        Some(last - first)
    }
}

impl From<Vec<TelemetrySample>> for TelemetrySeries {
    fn from(samples: Vec<TelemetrySample>) -> Self {
        Self::new(samples)
    }
}

impl FromIterator<TelemetrySample> for TelemetrySeries {
    fn from_iter<T: IntoIterator<Item = TelemetrySample>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// One recorded lap as exported by a timing feed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LapRecord {
    /// Driver abbreviation, e.g. "VER"
    pub driver: String,
    pub lap_number: u32,
    /// Official lap time. Laps without one (deleted, in/out laps) are never picked as fastest
    #[serde(default)]
    pub lap_time_s: Option<f64>,
    pub samples: TelemetrySeries,
}

/// Serializes `Option<Duration>` as fractional seconds so lap files stay readable.
pub mod optional_seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_some(&d.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<f64>::deserialize(deserializer)?;
        // negative or non-finite timestamps are treated as missing
        Ok(secs.and_then(|s| Duration::try_from_secs_f64(s).ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_by_distance_is_stable() {
        let series = TelemetrySeries::new(vec![
            TelemetrySample::new(20.).with_speed(3.),
            TelemetrySample::new(10.).with_speed(1.),
            TelemetrySample::new(20.).with_speed(4.),
            TelemetrySample::new(10.).with_speed(2.),
        ]);

        let speeds = series
            .sorted_by_distance()
            .iter()
            .map(|s| s.speed.unwrap())
            .collect_vec();
        assert_eq!(speeds, vec![1., 2., 3., 4.]);
    }

    #[test]
    fn test_sorted_by_distance_skips_non_finite() {
        let series = TelemetrySeries::new(vec![
            TelemetrySample::new(f64::NAN),
            TelemetrySample::new(5.),
            TelemetrySample::new(f64::INFINITY),
        ]);

        assert_eq!(series.sorted_by_distance().len(), 1);
        assert_eq!(series.distance_range(), Some((5., 5.)));
    }

    #[test]
    fn test_distance_range() {
        let series: TelemetrySeries = [30., 0., 15.]
            .into_iter()
            .map(TelemetrySample::new)
            .collect();
        assert_eq!(series.distance_range(), Some((0., 30.)));
        assert_eq!(TelemetrySeries::default().distance_range(), None);
    }

    #[test]
    fn test_duration() {
        let series = TelemetrySeries::new(vec![
            TelemetrySample::new(0.).with_session_time(Duration::from_secs(100)),
            TelemetrySample::new(1.),
            TelemetrySample::new(2.).with_session_time(Duration::from_millis(190_500)),
        ]);
        assert_eq!(series.duration(), Some(Duration::from_millis(90_500)));
    }

    #[test]
    fn test_sample_serializes_session_time_as_seconds() {
        let sample = TelemetrySample::new(12.5)
            .with_speed(280.)
            .with_session_time(Duration::from_millis(1500))
            .with_position(1., -2.);
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["session_time"], serde_json::json!(1.5));

        let parsed: TelemetrySample = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, sample);
    }

    #[test]
    fn test_sample_missing_channels_deserialize_as_none() {
        let sample: TelemetrySample =
            serde_json::from_str(r#"{"distance": 3.0, "session_time": null}"#).unwrap();
        assert_eq!(sample, TelemetrySample::new(3.));
    }
}
