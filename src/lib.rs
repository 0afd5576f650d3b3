// Library interface for ghostlap
// This allows integration tests and benches to access internal modules

pub mod alignment;
pub mod comparison;
pub mod config;
pub mod errors;
pub mod telemetry;
pub mod writer;

// Re-export commonly used types
pub use alignment::{
    AlignedPair, DeltaSeries, PositionTrack, TrackBounds, align_by_distance, ghost_positions,
    time_delta,
};
pub use comparison::{LapComparison, PlotOutcome, compare_fastest_laps, fastest_lap_delta};
pub use config::ComparisonConfig;
pub use errors::GhostlapError;
pub use telemetry::{
    InMemoryProvider, LapRecord, SessionHandle, SessionKind, TelemetryProvider, TelemetrySample,
    TelemetrySeries,
};
