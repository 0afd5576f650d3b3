// Error types for ghostlap

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum GhostlapError {
    // Alignment errors. These never abort a comparison, the caller skips the plot.
    #[snafu(display("One or both telemetry series have no samples"))]
    EmptyInput,
    #[snafu(display("One or both telemetry series have no distance samples"))]
    EmptySeries,
    #[snafu(display("Telemetry {axis} ranges do not overlap"))]
    NoOverlap { axis: String },
    #[snafu(display("No common grid points left after dropping undefined samples"))]
    NoValidPoints,
    #[snafu(display("Driver {driver} did not complete a valid timed lap"))]
    NoLap { driver: String },

    // Errors for the lap file loader
    #[snafu(display("Invalid telemetry file: {path}"))]
    InvalidTelemetryFile { path: String },
    #[snafu(display("Error loading telemetry file"))]
    TelemetryLoaderError { source: io::Error },

    // Errors for the report writer
    #[snafu(display("Error writing comparison report"))]
    WriterError { source: io::Error },
    #[snafu(display("Error serializing comparison report"))]
    ReportSerializeError { source: serde_json::Error },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },
    #[snafu(display("Invalid configuration: {reason}"))]
    InvalidConfig { reason: String },

    // User input validation errors
    #[snafu(display("Invalid user input: {field} - {reason}"))]
    InvalidUserInput { field: String, reason: String },
}

impl GhostlapError {
    /// Whether the error only means "these two laps cannot be compared".
    ///
    /// Recoverable errors are shown to the user as a warning and the corresponding
    /// plot is skipped; everything else is a real failure of the tool.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GhostlapError::EmptyInput
                | GhostlapError::EmptySeries
                | GhostlapError::NoOverlap { .. }
                | GhostlapError::NoValidPoints
                | GhostlapError::NoLap { .. }
        )
    }
}
