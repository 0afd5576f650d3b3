use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::info;

use crate::{GhostlapError, comparison::LapComparison};

/// Serializes a comparison report as JSON into any writer.
pub fn write_report_to(
    writer: impl Write,
    comparison: &LapComparison,
    pretty: bool,
) -> Result<(), GhostlapError> {
    let mut report_writer = BufWriter::new(writer);
    let serialized = if pretty {
        serde_json::to_writer_pretty(&mut report_writer, comparison)
    } else {
        serde_json::to_writer(&mut report_writer, comparison)
    };
    serialized.map_err(|e| GhostlapError::ReportSerializeError { source: e })?;
    writeln!(report_writer).map_err(|e| GhostlapError::WriterError { source: e })?;
    report_writer
        .flush()
        .map_err(|e| GhostlapError::WriterError { source: e })?;
    Ok(())
}

pub fn write_report(
    file: &Path,
    comparison: &LapComparison,
    pretty: bool,
) -> Result<(), GhostlapError> {
    let report_file = File::create(file).map_err(|e| GhostlapError::WriterError { source: e })?;
    write_report_to(report_file, comparison, pretty)?;
    info!("Wrote comparison report to {:?}", file);
    Ok(())
}
