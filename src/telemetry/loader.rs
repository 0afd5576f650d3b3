use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::{InMemoryProvider, LapRecord, SessionHandle};
use crate::GhostlapError;

/// One line of a lap export file.
///
/// A `Session` line switches the session that the following `Lap` lines belong to.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum LapFileEntry {
    Session(SessionHandle),
    Lap(LapRecord),
}

/// Loads a JSONL lap export into an in-memory provider.
pub fn load_lap_file(source_file: &Path) -> Result<InMemoryProvider, GhostlapError> {
    if !source_file.exists() {
        return Err(GhostlapError::InvalidTelemetryFile {
            path: format!("{:?}", source_file),
        });
    }

    let entries = serde_jsonlines::json_lines(source_file)
        .map_err(|e| GhostlapError::TelemetryLoaderError { source: e })?
        .collect::<Result<Vec<LapFileEntry>, std::io::Error>>()
        .map_err(|e| GhostlapError::TelemetryLoaderError { source: e })?;

    let mut provider = InMemoryProvider::new();
    let mut cur_session: Option<SessionHandle> = None;
    for entry in entries {
        match entry {
            LapFileEntry::Session(session) => cur_session = Some(session),
            LapFileEntry::Lap(lap) => {
                let Some(session) = cur_session else {
                    warn!(
                        "Lap {} of {} appears before any session line",
                        lap.lap_number, lap.driver
                    );
                    return Err(GhostlapError::InvalidTelemetryFile {
                        path: format!("{:?}", source_file),
                    });
                };
                provider.add_lap(session, lap);
            }
        }
    }

    info!(
        "Loaded {:?}, found {} sessions with a total of {} laps",
        source_file,
        provider.sessions().count(),
        provider.lap_count()
    );
    Ok(provider)
}
