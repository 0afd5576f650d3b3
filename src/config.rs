use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::GhostlapError;
use crate::alignment::GRID_POINTS;

const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Points in every common distance and time grid
    pub grid_points: usize,
    /// Indent the JSON report
    pub pretty_output: bool,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            grid_points: GRID_POINTS,
            pretty_output: false,
        }
    }
}

impl ComparisonConfig {
    pub fn default_path() -> Result<PathBuf, GhostlapError> {
        Ok(dirs::config_dir()
            .ok_or(GhostlapError::NoConfigDir)?
            .join("ghostlap")
            .join(CONFIG_FILE_NAME))
    }

    /// Config saved in the user config directory, if there is a readable one.
    pub fn from_local_file() -> Option<Self> {
        let config_path = Self::default_path().ok()?;
        if !config_path.exists() {
            return None;
        }
        match Self::from_file(&config_path) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Ignoring config file {:?}: {}", config_path, e);
                None
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, GhostlapError> {
        let file =
            std::fs::File::open(path).map_err(|e| GhostlapError::ConfigIOError { source: e })?;
        let config: Self = serde_json::from_reader(file)
            .map_err(|e| GhostlapError::ConfigSerializeError { source: e })?;
        config.validate()?;
        debug!("Loaded config from {:?}: {:?}", path, config);
        Ok(config)
    }

    pub fn save(&self) -> Result<(), GhostlapError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), GhostlapError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| GhostlapError::ConfigIOError { source: e })?;
            }
        }

        let file =
            std::fs::File::create(path).map_err(|e| GhostlapError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| GhostlapError::ConfigSerializeError { source: e })
    }

    pub fn validate(&self) -> Result<(), GhostlapError> {
        if self.grid_points < 2 {
            return Err(GhostlapError::InvalidConfig {
                reason: format!(
                    "grid_points must be at least 2, got {}",
                    self.grid_points
                ),
            });
        }
        Ok(())
    }
}
