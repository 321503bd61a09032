use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::grid::{DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, Grid};
use crate::mode::GameMode;
use crate::session::{MAX_INITIAL_LENGTH, MIN_INITIAL_LENGTH, max_fitting_length};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings file {path:?}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// User-facing configuration, loadable from YAML. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub grid_width: i16,
    pub grid_height: i16,
    /// Time between simulation steps.
    pub tick_interval_ms: u64,
    pub initial_length: usize,
    pub start_mode: GameMode,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            tick_interval_ms: 150,
            initial_length: 3,
            start_mode: GameMode::Classic,
            log_file: None,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_yaml_ng::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(10..=100).contains(&self.grid_width) {
            return Err(SettingsError::Invalid("grid width must be between 10 and 100".to_string()));
        }
        if !(10..=100).contains(&self.grid_height) {
            return Err(SettingsError::Invalid("grid height must be between 10 and 100".to_string()));
        }
        if !(50..=1000).contains(&self.tick_interval_ms) {
            return Err(SettingsError::Invalid("tick interval must be between 50ms and 1000ms".to_string()));
        }
        if !(MIN_INITIAL_LENGTH..=MAX_INITIAL_LENGTH).contains(&self.initial_length) {
            return Err(SettingsError::Invalid(format!(
                "initial length must be between {} and {}",
                MIN_INITIAL_LENGTH, MAX_INITIAL_LENGTH
            )));
        }
        // The snake starts a quarter of the way across and trails to the left
        if max_fitting_length(&self.grid()) < self.initial_length {
            return Err(SettingsError::Invalid(format!(
                "a snake of length {} does not fit a grid {} wide",
                self.initial_length, self.grid_width
            )));
        }
        Ok(())
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.grid_width, self.grid_height)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
