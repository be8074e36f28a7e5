use std::fs;
use std::path::{Path, PathBuf};

use anygpt_types::{ConfigError, Settings};
use tracing::debug;

use crate::ports::SettingsSource;

const APP_DIR: &str = "anygpt";
const SETTINGS_FILE: &str = "settings.json";

/// Get the settings directory: `$ANYGPT_CONFIG_DIR` or `<config_dir>/anygpt`.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(custom_dir) = std::env::var("ANYGPT_CONFIG_DIR") {
        if !custom_dir.trim().is_empty() {
            return Ok(PathBuf::from(custom_dir));
        }
    }
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| ConfigError::NotFound { path: "<config dir>".to_string() })
}

/// Settings persisted as pretty-printed JSON.
///
/// A missing file reads as defaults. Every `load` hits the disk, so edits made
/// by another process are picked up on the next call.
#[derive(Debug, Clone)]
pub struct JsonSettingsFile {
    path: PathBuf,
}

impl JsonSettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File at the default location.
    pub fn default_location() -> Result<Self, ConfigError> {
        Ok(Self::new(config_dir()?.join(SETTINGS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Validate and write `settings` (temp file + rename).
    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        settings.check()?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::from_io_error(&e))?;
            }
        }

        let content =
            serde_json::to_string_pretty(settings).map_err(|e| ConfigError::from_json_error(&e))?;
        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);

        fs::write(&temp_path, content).map_err(|e| ConfigError::from_io_error(&e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| ConfigError::from_io_error(&e))?;
        debug!("Settings saved to {}", self.path.display());
        Ok(())
    }
}

impl SettingsSource for JsonSettingsFile {
    fn load(&self) -> Result<Settings, ConfigError> {
        if !self.path.exists() {
            debug!("No settings file at {}, using defaults", self.path.display());
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| ConfigError::ParseError { message: e.to_string() })?;
        let settings: Settings =
            serde_json::from_str(&content).map_err(|e| ConfigError::from_json_error(&e))?;
        settings.check()?;
        Ok(settings)
    }
}

/// Fixed settings held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings(pub Settings);

impl SettingsSource for StaticSettings {
    fn load(&self) -> Result<Settings, ConfigError> {
        Ok(self.0.clone())
    }
}
