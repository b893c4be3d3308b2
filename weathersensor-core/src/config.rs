use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Errors raised while reading or validating the component attributes.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("expected \"{attribute}\" attribute for weather module")]
    MissingAttribute { attribute: &'static str },

    #[error("invalid weather sensor attributes: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize configuration to TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("could not determine platform config directory")]
    NoConfigDir,
}

/// Attributes of a weather sensor, as supplied by the host.
///
/// Example JSON:
/// {"temp-sensor": "inside-temp", "zipcode": 94103, "apikey": "..."}
///
/// Absent fields fall back to their zero value so that [`Config::validate`]
/// can report which attribute is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name of the temperature sensor the inside reading comes from.
    #[serde(rename = "temp-sensor")]
    pub temperature_sensor: String,

    /// Location code passed to the weather API as `q`.
    pub zipcode: i64,

    /// weatherapi.com API key.
    #[serde(rename = "apikey")]
    pub api_key: String,
}

impl Config {
    /// Convert raw host attributes into a typed config.
    pub fn from_attributes(attributes: &serde_json::Value) -> Result<Self, ConfigError> {
        Ok(Config::deserialize(attributes)?)
    }

    /// Check required attributes and return the implicit dependencies.
    ///
    /// Stops at the first missing attribute, checked in the order
    /// `temp-sensor`, `apikey`, `zipcode`.
    pub fn validate(&self) -> Result<Vec<String>, ConfigError> {
        if self.temperature_sensor.is_empty() {
            return Err(ConfigError::MissingAttribute { attribute: "temp-sensor" });
        }
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingAttribute { attribute: "apikey" });
        }
        if self.zipcode == 0 {
            return Err(ConfigError::MissingAttribute { attribute: "zipcode" });
        }
        Ok(vec![self.temperature_sensor.clone()])
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;

        toml::from_str(&contents)
            .map_err(|source| ConfigError::TomlParse { path: path.to_path_buf(), source })
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| ConfigError::Io { path: parent.to_path_buf(), source })?;
        }

        let toml = toml::to_string_pretty(self)?;

        fs::write(path, toml).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("dev", "weathersensor", "weathersensor")
            .ok_or(ConfigError::NoConfigDir)?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
