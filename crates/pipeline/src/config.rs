//! Pipeline configuration

use lpr_fusion_plate_recognition::DEFAULT_DICTIONARY_PATH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Overrides [`PipelineConfig::detection_output_dir`]
pub const DETECTION_OUTPUT_DIR_ENV: &str = "DETECTION_OUTPUT_DIR";

/// Overrides [`PipelineConfig::dictionary_path`]
pub const DICTIONARY_PATH_ENV: &str = "LPR_DICTIONARY_PATH";

const DEFAULT_DETECTION_OUTPUT_DIR: &str = "logs/detections";
const DEFAULT_NETWORK_WIDTH: u32 = 96;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for one fusion pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Character dictionary for the plate recognizer
    pub dictionary_path: PathBuf,

    /// Directory for per-frame detection files. Empty disables recording.
    pub detection_output_dir: PathBuf,

    /// Recognizer input width in pixels
    pub network_width: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dictionary_path: PathBuf::from(DEFAULT_DICTIONARY_PATH),
            detection_output_dir: PathBuf::from(DEFAULT_DETECTION_OUTPUT_DIR),
            network_width: DEFAULT_NETWORK_WIDTH,
        }
    }
}

impl PipelineConfig {
    /// Parse a YAML document. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Defaults, or the given YAML file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Apply `DETECTION_OUTPUT_DIR` and `LPR_DICTIONARY_PATH` from the
    /// process environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(DETECTION_OUTPUT_DIR_ENV) {
            debug!("{} overrides detection output dir: {}", DETECTION_OUTPUT_DIR_ENV, dir);
            self.detection_output_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup(DICTIONARY_PATH_ENV) {
            debug!("{} overrides dictionary path: {}", DICTIONARY_PATH_ENV, path);
            self.dictionary_path = PathBuf::from(path);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network_width == 0 {
            return Err(ConfigError::Invalid(
                "network_width must be greater than zero".to_string(),
            ));
        }
        if self.dictionary_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "dictionary_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether detection files will be written
    #[must_use]
    pub fn recording_enabled(&self) -> bool {
        !self.detection_output_dir.as_os_str().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.dictionary_path, PathBuf::from(DEFAULT_DICTIONARY_PATH));
        assert_eq!(config.detection_output_dir, PathBuf::from("logs/detections"));
        assert_eq!(config.network_width, 96);
        assert!(config.recording_enabled());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = PipelineConfig::from_yaml_str("network_width: 128\n").unwrap();
        assert_eq!(config.network_width, 128);
        assert_eq!(config.detection_output_dir, PathBuf::from("logs/detections"));
    }

    #[test]
    fn test_empty_output_dir_disables_recording() {
        let config = PipelineConfig::from_yaml_str("detection_output_dir: \"\"\n").unwrap();
        assert!(!config.recording_enabled());
    }

    #[test]
    fn test_zero_width_is_rejected() {
        let err = PipelineConfig::from_yaml_str("network_width: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = PipelineConfig::from_yaml_str("network_width: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (DETECTION_OUTPUT_DIR_ENV, "/tmp/audit"),
            (DICTIONARY_PATH_ENV, "/opt/dict.txt"),
        ]
        .into_iter()
        .collect();

        let config = PipelineConfig::default()
            .with_overrides_from(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.detection_output_dir, PathBuf::from("/tmp/audit"));
        assert_eq!(config.dictionary_path, PathBuf::from("/opt/dict.txt"));
        assert_eq!(config.network_width, 96);
    }

    #[test]
    fn test_missing_file() {
        let err = PipelineConfig::from_file("/nonexistent/lpr.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
