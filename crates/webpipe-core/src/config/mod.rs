//! Configuration management for webpipe.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. All config structs implement `Default`.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for webpipe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File locations (persisted state, error log)
    pub general: GeneralConfig,

    /// Source/target formats and resampling
    pub conversion: ConversionConfig,

    /// Resolution planning tables
    pub resolution: ResolutionConfig,

    /// Worker/event channel settings
    pub pipeline: PipelineConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.webpipe.webpipe/config.toml
    /// - Linux: ~/.config/webpipe/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\webpipe\config\config.toml
    ///
    /// Falls back to ~/.webpipe/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "webpipe", "webpipe")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".webpipe").join("config.toml")
            })
    }

    /// Resolved path of the persisted state file (with ~ expansion).
    pub fn state_file(&self) -> PathBuf {
        expand(&self.general.state_file)
    }

    /// Resolved path of the error log, or `None` when the log is disabled.
    pub fn error_log(&self) -> Option<PathBuf> {
        if self.general.error_log.trim().is_empty() {
            None
        } else {
            Some(expand(&self.general.error_log))
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.resolution.standard_widths, vec![1920, 1440, 1280]);
        assert_eq!(config.conversion.source_extension, "jpg");
        assert_eq!(config.conversion.target_extension, "webp");
        assert_eq!(config.pipeline.event_buffer, 64);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[conversion]"));
        assert!(toml.contains("[resolution]"));
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[resolution]\nstandard_widths = [800, 640]\n\n[conversion]\nresample_filter = \"triangle\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.resolution.standard_widths, vec![800, 640]);
        assert_eq!(config.resolution.aspect_ratios.len(), 2);
        assert_eq!(config.conversion.resample_filter, ResampleFilter::Triangle);
        assert_eq!(config.conversion.source_extension, "jpg");
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[resolution]\nstandard_widths = []\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("standard_widths"));
    }

    #[test]
    fn test_error_log_disabled_when_empty() {
        let mut config = Config::default();
        config.general.error_log = String::new();
        assert!(config.error_log().is_none());
    }

    #[test]
    fn test_state_file_expands_tilde() {
        let config = Config::default();
        assert!(!config.state_file().to_string_lossy().starts_with('~'));
    }
}
