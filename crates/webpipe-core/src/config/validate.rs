//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution.standard_widths.is_empty() {
            return Err(ConfigError::ValidationError(
                "resolution.standard_widths must not be empty".into(),
            ));
        }
        if self.resolution.standard_widths.contains(&0) {
            return Err(ConfigError::ValidationError(
                "resolution.standard_widths entries must be > 0".into(),
            ));
        }
        if self.resolution.aspect_ratios.is_empty() {
            return Err(ConfigError::ValidationError(
                "resolution.aspect_ratios must not be empty".into(),
            ));
        }
        if self
            .resolution
            .aspect_ratios
            .iter()
            .any(|r| r.width == 0 || r.height == 0)
        {
            return Err(ConfigError::ValidationError(
                "resolution.aspect_ratios terms must be > 0".into(),
            ));
        }
        for (key, ext) in [
            ("conversion.source_extension", &self.conversion.source_extension),
            ("conversion.target_extension", &self.conversion.target_extension),
        ] {
            if ext.is_empty() || ext.starts_with('.') {
                return Err(ConfigError::ValidationError(format!(
                    "{key} must be non-empty and given without a leading dot"
                )));
            }
        }
        if self.pipeline.event_buffer == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.event_buffer must be > 0".into(),
            ));
        }
        Ok(())
    }
}
