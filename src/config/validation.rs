//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Shortest line limit that still fits an RFC 1459 line.
pub const MIN_LINE_LEN: usize = 512;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("host.network is required")]
    MissingNetworkName,
    #[error("host.max_line_len must be at least {MIN_LINE_LEN}, got {0}")]
    LineLimitTooSmall(usize),
    #[error("host.extension_dir is not a directory: {0}")]
    ExtensionDirInvalid(String),
    #[error("extension.path does not exist: {0}")]
    ExtensionNotFound(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.host.network.is_empty() {
        errors.push(ValidationError::MissingNetworkName);
    }
    if config.host.max_line_len < MIN_LINE_LEN {
        errors.push(ValidationError::LineLimitTooSmall(config.host.max_line_len));
    }

    if let Some(dir) = &config.host.extension_dir
        && !dir.is_dir()
    {
        errors.push(ValidationError::ExtensionDirInvalid(
            dir.display().to_string(),
        ));
    }

    // Disabled entries may point anywhere.
    for ext in config.extensions.iter().filter(|ext| ext.enabled) {
        if !ext.path.exists() {
            errors.push(ValidationError::ExtensionNotFound(
                ext.path.display().to_string(),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
