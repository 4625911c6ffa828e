//! Core configuration types and loading.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::defaults::{default_max_line_len, default_network, default_true};
use crate::extension::is_native_extension;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Extension host configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Host settings.
    #[serde(default)]
    pub host: HostConfig,
    /// Extensions to activate, in order.
    #[serde(default, rename = "extension")]
    pub extensions: Vec<ExtensionConfig>,
}

/// The `[host]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    /// Network name handed to extensions with every message.
    #[serde(default = "default_network")]
    pub network: String,
    /// Longest accepted input line, terminator included.
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Directory scanned for shared objects, activated after the explicit
    /// `[[extension]]` entries in file-name order.
    pub extension_dir: Option<PathBuf>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            max_line_len: default_max_line_len(),
            extension_dir: None,
        }
    }
}

/// One `[[extension]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionConfig {
    /// Path to the shared object.
    pub path: PathBuf,
    /// Disabled entries are skipped.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Paths to activate, in activation order: enabled entries first, then
    /// the contents of `extension_dir`. A path is listed once.
    pub fn extension_paths(&self) -> Result<Vec<PathBuf>, ConfigError> {
        let mut paths: Vec<PathBuf> = self
            .extensions
            .iter()
            .filter(|ext| ext.enabled)
            .map(|ext| ext.path.clone())
            .collect();

        if let Some(dir) = &self.host.extension_dir {
            let mut found = Vec::new();
            for entry in std::fs::read_dir(dir)? {
                let path = entry?.path();
                if path.is_file() && is_native_extension(&path) {
                    found.push(path);
                }
            }
            found.sort();

            let disabled: Vec<&Path> = self
                .extensions
                .iter()
                .filter(|ext| !ext.enabled)
                .map(|ext| ext.path.as_path())
                .collect();
            for path in found {
                if !paths.contains(&path) && !disabled.contains(&path.as_path()) {
                    paths.push(path);
                }
            }
        }

        Ok(paths)
    }
}
