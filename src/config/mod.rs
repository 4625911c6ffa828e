//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions (Config, HostConfig, ExtensionConfig)
//! - [`validation`]: Startup checks on a loaded config
//! - `defaults`: serde default values

mod defaults;
mod types;
pub mod validation;

pub use types::{Config, ConfigError, ExtensionConfig, HostConfig};
pub use validation::{ValidationError, validate};
