//! slirc-ext - native extension host for IRC clients.
//!
//! Loads shared-object extensions, marshals each inbound protocol line into
//! a C view shared by every extension, and lets extensions call back into
//! the host while they run. Wire parsing lives in the `slirc-wire` crate.

pub mod config;
pub mod error;
pub mod extension;
pub mod input;
pub mod telemetry;

pub use config::{Config, ConfigError};
pub use error::{DecodeError, ExportStatus, HostError, LoadError};
pub use extension::{ExtensionHost, ExtensionManager, Session};
