//! Native extension support.
//!
//! Extensions are shared objects exporting a `slirc_extension` record of
//! C callbacks. They are loaded by [`ExtensionManager`] (through a
//! [`PluginLoader`]), each becoming a [`Session`] that holds the extension's
//! opaque state token. Every inbound message is marshaled once into a
//! foreign view and fanned out to the sessions in activation order; during
//! a callback the extension can call back into the host through the
//! functions in [`exports`].

pub mod dispatch;
pub mod exports;
pub mod ffi;
pub mod host;
pub mod loader;
pub mod manager;
pub mod marshal;
pub mod session;

pub use dispatch::{notify, notify_command};
pub use ffi::{ExtensionRecord, FgnCmd, FgnMsg, FgnStringLen, Hooks};
pub use host::{ContextHandle, ExtensionHost};
pub use loader::{Dylib, DylibLoader, PluginLibrary, PluginLoader, is_native_extension};
pub use manager::ExtensionManager;
pub use marshal::{MAX_FOREIGN_PARAMS, MAX_FOREIGN_TAGS, MarshaledMessage, decode_message};
pub use session::{Session, SessionToken};
