//! Ordered set of active extensions.

use std::path::Path;

use slirc_wire::RawIrcMsg;
use tracing::{info, warn};

use crate::error::LoadError;

use super::dispatch;
use super::host::ExtensionHost;
use super::loader::{DylibLoader, PluginLoader};
use super::session::Session;

/// Active sessions, in activation order, plus the loader that opened them.
///
/// Dropping the manager deactivates everything in reverse order.
pub struct ExtensionManager<P: PluginLoader = DylibLoader> {
    loader: P,
    sessions: Vec<Session<P::Library>>,
}

impl ExtensionManager<DylibLoader> {
    pub fn native() -> Self {
        Self::new(DylibLoader)
    }
}

impl<P: PluginLoader> ExtensionManager<P> {
    pub fn new(loader: P) -> Self {
        Self {
            loader,
            sessions: Vec::new(),
        }
    }

    /// Load and start the extension at `path`, appending it to the order.
    ///
    /// On failure the already active sessions are left as they were.
    pub fn activate(&mut self, path: &Path) -> Result<&Session<P::Library>, LoadError> {
        let session = Session::activate(&self.loader, path).inspect_err(|err| {
            warn!(
                path = %path.display(),
                error = %err,
                code = err.error_code(),
                "Extension failed to activate"
            );
        })?;
        self.sessions.push(session);
        Ok(&self.sessions[self.sessions.len() - 1])
    }

    /// Deactivate the session at `index`. Later sessions keep their
    /// relative order.
    pub fn deactivate(&mut self, index: usize) -> bool {
        if index >= self.sessions.len() {
            return false;
        }
        self.sessions.remove(index).deactivate();
        true
    }

    /// Deactivate the first session advertising `name`.
    pub fn deactivate_named(&mut self, name: &str) -> bool {
        match self.sessions.iter().position(|s| s.name() == Some(name)) {
            Some(index) => self.deactivate(index),
            None => false,
        }
    }

    /// Deactivate every session, newest first.
    pub fn deactivate_all(&mut self) {
        if self.sessions.is_empty() {
            return;
        }
        info!(count = self.sessions.len(), "Deactivating extensions");
        while let Some(session) = self.sessions.pop() {
            session.deactivate();
        }
    }

    pub fn sessions(&self) -> &[Session<P::Library>] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// See [`dispatch::notify`].
    pub fn notify(&self, network: &str, host: &mut dyn ExtensionHost, msg: &RawIrcMsg) -> usize {
        dispatch::notify(network, host, msg, &self.sessions)
    }

    /// See [`dispatch::notify_command`].
    pub fn notify_command(&self, host: &mut dyn ExtensionHost, text: &str) -> usize {
        dispatch::notify_command(host, text, &self.sessions)
    }
}

impl<P: PluginLoader> Drop for ExtensionManager<P> {
    fn drop(&mut self) {
        self.deactivate_all();
    }
}
