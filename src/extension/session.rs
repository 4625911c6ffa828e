//! One loaded extension and its opaque state token.

use std::ffi::{c_int, c_void};
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::LoadError;

use super::ffi::Hooks;
use super::loader::{PluginLibrary, PluginLoader};

/// State handed out by an extension's start hook.
///
/// The host never looks inside: it is passed back, unchanged, on every call
/// into the extension that produced it, and released to the extension's
/// stop hook on deactivation.
pub struct SessionToken(*mut c_void);

impl SessionToken {
    #[inline]
    pub(crate) fn as_raw(&self) -> *mut c_void {
        self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// An active extension.
///
/// Created by [`Session::activate`], torn down by [`Session::deactivate`]
/// (or on drop). In between, only the token's contents change, and only
/// the extension changes them.
pub struct Session<L: PluginLibrary> {
    library: Option<L>,
    hooks: Hooks,
    token: SessionToken,
    path: PathBuf,
    name: Option<String>,
    version: (c_int, c_int),
}

impl<L: PluginLibrary> Session<L> {
    /// Load the extension at `path` and run its start hook.
    ///
    /// Nothing is left loaded when this fails.
    pub fn activate<P>(loader: &P, path: &Path) -> Result<Self, LoadError>
    where
        P: PluginLoader<Library = L>,
    {
        let library = loader.open(path)?;

        let record = match library.resolve_extension() {
            Ok(record) => record,
            Err(err) => {
                if let Err(close_err) = library.close() {
                    warn!(path = %path.display(), error = %close_err, "Failed to unload rejected extension");
                }
                return Err(err);
            }
        };

        #[allow(unsafe_code)]
        // SAFETY: `PluginLibrary` implementors vouch for the record, and the
        // library stays open for as long as the hooks are used.
        let hooks = unsafe { Hooks::new(record) };

        let name = hooks.name();
        let (major, minor) = hooks.version();
        let token = SessionToken(hooks.start());

        info!(
            path = %path.display(),
            name = name.as_deref().unwrap_or("<unnamed>"),
            version = %format_args!("{major}.{minor}"),
            "Extension activated"
        );

        Ok(Self {
            library: Some(library),
            hooks,
            token,
            path: path.to_path_buf(),
            name,
            version: (major, minor),
        })
    }

    /// Run the stop hook (if any) and unload the extension.
    pub fn deactivate(mut self) {
        self.shutdown();
    }

    /// Path the extension was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name advertised by the extension.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// `(major, minor)` version advertised by the extension.
    pub fn version(&self) -> (c_int, c_int) {
        self.version
    }

    pub(crate) fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub(crate) fn token(&self) -> &SessionToken {
        &self.token
    }

    /// Idempotent: the stop hook runs at most once and the library is
    /// closed exactly once.
    fn shutdown(&mut self) {
        let Some(library) = self.library.take() else {
            return;
        };

        self.hooks.stop(self.token.as_raw());

        match library.close() {
            Ok(()) => info!(path = %self.path.display(), "Extension deactivated"),
            Err(err) => warn!(
                path = %self.path.display(),
                error = %err,
                code = err.error_code(),
                "Extension stopped but failed to unload"
            ),
        }
    }
}

impl<L: PluginLibrary> Drop for Session<L> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<L: PluginLibrary> fmt::Debug for Session<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("active", &self.library.is_some())
            .finish()
    }
}
