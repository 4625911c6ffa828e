//! Native extension loading.
//!
//! This is the only module that talks to the dynamic loader. Everything
//! else works with the [`ExtensionRecord`] it hands out and the typed
//! [`Session`](super::Session) built from it.

#![allow(unsafe_code)]

use std::path::{Path, PathBuf};

use crate::error::LoadError;

use super::ffi::{EXTENSION_SYMBOL, EXTENSION_SYMBOL_NAME, ExtensionRecord};

/// A loaded extension image.
///
/// # Safety
///
/// Implementors promise that the record returned by
/// [`resolve_extension`](Self::resolve_extension) honours the extension ABI:
/// every non-null hook has the documented signature and remains callable,
/// and `name` is null or a NUL-terminated string, until [`close`](Self::close)
/// is called.
pub unsafe trait PluginLibrary {
    /// Read the extension's callback record.
    fn resolve_extension(&self) -> Result<ExtensionRecord, LoadError>;

    /// Unload the image. No hook may be called afterwards.
    fn close(self) -> Result<(), LoadError>;
}

/// Opens extension images by path.
pub trait PluginLoader {
    type Library: PluginLibrary;

    fn open(&self, path: &Path) -> Result<Self::Library, LoadError>;
}

/// Loader for shared objects (`.so`, `.dylib`, `.dll`) via `libloading`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DylibLoader;

/// A shared object opened by [`DylibLoader`].
#[derive(Debug)]
pub struct Dylib {
    inner: libloading::Library,
    path: PathBuf,
}

impl Dylib {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PluginLoader for DylibLoader {
    type Library = Dylib;

    fn open(&self, path: &Path) -> Result<Dylib, LoadError> {
        // Lazy, process-local binding: extensions must not leak symbols into
        // each other.
        #[cfg(unix)]
        let opened = {
            use libloading::os::unix::{Library as UnixLibrary, RTLD_LAZY, RTLD_LOCAL};
            // SAFETY: running the image's initialisers is the point of
            // loading an extension; the operator chose the path.
            unsafe { UnixLibrary::open(Some(path), RTLD_LAZY | RTLD_LOCAL) }
                .map(libloading::Library::from)
        };

        #[cfg(not(unix))]
        // SAFETY: as above.
        let opened = unsafe { libloading::Library::new(path) };

        let inner = opened.map_err(|e| LoadError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(Dylib {
            inner,
            path: path.to_path_buf(),
        })
    }
}

// SAFETY: the record is copied out of the image, whose code stays mapped
// until `close`; the ABI contract is the extension author's promise.
unsafe impl PluginLibrary for Dylib {
    fn resolve_extension(&self) -> Result<ExtensionRecord, LoadError> {
        // SAFETY: the symbol is a data symbol holding an `ExtensionRecord`.
        let symbol = unsafe { self.inner.get::<*const ExtensionRecord>(EXTENSION_SYMBOL) }
            .map_err(|e| LoadError::MissingSymbol {
                path: self.path.clone(),
                symbol: EXTENSION_SYMBOL_NAME,
                reason: e.to_string(),
            })?;

        let record = *symbol;
        if record.is_null() {
            return Err(LoadError::NullRecord {
                path: self.path.clone(),
            });
        }

        // SAFETY: non-null and pointing at the exported static record.
        Ok(unsafe { record.read() })
    }

    fn close(self) -> Result<(), LoadError> {
        let Self { inner, path } = self;
        inner.close().map_err(|e| LoadError::Close {
            path,
            reason: e.to_string(),
        })
    }
}

/// Whether `path` looks like a shared object for this platform.
pub fn is_native_extension(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str());
    ext == Some(std::env::consts::DLL_EXTENSION)
}
