//! Foreign layouts shared with native extensions.
//!
//! Everything here is `#[repr(C)]` and field order is part of the ABI.
//! Extensions written in C see the equivalent of:
//!
//! ```c
//! struct FgnStringLen { const char *ptr; size_t len; };
//! struct FgnMsg {
//!     struct FgnStringLen network, prefix, command;
//!     const struct FgnStringLen *params; size_t params_n;
//!     const struct FgnStringLen *tag_keys;
//!     const struct FgnStringLen *tag_vals; size_t tags_n;
//! };
//! struct FgnCmd { struct FgnStringLen command; };
//! struct slirc_extension {
//!     void *(*start)(void);
//!     void  (*stop)(void *token);
//!     int   (*process_message)(void *ctx, void *token, const struct FgnMsg *msg);
//!     int   (*process_command)(void *ctx, void *token, const struct FgnCmd *cmd);
//!     const char *name;
//!     int major_version, minor_version;
//! };
//! ```

#![allow(unsafe_code)]

use std::ffi::{CStr, c_char, c_int, c_void};
use std::ptr;

/// Name of the symbol every extension exports (NUL-terminated).
pub const EXTENSION_SYMBOL: &[u8] = b"slirc_extension\0";

/// [`EXTENSION_SYMBOL`] without the terminator, for messages.
pub const EXTENSION_SYMBOL_NAME: &str = "slirc_extension";

/// A borrowed byte span. UTF-8 by convention, not enforced.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FgnStringLen {
    pub ptr: *const c_char,
    pub len: usize,
}

impl FgnStringLen {
    /// The empty span. As a prefix it means "no prefix".
    pub const EMPTY: Self = Self {
        ptr: ptr::null(),
        len: 0,
    };

    /// Borrow `bytes` as a span. The span is only valid while `bytes` is.
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            ptr: bytes.as_ptr().cast(),
            len: bytes.len(),
        }
    }
}

/// Read-only projection of one message, valid for a single call.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FgnMsg {
    pub network: FgnStringLen,
    pub prefix: FgnStringLen,
    pub command: FgnStringLen,
    pub params: *const FgnStringLen,
    pub params_n: usize,
    pub tag_keys: *const FgnStringLen,
    pub tag_vals: *const FgnStringLen,
    pub tags_n: usize,
}

/// A user command addressed to extensions.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FgnCmd {
    pub command: FgnStringLen,
}

pub type StartFn = unsafe extern "C" fn() -> *mut c_void;
pub type StopFn = unsafe extern "C" fn(token: *mut c_void);
pub type ProcessMessageFn =
    unsafe extern "C" fn(ctx: *mut c_void, token: *mut c_void, msg: *const FgnMsg) -> c_int;
pub type ProcessCommandFn =
    unsafe extern "C" fn(ctx: *mut c_void, token: *mut c_void, cmd: *const FgnCmd) -> c_int;

/// The record an extension exports under [`EXTENSION_SYMBOL`].
///
/// Any hook may be null, which disables it.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ExtensionRecord {
    pub start: Option<StartFn>,
    pub stop: Option<StopFn>,
    pub process_message: Option<ProcessMessageFn>,
    pub process_command: Option<ProcessCommandFn>,
    /// NUL-terminated display name, or null.
    pub name: *const c_char,
    pub major_version: c_int,
    pub minor_version: c_int,
}

// SAFETY: the record is immutable once exported; `name` points at a static
// string owned by the extension image.
unsafe impl Sync for ExtensionRecord {}

impl ExtensionRecord {
    /// A record with every hook disabled.
    pub const EMPTY: Self = Self {
        start: None,
        stop: None,
        process_message: None,
        process_command: None,
        name: ptr::null(),
        major_version: 0,
        minor_version: 0,
    };
}

/// Callback table of one extension. Absent hooks behave as no-ops.
#[derive(Debug, Clone, Copy)]
pub struct Hooks {
    record: ExtensionRecord,
}

impl Hooks {
    /// Wrap a record read from an extension.
    ///
    /// # Safety
    ///
    /// Every non-null hook must be a function with the documented signature
    /// that stays callable for as long as these hooks are used, and `name`
    /// must be null or point at a NUL-terminated string with the same
    /// lifetime.
    pub unsafe fn new(record: ExtensionRecord) -> Self {
        Self { record }
    }

    /// Display name advertised by the extension.
    pub fn name(&self) -> Option<String> {
        if self.record.name.is_null() {
            return None;
        }
        // SAFETY: non-null names are NUL-terminated per `Hooks::new`.
        let name = unsafe { CStr::from_ptr(self.record.name) };
        Some(name.to_string_lossy().into_owned())
    }

    /// `(major, minor)` version advertised by the extension.
    pub fn version(&self) -> (c_int, c_int) {
        (self.record.major_version, self.record.minor_version)
    }

    /// Run the start hook, returning its token (null when absent).
    pub fn start(&self) -> *mut c_void {
        match self.record.start {
            // SAFETY: hook validity is guaranteed by `Hooks::new`.
            Some(start) => unsafe { start() },
            None => ptr::null_mut(),
        }
    }

    /// Run the stop hook, if any, handing the token back.
    pub fn stop(&self, token: *mut c_void) {
        if let Some(stop) = self.record.stop {
            // SAFETY: hook validity is guaranteed by `Hooks::new`.
            unsafe { stop(token) }
        }
    }

    /// Whether the extension wants inbound messages.
    #[inline]
    pub fn handles_messages(&self) -> bool {
        self.record.process_message.is_some()
    }

    /// Whether the extension wants user commands.
    #[inline]
    pub fn handles_commands(&self) -> bool {
        self.record.process_command.is_some()
    }

    /// Run the message hook, if any.
    pub fn process_message(
        &self,
        ctx: *mut c_void,
        token: *mut c_void,
        msg: *const FgnMsg,
    ) -> Option<c_int> {
        self.record
            .process_message
            // SAFETY: hook validity is guaranteed by `Hooks::new`; `msg` and
            // `ctx` stay valid for the duration of the call.
            .map(|process| unsafe { process(ctx, token, msg) })
    }

    /// Run the command hook, if any.
    pub fn process_command(
        &self,
        ctx: *mut c_void,
        token: *mut c_void,
        cmd: *const FgnCmd,
    ) -> Option<c_int> {
        self.record
            .process_command
            // SAFETY: as for `process_message`.
            .map(|process| unsafe { process(ctx, token, cmd) })
    }
}
