//! The host side of the extension boundary.

#![allow(unsafe_code)]

use std::ffi::c_void;

use slirc_wire::RawIrcMsg;
use tracing::info;

use crate::error::HostError;

/// Actions extensions may ask the host to perform while a callback runs.
///
/// Implemented by whatever owns the connections. It is only ever borrowed
/// for the length of one dispatch.
pub trait ExtensionHost {
    /// Queue `msg` for sending on `network`.
    fn send_message(&mut self, network: &str, msg: RawIrcMsg) -> Result<(), HostError>;

    /// Show `text` to the user.
    fn print(&mut self, text: &str) -> Result<(), HostError> {
        info!(target: "slirc_ext::print", "{text}");
        Ok(())
    }
}

/// The `ctx` pointer handed to extension callbacks.
///
/// Wraps the host borrow so a thin pointer can cross the boundary and be
/// turned back into `&mut dyn ExtensionHost` by the exported functions.
pub struct ContextHandle<'h> {
    host: &'h mut (dyn ExtensionHost + 'h),
}

impl<'h> ContextHandle<'h> {
    pub fn new(host: &'h mut (dyn ExtensionHost + 'h)) -> Self {
        Self { host }
    }

    /// Opaque pointer valid while `self` is neither moved nor dropped.
    #[inline]
    pub fn as_ptr(&mut self) -> *mut c_void {
        (self as *mut Self).cast()
    }

    pub fn host(&mut self) -> &mut (dyn ExtensionHost + 'h) {
        &mut *self.host
    }

    /// Recover the handle behind a `ctx` pointer.
    ///
    /// # Safety
    ///
    /// `ctx` must be null or a pointer obtained from [`as_ptr`](Self::as_ptr)
    /// on a handle that is still alive and not otherwise in use.
    pub unsafe fn from_raw<'a>(ctx: *mut c_void) -> Option<&'a mut ContextHandle<'a>> {
        // SAFETY: per the contract above.
        unsafe { ctx.cast::<ContextHandle<'a>>().as_mut() }
    }
}
