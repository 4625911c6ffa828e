//! Functions the host exports for extensions to call back into.
//!
//! Every body runs under [`guard`], so no panic unwinds into foreign code
//! and every failure comes back as an [`ExportStatus`] code.

#![allow(unsafe_code)]

use std::cmp::Ordering;
use std::ffi::{c_char, c_int, c_void};
use std::panic::{AssertUnwindSafe, catch_unwind};

use slirc_wire::fold_byte;
use tracing::warn;

use crate::error::{DecodeError, ExportStatus};

use super::ffi::{FgnMsg, FgnStringLen};
use super::host::ContextHandle;
use super::marshal::{decode_message, span_bytes};

/// Run `body`, turning its error or panic into a status code.
fn guard<F>(export: &'static str, body: F) -> c_int
where
    F: FnOnce() -> Result<(), ExportStatus>,
{
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => ExportStatus::Ok.code(),
        Ok(Err(status)) => status.code(),
        Err(_) => {
            warn!(export, "Host action panicked; contained at the extension boundary");
            ExportStatus::Panicked.code()
        }
    }
}

fn rejected(export: &'static str, err: &DecodeError) -> ExportStatus {
    warn!(export, error = %err, "Rejected view from extension");
    ExportStatus::from(err)
}

/// Queue a message on a network.
///
/// # Safety
///
/// `ctx` must be the context pointer of the callback currently running.
/// `msg` must be null or a valid view whose spans are readable for the
/// lengths they claim.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn slirc_ext_send_message(ctx: *mut c_void, msg: *const FgnMsg) -> c_int {
    const EXPORT: &str = "slirc_ext_send_message";
    guard(EXPORT, || {
        // SAFETY: per the contract above.
        let handle =
            unsafe { ContextHandle::from_raw(ctx) }.ok_or(ExportStatus::InvalidArgument)?;
        // SAFETY: per the contract above.
        let (network, msg) = unsafe { decode_message(msg) }.map_err(|e| rejected(EXPORT, &e))?;

        if let Err(err) = handle.host().send_message(&network, msg) {
            warn!(export = EXPORT, network, error = %err, "Host action failed");
            return Err(ExportStatus::HostFailed);
        }
        Ok(())
    })
}

/// Show text to the user. Invalid UTF-8 is replaced.
///
/// # Safety
///
/// `ctx` must be the context pointer of the callback currently running.
/// When `len` is non-zero, `text` must be readable for `len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn slirc_ext_print(
    ctx: *mut c_void,
    text: *const c_char,
    len: usize,
) -> c_int {
    const EXPORT: &str = "slirc_ext_print";
    guard(EXPORT, || {
        // SAFETY: per the contract above.
        let handle =
            unsafe { ContextHandle::from_raw(ctx) }.ok_or(ExportStatus::InvalidArgument)?;
        // SAFETY: per the contract above.
        let text = unsafe { span_bytes(FgnStringLen { ptr: text, len }, "text") }
            .map_err(|e| rejected(EXPORT, &e))?;

        handle
            .host()
            .print(&String::from_utf8_lossy(text))
            .map_err(|err| {
                warn!(export = EXPORT, error = %err, "Host action failed");
                ExportStatus::HostFailed
            })
    })
}

/// Compare two identifiers under IRC case folding, writing -1, 0 or 1 to
/// `out`.
///
/// # Safety
///
/// Each non-empty string must be readable for its length, and `out` must be
/// null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn slirc_ext_identifier_cmp(
    a: *const c_char,
    a_len: usize,
    b: *const c_char,
    b_len: usize,
    out: *mut c_int,
) -> c_int {
    const EXPORT: &str = "slirc_ext_identifier_cmp";
    guard(EXPORT, || {
        if out.is_null() {
            return Err(ExportStatus::InvalidArgument);
        }
        // SAFETY: per the contract above.
        let (a, b) = unsafe {
            (
                span_bytes(FgnStringLen { ptr: a, len: a_len }, "a"),
                span_bytes(FgnStringLen { ptr: b, len: b_len }, "b"),
            )
        };
        let (a, b) = (
            a.map_err(|e| rejected(EXPORT, &e))?,
            b.map_err(|e| rejected(EXPORT, &e))?,
        );

        let ordering = a
            .iter()
            .copied()
            .map(fold_byte)
            .cmp(b.iter().copied().map(fold_byte));
        let result = match ordering {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        };
        // SAFETY: non-null and writable per the contract above.
        unsafe { out.write(result) };
        Ok(())
    })
}
