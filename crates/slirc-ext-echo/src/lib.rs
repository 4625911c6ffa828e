//! Minimal native extension.
//!
//! Written against the C layout only, the way an extension built outside
//! this workspace would be. It counts what the host hands it and exposes
//! the counters as `slirc_echo_*` functions so the loader tests can see
//! that each hook ran inside the loaded image.

#![allow(unsafe_code)]

use std::ffi::{c_char, c_int, c_void};
use std::sync::atomic::{AtomicUsize, Ordering};

#[repr(C)]
pub struct StringLen {
    ptr: *const c_char,
    len: usize,
}

#[repr(C)]
pub struct Msg {
    network: StringLen,
    prefix: StringLen,
    command: StringLen,
    params: *const StringLen,
    params_n: usize,
    tag_keys: *const StringLen,
    tag_vals: *const StringLen,
    tags_n: usize,
}

#[repr(C)]
pub struct Cmd {
    command: StringLen,
}

#[repr(C)]
pub struct Record {
    start: Option<unsafe extern "C" fn() -> *mut c_void>,
    stop: Option<unsafe extern "C" fn(*mut c_void)>,
    process_message: Option<unsafe extern "C" fn(*mut c_void, *mut c_void, *const Msg) -> c_int>,
    process_command: Option<unsafe extern "C" fn(*mut c_void, *mut c_void, *const Cmd) -> c_int>,
    name: *const c_char,
    major_version: c_int,
    minor_version: c_int,
}

// SAFETY: immutable, and `name` points at a static string.
unsafe impl Sync for Record {}

static STARTED: AtomicUsize = AtomicUsize::new(0);
static STOPPED: AtomicUsize = AtomicUsize::new(0);
static MESSAGES: AtomicUsize = AtomicUsize::new(0);
static LAST_PARAMS: AtomicUsize = AtomicUsize::new(0);

/// Per-session state behind the token.
struct Session {
    messages: usize,
}

unsafe extern "C" fn start() -> *mut c_void {
    STARTED.fetch_add(1, Ordering::SeqCst);
    Box::into_raw(Box::new(Session { messages: 0 })).cast()
}

unsafe extern "C" fn stop(token: *mut c_void) {
    if !token.is_null() {
        // SAFETY: non-null tokens come from `start`.
        drop(unsafe { Box::from_raw(token.cast::<Session>()) });
    }
    STOPPED.fetch_add(1, Ordering::SeqCst);
}

unsafe extern "C" fn process_message(
    _ctx: *mut c_void,
    token: *mut c_void,
    msg: *const Msg,
) -> c_int {
    // SAFETY: the host passes our own token and a view valid for the call.
    let (Some(session), Some(msg)) = (unsafe { token.cast::<Session>().as_mut() }, unsafe {
        msg.as_ref()
    }) else {
        return -1;
    };
    session.messages += 1;
    MESSAGES.fetch_add(1, Ordering::SeqCst);
    LAST_PARAMS.store(msg.params_n, Ordering::SeqCst);
    0
}

#[allow(non_upper_case_globals)]
#[unsafe(no_mangle)]
pub static slirc_extension: Record = Record {
    start: Some(start),
    stop: Some(stop),
    process_message: Some(process_message),
    process_command: None,
    name: c"echo".as_ptr(),
    major_version: 1,
    minor_version: 2,
};

#[unsafe(no_mangle)]
pub extern "C" fn slirc_echo_started() -> usize {
    STARTED.load(Ordering::SeqCst)
}

#[unsafe(no_mangle)]
pub extern "C" fn slirc_echo_stopped() -> usize {
    STOPPED.load(Ordering::SeqCst)
}

#[unsafe(no_mangle)]
pub extern "C" fn slirc_echo_messages() -> usize {
    MESSAGES.load(Ordering::SeqCst)
}

/// `params_n` of the last message seen.
#[unsafe(no_mangle)]
pub extern "C" fn slirc_echo_last_params() -> usize {
    LAST_PARAMS.load(Ordering::SeqCst)
}
