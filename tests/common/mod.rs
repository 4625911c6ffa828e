//! Shared test harness: a fake extension loader, a recording token and a
//! thread-gated counting allocator.

#![allow(dead_code, unsafe_code)]

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ffi::c_void;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::slice;

use slirc_ext::error::LoadError;
use slirc_ext::extension::{
    ExtensionRecord, FgnCmd, FgnMsg, FgnStringLen, PluginLibrary, PluginLoader,
};

// ============================================================================
// Counting allocator
// ============================================================================

thread_local! {
    static COUNTING: Cell<bool> = const { Cell::new(false) };
    static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
}

/// System allocator that counts allocations made on a thread while
/// [`AllocCounter::count`] runs there. Other test threads are not counted.
pub struct AllocCounter;

impl AllocCounter {
    /// Run `f`, returning its result and the allocations it made.
    pub fn count<R>(f: impl FnOnce() -> R) -> (R, usize) {
        ALLOCATIONS.with(|n| n.set(0));
        COUNTING.with(|on| on.set(true));
        let result = f();
        COUNTING.with(|on| on.set(false));
        (result, ALLOCATIONS.with(Cell::get))
    }

    fn note() {
        let counting = COUNTING.try_with(Cell::get).unwrap_or(false);
        if counting {
            let _ = ALLOCATIONS.try_with(|n| n.set(n.get() + 1));
        }
    }
}

// SAFETY: defers every operation to `System`.
unsafe impl GlobalAlloc for AllocCounter {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        Self::note();
        unsafe { System.alloc(layout) }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        Self::note();
        unsafe { System.alloc_zeroed(layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        Self::note();
        unsafe { System.realloc(ptr, layout, new_size) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) }
    }
}

// ============================================================================
// Fake loader
// ============================================================================

/// Loader serving in-process records by path.
///
/// Unknown paths fail to open; paths registered with
/// [`without_symbol`](Self::without_symbol) open but lack the record.
#[derive(Default)]
pub struct FakeLoader {
    images: HashMap<PathBuf, Option<ExtensionRecord>>,
    closes: Rc<Cell<usize>>,
}

impl FakeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, record: ExtensionRecord) -> Self {
        self.images.insert(PathBuf::from(path), Some(record));
        self
    }

    pub fn without_symbol(mut self, path: &str) -> Self {
        self.images.insert(PathBuf::from(path), None);
        self
    }

    /// Shared count of closed libraries.
    pub fn closes(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.closes)
    }
}

pub struct FakeLibrary {
    path: PathBuf,
    record: Option<ExtensionRecord>,
    closes: Rc<Cell<usize>>,
}

impl PluginLoader for FakeLoader {
    type Library = FakeLibrary;

    fn open(&self, path: &Path) -> Result<FakeLibrary, LoadError> {
        let record = self.images.get(path).ok_or_else(|| LoadError::Open {
            path: path.to_path_buf(),
            reason: "no such image".to_string(),
        })?;
        Ok(FakeLibrary {
            path: path.to_path_buf(),
            record: *record,
            closes: Rc::clone(&self.closes),
        })
    }
}

// SAFETY: records are built from `extern "C"` functions in the test binary
// and static C strings.
unsafe impl PluginLibrary for FakeLibrary {
    fn resolve_extension(&self) -> Result<ExtensionRecord, LoadError> {
        self.record.ok_or_else(|| LoadError::MissingSymbol {
            path: self.path.clone(),
            symbol: "slirc_extension",
            reason: "undefined symbol".to_string(),
        })
    }

    fn close(self) -> Result<(), LoadError> {
        self.closes.set(self.closes.get() + 1);
        Ok(())
    }
}

// ============================================================================
// Tracker token
// ============================================================================

/// What one `process_message` call observed.
#[derive(Debug, Clone)]
pub struct MessageCall {
    pub ctx: *mut c_void,
    pub view: *const FgnMsg,
    pub network_ptr: *const u8,
    pub prefix_ptr: *const u8,
    pub command_ptr: *const u8,
    pub params_ptr: *const FgnStringLen,
    pub tag_keys_ptr: *const FgnStringLen,
    pub network: Vec<u8>,
    pub prefix: Vec<u8>,
    pub command: Vec<u8>,
    pub params: Vec<Vec<u8>>,
    pub tags: Vec<(Vec<u8>, Vec<u8>)>,
}

/// Session token recording the calls made with it.
pub struct Tracker<'a> {
    id: usize,
    log: Option<&'a RefCell<Vec<usize>>>,
    messages: RefCell<Vec<MessageCall>>,
    commands: RefCell<Vec<Vec<u8>>>,
    stops: Cell<usize>,
}

/// # Safety
///
/// A non-empty span must be readable for its length.
unsafe fn bytes(span: FgnStringLen) -> Vec<u8> {
    if span.len == 0 {
        return Vec::new();
    }
    unsafe { slice::from_raw_parts(span.ptr.cast::<u8>(), span.len) }.to_vec()
}

/// # Safety
///
/// A non-empty array must be readable for `n` spans.
unsafe fn spans<'s>(ptr: *const FgnStringLen, n: usize) -> &'s [FgnStringLen] {
    if n == 0 {
        return &[];
    }
    unsafe { slice::from_raw_parts(ptr, n) }
}

impl Tracker<'static> {
    pub fn new(id: usize) -> Self {
        Self::build(id, None)
    }
}

impl<'a> Tracker<'a> {
    /// A tracker that also appends its id to `log` on every message and stop.
    pub fn with_log(id: usize, log: &'a RefCell<Vec<usize>>) -> Self {
        Self::build(id, Some(log))
    }

    fn build(id: usize, log: Option<&'a RefCell<Vec<usize>>>) -> Self {
        Self {
            id,
            log,
            messages: RefCell::default(),
            commands: RefCell::default(),
            stops: Cell::new(0),
        }
    }

    fn log(&self) {
        if let Some(log) = self.log {
            log.borrow_mut().push(self.id);
        }
    }

    /// # Safety
    ///
    /// `msg` must be a valid view for the duration of the call.
    pub unsafe fn record_message(&self, ctx: *mut c_void, msg: *const FgnMsg) {
        self.log();
        let Some(view) = (unsafe { msg.as_ref() }) else {
            return;
        };
        let call = unsafe {
            let keys = spans(view.tag_keys, view.tags_n);
            let vals = spans(view.tag_vals, view.tags_n);
            MessageCall {
                ctx,
                view: msg,
                network_ptr: view.network.ptr.cast(),
                prefix_ptr: view.prefix.ptr.cast(),
                command_ptr: view.command.ptr.cast(),
                params_ptr: view.params,
                tag_keys_ptr: view.tag_keys,
                network: bytes(view.network),
                prefix: bytes(view.prefix),
                command: bytes(view.command),
                params: spans(view.params, view.params_n)
                    .iter()
                    .map(|&p| bytes(p))
                    .collect(),
                tags: keys
                    .iter()
                    .zip(vals)
                    .map(|(&k, &v)| (bytes(k), bytes(v)))
                    .collect(),
            }
        };
        self.messages.borrow_mut().push(call);
    }

    /// # Safety
    ///
    /// `cmd` must be a valid command view for the duration of the call.
    pub unsafe fn record_command(&self, cmd: *const FgnCmd) {
        if let Some(cmd) = unsafe { cmd.as_ref() } {
            let text = unsafe { bytes(cmd.command) };
            self.commands.borrow_mut().push(text);
        }
    }

    pub fn record_stop(&self) {
        self.log();
        self.stops.set(self.stops.get() + 1);
    }

    pub fn messages(&self) -> Vec<MessageCall> {
        self.messages.borrow().clone()
    }

    pub fn commands(&self) -> Vec<Vec<u8>> {
        self.commands.borrow().clone()
    }

    pub fn stops(&self) -> usize {
        self.stops.get()
    }
}
