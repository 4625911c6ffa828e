//! Unified error handling for the extension host.
//!
//! This module provides the error hierarchy for loading extensions, for host
//! actions requested by extensions, and the integer status codes those
//! failures turn into at the native boundary.

use std::ffi::c_int;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// Load Errors (activation / deactivation)
// ============================================================================

/// Errors raised while loading or unloading a native extension.
///
/// A load error is fatal to one activation only; sessions that are already
/// active are never affected.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open extension {path:?}: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("extension {path:?} does not export `{symbol}`: {reason}")]
    MissingSymbol {
        path: PathBuf,
        symbol: &'static str,
        reason: String,
    },

    #[error("extension {path:?} exports a null callback record")]
    NullRecord { path: PathBuf },

    #[error("failed to unload extension {path:?}: {reason}")]
    Close { path: PathBuf, reason: String },
}

impl LoadError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open_failed",
            Self::MissingSymbol { .. } => "missing_symbol",
            Self::NullRecord { .. } => "null_record",
            Self::Close { .. } => "close_failed",
        }
    }
}

// ============================================================================
// Host Errors (actions requested by extensions)
// ============================================================================

/// Failure of a host action performed on behalf of an extension.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("no such network: {0}")]
    UnknownNetwork(String),

    #[error("refusing to send a message with an empty command")]
    EmptyCommand,

    #[error("outbound queue is full")]
    QueueFull,
}

// ============================================================================
// Decode Errors (foreign message views supplied by extensions)
// ============================================================================

/// A foreign message view that cannot be trusted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("null message view")]
    NullView,

    #[error("{field}: null pointer with non-zero length")]
    NullSpan { field: &'static str },

    #[error("{field}: pointer is not suitably aligned")]
    Misaligned { field: &'static str },

    #[error("{field}: length {len} exceeds addressable range")]
    SpanTooLong { field: &'static str, len: usize },

    #[error("too many parameters: {0}")]
    TooManyParams(usize),

    #[error("too many tags: {0}")]
    TooManyTags(usize),
}

// ============================================================================
// Export Status (native boundary)
// ============================================================================

/// Status returned by every host-exported function.
///
/// Zero is success; every failure is negative so that C callers can test
/// with `< 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExportStatus {
    Ok = 0,
    /// A required pointer was null.
    InvalidArgument = -1,
    /// A view failed bounds checking.
    OutOfBounds = -2,
    /// The host action itself failed.
    HostFailed = -3,
    /// The host action panicked; the panic was contained.
    Panicked = -4,
}

impl ExportStatus {
    /// The raw status code handed back across the boundary.
    #[inline]
    pub fn code(self) -> c_int {
        self as c_int
    }
}

impl From<&DecodeError> for ExportStatus {
    fn from(err: &DecodeError) -> Self {
        match err {
            DecodeError::NullView => Self::InvalidArgument,
            DecodeError::NullSpan { .. }
            | DecodeError::Misaligned { .. }
            | DecodeError::SpanTooLong { .. }
            | DecodeError::TooManyParams(_)
            | DecodeError::TooManyTags(_) => Self::OutOfBounds,
        }
    }
}
