//! Error types for the wire codec.

use thiserror::Error;

/// Why a protocol line could not be turned into a message.
///
/// Parsing is deliberately lenient: apart from the timestamp check, any
/// irregular content is absorbed into the final parameter instead of being
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The `time` tag did not hold an RFC 3339 timestamp.
    #[error("invalid server-time tag: {0:?}")]
    InvalidTimestamp(String),
}

/// Errors raised while framing lines on a byte stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WireError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Line exceeded the configured maximum length.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    LineTooLong {
        /// Length seen so far.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// Outbound message would smuggle a line break or NUL onto the wire.
    #[error("illegal byte {0:#04x} in outbound message")]
    IllegalByte(u8),
}
