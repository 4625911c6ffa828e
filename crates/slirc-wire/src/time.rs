//! Server-time handling for the IRCv3 `time` tag.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::ParseError;

/// Parse an IRCv3 server-time value.
///
/// Accepts RFC 3339 timestamps such as `2023-01-01T12:00:00.000Z`. The
/// fractional part is optional, the zone is not.
pub fn parse_server_time(raw: &[u8]) -> Result<DateTime<Utc>, ParseError> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| ParseError::InvalidTimestamp(String::from_utf8_lossy(raw).into_owned()))?;

    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ParseError::InvalidTimestamp(text.to_owned()))
}

/// Format a timestamp the way servers send it: UTC, millisecond precision.
pub fn format_server_time(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
