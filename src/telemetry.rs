//! Telemetry utilities for dispatch correlation.

use std::borrow::Cow;

use slirc_wire::RawIrcMsg;

/// Extract msgid from message tags if present.
pub fn extract_msgid(msg: &RawIrcMsg) -> Option<Cow<'_, str>> {
    msg.tag_value(b"msgid").map(String::from_utf8_lossy)
}

/// Standardized span constructors for extension host observability.
pub mod spans {
    use std::path::Path;

    use slirc_wire::RawIrcMsg;
    use tracing::{Span, info_span};

    /// Create a span for fanning one inbound message out to extensions.
    pub fn dispatch(network: &str, msg: &RawIrcMsg) -> Span {
        let command = String::from_utf8_lossy(&msg.command);
        match super::extract_msgid(msg) {
            Some(msgid) => info_span!("dispatch", network = %network, command = %command, msgid = %msgid),
            None => info_span!("dispatch", network = %network, command = %command),
        }
    }

    /// Create a span for work on behalf of one extension.
    pub fn extension(path: &Path) -> Span {
        info_span!("extension", path = %path.display())
    }

    /// Create a span for a user command addressed to extensions.
    pub fn command(text: &str) -> Span {
        info_span!("command", text = %text)
    }
}
