//! Message rendering.
//!
//! Rendering is intentionally asymmetric with parsing: the prefix and the
//! `time` tag are inbound-only and never written back out.

use crate::tags::escape_tag_value;

use super::types::RawIrcMsg;

/// Whether a final parameter needs a `:` to survive re-parsing.
#[inline]
fn needs_colon(param: &[u8]) -> bool {
    param.is_empty() || param.iter().any(|&b| b == b' ' || b == b':')
}

impl RawIrcMsg {
    /// Append the wire form of this message (with CR LF) to `out`.
    ///
    /// Middle parameters are written as-is; callers must not pass middles
    /// that contain spaces or start with a colon.
    pub fn render_into(&self, out: &mut Vec<u8>) {
        if !self.tags.is_empty() {
            out.push(b'@');
            for (i, tag) in self.tags.iter().enumerate() {
                if i > 0 {
                    out.push(b';');
                }
                out.extend_from_slice(&tag.key);
                if !tag.value.is_empty() {
                    out.push(b'=');
                    escape_tag_value(out, &tag.value);
                }
            }
            out.push(b' ');
        }

        out.extend_from_slice(&self.command);

        if let Some((last, middles)) = self.params.split_last() {
            for param in middles {
                out.push(b' ');
                out.extend_from_slice(param);
            }
            out.push(b' ');
            if needs_colon(last) {
                out.push(b':');
            }
            out.extend_from_slice(last);
        }

        out.extend_from_slice(b"\r\n");
    }
}

/// Render a message to wire bytes, terminated by CR LF.
pub fn render(msg: &RawIrcMsg) -> Vec<u8> {
    let mut out = Vec::with_capacity(512);
    msg.render_into(&mut out);
    out
}
