//! IRCv3 message tag escaping utilities.

/// Escape a tag value for serialization, appending to `out`.
///
/// Escapes special characters according to the IRCv3 message-tags spec.
pub fn escape_tag_value(out: &mut Vec<u8>, value: &[u8]) {
    for &b in value {
        match b {
            b';' => out.extend_from_slice(b"\\:"),
            b' ' => out.extend_from_slice(b"\\s"),
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b => out.push(b),
        }
    }
}

/// Unescape a tag value from wire format.
///
/// Reverses the escaping applied by [`escape_tag_value`]. Unknown escapes
/// yield the escaped byte and a trailing lone backslash is dropped.
pub fn unescape_tag_value(value: &[u8]) -> Vec<u8> {
    let mut unescaped = Vec::with_capacity(value.len());
    let mut iter = value.iter().copied();
    while let Some(b) = iter.next() {
        let r = if b == b'\\' {
            match iter.next() {
                Some(b':') => b';',
                Some(b's') => b' ',
                Some(b'\\') => b'\\',
                Some(b'r') => b'\r',
                Some(b'n') => b'\n',
                Some(other) => other,
                None => break,
            }
        } else {
            b
        };
        unescaped.push(r);
    }
    unescaped
}
