//! Conversion between [`RawIrcMsg`] and the foreign message view.
//!
//! Outbound (host → extension) marshaling borrows the message's bytes and
//! allocates only the prefix rendering and the span arrays, all owned by a
//! single [`MarshaledMessage`] that lives for one dispatch. Inbound
//! (extension → host) decoding copies out of extension-owned buffers after
//! checking every pointer and count it was given.

#![allow(unsafe_code)]

use std::marker::PhantomData;
use std::slice;

use slirc_wire::{RawIrcMsg, Tag, UserInfo};
use smallvec::SmallVec;

use crate::error::DecodeError;

use super::ffi::{FgnCmd, FgnMsg, FgnStringLen};

/// Most parameters an extension may submit (14 middles plus a final one).
pub const MAX_FOREIGN_PARAMS: usize = 15;

/// Most tags an extension may submit.
pub const MAX_FOREIGN_TAGS: usize = 1024;

/// Dispatch-scoped storage backing one [`FgnMsg`].
pub struct MarshaledMessage<'a> {
    network: &'a [u8],
    command: &'a [u8],
    prefix: Option<Vec<u8>>,
    params: SmallVec<[FgnStringLen; MAX_FOREIGN_PARAMS]>,
    tag_keys: SmallVec<[FgnStringLen; 8]>,
    tag_vals: SmallVec<[FgnStringLen; 8]>,
}

impl<'a> MarshaledMessage<'a> {
    pub fn new(network: &'a str, msg: &'a RawIrcMsg) -> Self {
        let (tag_keys, tag_vals) = msg
            .tags
            .iter()
            .map(|tag| {
                (
                    FgnStringLen::from_bytes(&tag.key),
                    FgnStringLen::from_bytes(&tag.value),
                )
            })
            .unzip();

        Self {
            network: network.as_bytes(),
            command: &msg.command,
            prefix: msg.prefix.as_ref().map(UserInfo::render),
            params: msg
                .params
                .iter()
                .map(|p| FgnStringLen::from_bytes(p))
                .collect(),
            tag_keys,
            tag_vals,
        }
    }

    /// The view over this storage. It cannot outlive `self`.
    pub fn view(&self) -> MessageView<'_> {
        MessageView {
            raw: FgnMsg {
                network: FgnStringLen::from_bytes(self.network),
                prefix: self
                    .prefix
                    .as_deref()
                    .map_or(FgnStringLen::EMPTY, FgnStringLen::from_bytes),
                command: FgnStringLen::from_bytes(self.command),
                params: self.params.as_ptr(),
                params_n: self.params.len(),
                tag_keys: self.tag_keys.as_ptr(),
                tag_vals: self.tag_vals.as_ptr(),
                tags_n: self.tag_keys.len(),
            },
            _storage: PhantomData,
        }
    }
}

/// A foreign message view borrowed from a [`MarshaledMessage`].
pub struct MessageView<'m> {
    raw: FgnMsg,
    _storage: PhantomData<&'m MarshaledMessage<'m>>,
}

impl MessageView<'_> {
    #[inline]
    pub fn as_ptr(&self) -> *const FgnMsg {
        &self.raw
    }
}

/// A foreign command view borrowing the command text.
pub struct CommandView<'a> {
    raw: FgnCmd,
    _text: PhantomData<&'a [u8]>,
}

impl<'a> CommandView<'a> {
    pub fn new(text: &'a [u8]) -> Self {
        Self {
            raw: FgnCmd {
                command: FgnStringLen::from_bytes(text),
            },
            _text: PhantomData,
        }
    }

    #[inline]
    pub fn as_ptr(&self) -> *const FgnCmd {
        &self.raw
    }
}

/// Borrow the bytes behind an extension-supplied span.
///
/// # Safety
///
/// A non-empty span's pointer must be readable for `len` bytes for `'a`.
pub(crate) unsafe fn span_bytes<'a>(
    span: FgnStringLen,
    field: &'static str,
) -> Result<&'a [u8], DecodeError> {
    if span.len == 0 {
        return Ok(&[]);
    }
    if span.ptr.is_null() {
        return Err(DecodeError::NullSpan { field });
    }
    if span.len > isize::MAX as usize {
        return Err(DecodeError::SpanTooLong {
            field,
            len: span.len,
        });
    }
    // SAFETY: non-null, length in range, readability is the caller's promise.
    Ok(unsafe { slice::from_raw_parts(span.ptr.cast::<u8>(), span.len) })
}

/// Borrow an extension-supplied array of spans.
///
/// # Safety
///
/// A non-empty array's pointer must be readable for `count` spans for `'a`.
unsafe fn span_array<'a>(
    ptr: *const FgnStringLen,
    count: usize,
    field: &'static str,
) -> Result<&'a [FgnStringLen], DecodeError> {
    if count == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(DecodeError::NullSpan { field });
    }
    if !ptr.is_aligned() {
        return Err(DecodeError::Misaligned { field });
    }
    // SAFETY: non-null, aligned, count already capped by the callers.
    Ok(unsafe { slice::from_raw_parts(ptr, count) })
}

/// Copy an extension-owned view into a network name and a message.
///
/// The network name is decoded lossily; every other field stays raw bytes.
/// An empty prefix span means "no prefix".
///
/// # Safety
///
/// `view` must be null or point at an `FgnMsg` whose spans and arrays are
/// readable for the lengths they claim.
pub unsafe fn decode_message(view: *const FgnMsg) -> Result<(String, RawIrcMsg), DecodeError> {
    if !view.is_null() && !view.is_aligned() {
        return Err(DecodeError::Misaligned { field: "view" });
    }
    // SAFETY: null or valid, per the contract above.
    let view = unsafe { view.as_ref() }.ok_or(DecodeError::NullView)?;

    if view.params_n > MAX_FOREIGN_PARAMS {
        return Err(DecodeError::TooManyParams(view.params_n));
    }
    if view.tags_n > MAX_FOREIGN_TAGS {
        return Err(DecodeError::TooManyTags(view.tags_n));
    }

    // SAFETY: each pointer is only read within the length it was paired
    // with, after null and range checks.
    unsafe {
        let network = span_bytes(view.network, "network")?;
        let prefix = span_bytes(view.prefix, "prefix")?;
        let command = span_bytes(view.command, "command")?;
        let params = span_array(view.params, view.params_n, "params")?;
        let keys = span_array(view.tag_keys, view.tags_n, "tag_keys")?;
        let vals = span_array(view.tag_vals, view.tags_n, "tag_vals")?;

        let params = params
            .iter()
            .map(|&p| span_bytes(p, "params").map(<[u8]>::to_vec))
            .collect::<Result<Vec<_>, _>>()?;

        let tags = keys
            .iter()
            .zip(vals)
            .map(|(&k, &v)| {
                Ok(Tag {
                    key: span_bytes(k, "tag_keys")?.to_vec(),
                    value: span_bytes(v, "tag_vals")?.to_vec(),
                })
            })
            .collect::<Result<Vec<_>, DecodeError>>()?;

        let msg = RawIrcMsg {
            time: None,
            prefix: (!prefix.is_empty()).then(|| UserInfo::parse(prefix)),
            command: command.to_vec(),
            params,
            tags,
        };

        Ok((String::from_utf8_lossy(network).into_owned(), msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slirc_wire::parse;
    use std::ptr;

    #[test]
    fn test_view_borrows_message_bytes() {
        let msg = parse(b"@msgid=7 :nick!user@host PRIVMSG #c :hi there").unwrap();
        let marshaled = MarshaledMessage::new("libera", &msg);
        let view = marshaled.view();
        // SAFETY: the view points into `marshaled`, alive for this scope.
        let raw = unsafe { &*view.as_ptr() };

        assert_eq!(raw.command.ptr.cast::<u8>(), msg.command.as_ptr());
        assert_eq!(raw.params_n, 2);
        assert_eq!(raw.tags_n, 1);

        // SAFETY: as above.
        let params = unsafe { slice::from_raw_parts(raw.params, raw.params_n) };
        assert_eq!(params[1].ptr.cast::<u8>(), msg.params[1].as_ptr());
        assert_eq!(params[1].len, b"hi there".len());

        // SAFETY: as above.
        let prefix = unsafe { span_bytes(raw.prefix, "prefix") }.unwrap();
        assert_eq!(prefix, b"nick!user@host");
    }

    #[test]
    fn test_view_without_prefix_is_empty_span() {
        let msg = RawIrcMsg::new("PING", ["x"]);
        let marshaled = MarshaledMessage::new("net", &msg);
        let view = marshaled.view();
        // SAFETY: the view is alive for this scope.
        let raw = unsafe { &*view.as_ptr() };
        assert_eq!(raw.prefix, FgnStringLen::EMPTY);
    }

    #[test]
    fn test_decode_roundtrips_marshaled_view() {
        let msg = parse(b"@+typing=active :n!u@h PRIVMSG #c :hello world").unwrap();
        let marshaled = MarshaledMessage::new("libera", &msg);
        let view = marshaled.view();

        // SAFETY: the view is alive for this scope.
        let (network, decoded) = unsafe { decode_message(view.as_ptr()) }.unwrap();
        assert_eq!(network, "libera");
        assert_eq!(decoded.command, msg.command);
        assert_eq!(decoded.params, msg.params);
        assert_eq!(decoded.tags, msg.tags);
        assert_eq!(decoded.prefix, msg.prefix);
    }

    #[test]
    fn test_decode_rejects_null_view() {
        // SAFETY: null is explicitly allowed.
        let err = unsafe { decode_message(ptr::null()) }.unwrap_err();
        assert_eq!(err, DecodeError::NullView);
    }

    fn bare_view(command: &[u8]) -> FgnMsg {
        FgnMsg {
            network: FgnStringLen::EMPTY,
            prefix: FgnStringLen::EMPTY,
            command: FgnStringLen::from_bytes(command),
            params: ptr::null(),
            params_n: 0,
            tag_keys: ptr::null(),
            tag_vals: ptr::null(),
            tags_n: 0,
        }
    }

    #[test]
    fn test_decode_rejects_null_params_with_count() {
        let view = FgnMsg {
            params_n: 2,
            ..bare_view(b"PRIVMSG")
        };
        // SAFETY: the null array is rejected before any read.
        let err = unsafe { decode_message(&view) }.unwrap_err();
        assert_eq!(err, DecodeError::NullSpan { field: "params" });
    }

    #[test]
    fn test_decode_rejects_misaligned_span_arrays() {
        let storage = [FgnStringLen::from_bytes(b"x"); 2];
        // One byte past an element boundary.
        let skewed = storage
            .as_ptr()
            .cast::<u8>()
            .wrapping_add(1)
            .cast::<FgnStringLen>();

        let view = FgnMsg {
            params: skewed,
            params_n: 1,
            ..bare_view(b"PRIVMSG")
        };
        // SAFETY: the pointer is rejected before any read.
        let err = unsafe { decode_message(&view) }.unwrap_err();
        assert_eq!(err, DecodeError::Misaligned { field: "params" });

        let view = FgnMsg {
            tag_keys: storage.as_ptr(),
            tag_vals: skewed,
            tags_n: 1,
            ..bare_view(b"TAGMSG")
        };
        // SAFETY: as above.
        let err = unsafe { decode_message(&view) }.unwrap_err();
        assert_eq!(err, DecodeError::Misaligned { field: "tag_vals" });
    }

    #[test]
    fn test_decode_caps_counts() {
        let params = [FgnStringLen::from_bytes(b"x"); 16];
        let view = FgnMsg {
            params: params.as_ptr(),
            params_n: params.len(),
            ..bare_view(b"PRIVMSG")
        };
        // SAFETY: the count is rejected before any read.
        let err = unsafe { decode_message(&view) }.unwrap_err();
        assert_eq!(err, DecodeError::TooManyParams(16));

        let view = FgnMsg {
            tags_n: MAX_FOREIGN_TAGS + 1,
            ..bare_view(b"TAGMSG")
        };
        // SAFETY: as above.
        let err = unsafe { decode_message(&view) }.unwrap_err();
        assert_eq!(err, DecodeError::TooManyTags(MAX_FOREIGN_TAGS + 1));
    }

    #[test]
    fn test_decode_rejects_null_span_with_length() {
        let view = FgnMsg {
            command: FgnStringLen {
                ptr: ptr::null(),
                len: 4,
            },
            ..bare_view(b"")
        };
        // SAFETY: the null span is rejected before any read.
        let err = unsafe { decode_message(&view) }.unwrap_err();
        assert_eq!(err, DecodeError::NullSpan { field: "command" });
    }

    #[test]
    fn test_decode_invalid_utf8_is_lossy_for_network_only() {
        let network = b"lib\xffera";
        let params = [FgnStringLen::from_bytes(b"caf\xe9")];
        let view = FgnMsg {
            network: FgnStringLen::from_bytes(network),
            params: params.as_ptr(),
            params_n: 1,
            ..bare_view(b"PRIVMSG")
        };
        // SAFETY: every span points at live local data.
        let (net, msg) = unsafe { decode_message(&view) }.unwrap();
        assert_eq!(net, "lib\u{fffd}era");
        assert_eq!(msg.params[0], b"caf\xe9");
        assert_eq!(msg.prefix, None);
    }

    #[test]
    fn test_command_view() {
        let text = b"echo hello";
        let view = CommandView::new(text);
        // SAFETY: the view is alive for this scope.
        let raw = unsafe { &*view.as_ptr() };
        assert_eq!(raw.command.len, text.len());
    }
}
