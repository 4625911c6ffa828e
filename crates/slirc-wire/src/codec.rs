//! Line framing for tokio.
//!
//! [`IrcCodec`] turns a byte stream into [`RawIrcMsg`] values and renders
//! outbound messages back onto it. Inbound lines that fail to parse are
//! skipped, matching the lenient handling of everything else on the read
//! path.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::WireError;
use crate::message::{try_parse, RawIrcMsg};

/// RFC 1459 body limit plus the IRCv3 tag allowance.
pub const DEFAULT_MAX_LINE_LEN: usize = 512 + 8191;

/// Tokio codec for encoding/decoding IRC messages.
#[derive(Debug)]
pub struct IrcCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    max_len: usize,
}

impl IrcCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LEN)
    }

    /// Create a codec with a custom line limit (in bytes, terminator included).
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }

    /// The configured line limit.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Reject bytes that would end or corrupt the line on the wire.
    fn check_body(body: &[u8]) -> Result<(), WireError> {
        match body.iter().find(|&&b| matches!(b, b'\r' | b'\n' | b'\0')) {
            Some(&b) => Err(WireError::IllegalByte(b)),
            None => Ok(()),
        }
    }
}

impl Default for IrcCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn trim_line_end(mut line: &[u8]) -> &[u8] {
    while let [rest @ .., b'\r' | b'\n'] = line {
        line = rest;
    }
    line
}

/// Parse a framed line body, logging and dropping it when it is rejected.
fn parse_or_skip(body: &[u8]) -> Option<RawIrcMsg> {
    match try_parse(body) {
        Ok(msg) => Some(msg),
        Err(err) => {
            tracing::debug!(error = %err, line = %String::from_utf8_lossy(body), "Skipping unparsable line");
            None
        }
    }
}

impl Decoder for IrcCodec {
    type Item = RawIrcMsg;
    type Error = WireError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<RawIrcMsg>, WireError> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                // No complete line yet - remember where we stopped
                self.next_index = src.len();
                if src.len() > self.max_len {
                    return Err(WireError::LineTooLong {
                        actual: src.len(),
                        limit: self.max_len,
                    });
                }
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(WireError::LineTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            let body = trim_line_end(&line);
            if body.is_empty() {
                continue;
            }

            if let Some(msg) = parse_or_skip(body) {
                return Ok(Some(msg));
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<RawIrcMsg>, WireError> {
        match self.decode(src)? {
            Some(msg) => Ok(Some(msg)),
            None => {
                // A final line without terminator still counts.
                self.next_index = 0;
                if src.is_empty() {
                    return Ok(None);
                }
                let line = src.split_to(src.len());
                let body = trim_line_end(&line);
                if body.is_empty() {
                    return Ok(None);
                }
                Ok(parse_or_skip(body))
            }
        }
    }
}

impl Encoder<RawIrcMsg> for IrcCodec {
    type Error = WireError;

    fn encode(&mut self, msg: RawIrcMsg, dst: &mut BytesMut) -> Result<(), WireError> {
        <Self as Encoder<&RawIrcMsg>>::encode(self, &msg, dst)
    }
}

impl Encoder<&RawIrcMsg> for IrcCodec {
    type Error = WireError;

    fn encode(&mut self, msg: &RawIrcMsg, dst: &mut BytesMut) -> Result<(), WireError> {
        let mut out = Vec::with_capacity(512);
        msg.render_into(&mut out);

        let body = &out[..out.len() - 2];
        Self::check_body(body)?;

        if out.len() > self.max_len {
            return Err(WireError::LineTooLong {
                actual: out.len(),
                limit: self.max_len,
            });
        }

        dst.reserve(out.len());
        dst.put_slice(&out);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_strips_crlf() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from(&b"PING :server\r\nPRIVMSG #c hi\n"[..]);

        let first = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(first.command, b"PING");
        assert_eq!(first.params, vec![b"server".to_vec()]);

        let second = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(second.params, vec![b"#c".to_vec(), b"hi".to_vec()]);

        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from(&b"PRIVMSG #c :hel"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"lo\r\n");
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.params[1], b"hello");
    }

    #[test]
    fn test_decode_skips_blank_and_bad_lines() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from(&b"\r\n@time=never PING\r\nPONG x\r\n"[..]);
        let msg = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(msg.command, b"PONG");
    }

    #[test]
    fn test_decode_line_too_long() {
        let mut codec = IrcCodec::with_max_len(16);
        let mut buf = BytesMut::from(&b"PRIVMSG #channel :far too long\r\n"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(WireError::LineTooLong { limit: 16, .. })
        ));
    }

    #[test]
    fn test_decode_eof_without_terminator() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from(&b"QUIT :bye"[..]);
        let msg = codec.decode_eof(&mut buf).unwrap().unwrap();
        assert_eq!(msg.command, b"QUIT");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_eof_skips_bad_final_line() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from(&b"PING :a\r\n@time=never QUIT"[..]);

        let msg = codec.decode_eof(&mut buf).unwrap().unwrap();
        assert_eq!(msg.command, b"PING");

        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_encode_renders_line() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::new();
        codec
            .encode(RawIrcMsg::new("PRIVMSG", ["#c", "hello world"]), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"PRIVMSG #c :hello world\r\n");
    }

    #[test]
    fn test_encode_rejects_embedded_newline() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::new();
        let result = codec.encode(RawIrcMsg::new("PRIVMSG", ["#c", "a\r\nQUIT"]), &mut buf);
        assert!(matches!(result, Err(WireError::IllegalByte(b'\r'))));
        assert!(buf.is_empty());
    }
}
