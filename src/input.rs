//! Framing of the host's input stream.
//!
//! Input is one protocol line per line, except for lines starting with
//! `/extension`, which carry a user command addressed to extensions. The
//! command text is taken verbatim from the line, so spacing and colons
//! survive.

use bytes::BytesMut;
use slirc_wire::{IrcCodec, RawIrcMsg, WireError};
use tokio_util::codec::Decoder;

/// Command word that marks a user command line (ASCII case-insensitive).
pub const USER_COMMAND: &[u8] = b"/extension";

/// One decoded input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A protocol line for [`notify`](crate::extension::notify).
    Message(RawIrcMsg),
    /// Text after `/extension `, for [`notify_command`](crate::extension::notify_command).
    Command(String),
}

/// The command text of a `/extension` line, if `line` is one.
///
/// Exactly one separating space is dropped; everything after it is kept.
pub fn user_command(line: &[u8]) -> Option<String> {
    let mut line = line;
    while let [rest @ .., b'\r' | b'\n'] = line {
        line = rest;
    }

    let word = line.get(..USER_COMMAND.len())?;
    if !word.eq_ignore_ascii_case(USER_COMMAND) {
        return None;
    }

    let text = match &line[USER_COMMAND.len()..] {
        [] => &[][..],
        [b' ', text @ ..] => text,
        // `/extensions` and friends are ordinary lines.
        _ => return None,
    };
    Some(String::from_utf8_lossy(text).into_owned())
}

/// Decoder splitting user commands off before protocol parsing.
#[derive(Debug, Default)]
pub struct InputCodec {
    lines: IrcCodec,
}

impl InputCodec {
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            lines: IrcCodec::with_max_len(max_len),
        }
    }

    fn classify(&mut self, mut line: BytesMut, eof: bool) -> Result<Option<Input>, WireError> {
        if let Some(text) = user_command(&line) {
            return Ok(Some(Input::Command(text)));
        }
        let msg = if eof {
            self.lines.decode_eof(&mut line)?
        } else {
            self.lines.decode(&mut line)?
        };
        Ok(msg.map(Input::Message))
    }
}

impl Decoder for InputCodec {
    type Item = Input;
    type Error = WireError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Input>, WireError> {
        loop {
            let Some(end) = src.iter().position(|&b| b == b'\n') else {
                let limit = self.lines.max_len();
                if src.len() > limit {
                    return Err(WireError::LineTooLong {
                        actual: src.len(),
                        limit,
                    });
                }
                return Ok(None);
            };

            let line = src.split_to(end + 1);
            // Blank and unparsable lines yield nothing; keep going.
            if let Some(input) = self.classify(line, false)? {
                return Ok(Some(input));
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Input>, WireError> {
        if let Some(input) = self.decode(src)? {
            return Ok(Some(input));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let line = src.split_to(src.len());
        self.classify(line, true)
    }
}
