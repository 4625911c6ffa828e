//! Message parsing implementation.
//!
//! The head of a line (tags, prefix, command) is split with nom; parameters
//! are collected by hand because the 14-middle cap and the lenient trailing
//! rule do not map well onto combinators.
//!
//! ```text
//! [ "@" tags " " ] [ ":" prefix " " ] command [ " " middle ]*14 [ " " [":"] trailing ]
//! ```

use chrono::{DateTime, Utc};
use nom::{
    bytes::complete::{tag, take_till, take_while},
    combinator::opt,
    sequence::{preceded, terminated, tuple},
    IResult,
};
use smallvec::SmallVec;

use crate::error::ParseError;
use crate::prefix::UserInfo;
use crate::tags::unescape_tag_value;
use crate::time::parse_server_time;

use super::types::{RawIrcMsg, Tag};

/// Number of space-delimited parameters collected before the rest of the
/// line is taken verbatim as the final parameter.
pub const MAX_MIDDLE_PARAMS: usize = 14;

#[inline]
fn is_space(b: u8) -> bool {
    b == b' '
}

/// Tag section (after `@`, up to the first space). Trailing spaces are eaten.
fn tags_section(input: &[u8]) -> IResult<&[u8], &[u8]> {
    terminated(
        preceded(tag(&b"@"[..]), take_till(is_space)),
        take_while(is_space),
    )(input)
}

/// Prefix (after `:`, up to the first space). Trailing spaces are eaten.
fn prefix_section(input: &[u8]) -> IResult<&[u8], &[u8]> {
    terminated(
        preceded(tag(&b":"[..]), take_till(is_space)),
        take_while(is_space),
    )(input)
}

/// Command token. Emptiness is left for callers to judge.
fn command(input: &[u8]) -> IResult<&[u8], &[u8]> {
    take_till(is_space)(input)
}

type Head<'a> = (Option<&'a [u8]>, Option<&'a [u8]>, &'a [u8]);

fn head(input: &[u8]) -> IResult<&[u8], Head<'_>> {
    tuple((opt(tags_section), opt(prefix_section), command))(input)
}

/// Collect parameters from whatever follows the command.
fn split_params(mut rest: &[u8]) -> SmallVec<[&[u8]; 15]> {
    let mut params: SmallVec<[&[u8]; 15]> = SmallVec::new();

    loop {
        while let [b' ', tail @ ..] = rest {
            rest = tail;
        }

        if rest.is_empty() {
            break;
        }

        if params.len() == MAX_MIDDLE_PARAMS || rest[0] == b':' {
            params.push(rest.strip_prefix(b":").unwrap_or(rest));
            break;
        }

        let end = rest.iter().position(|&b| is_space(b)).unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    params
}

/// Split the tag section, lifting `time` into a timestamp.
fn split_tags(section: &[u8]) -> Result<(Option<DateTime<Utc>>, Vec<Tag>), ParseError> {
    let mut time = None;
    let mut tags = Vec::new();

    for item in section.split(|&b| b == b';').filter(|s| !s.is_empty()) {
        let (key, raw_value) = match item.iter().position(|&b| b == b'=') {
            Some(eq) => (&item[..eq], &item[eq + 1..]),
            None => (item, &[][..]),
        };
        let value = unescape_tag_value(raw_value);

        if key == b"time" {
            time = Some(parse_server_time(&value)?);
        } else {
            tags.push(Tag {
                key: key.to_vec(),
                value,
            });
        }
    }

    Ok((time, tags))
}

/// A line split into borrowed pieces.
#[derive(Debug, Clone, PartialEq)]
struct ParsedLine<'a> {
    tags: Option<&'a [u8]>,
    prefix: Option<&'a [u8]>,
    command: &'a [u8],
    params: SmallVec<[&'a [u8]; 15]>,
}

impl<'a> ParsedLine<'a> {
    fn split(line: &'a [u8]) -> Self {
        // Every head parser is built from `complete` combinators that cannot
        // fail, so the fallback is never taken.
        let (rest, (tags, prefix, command)) = match head(line) {
            Ok(parsed) => parsed,
            Err(_) => (&line[line.len()..], (None, None, line)),
        };

        Self {
            tags,
            prefix,
            command,
            params: split_params(rest),
        }
    }

    fn into_owned(self) -> Result<RawIrcMsg, ParseError> {
        let (time, tags) = match self.tags {
            Some(section) => split_tags(section)?,
            None => (None, Vec::new()),
        };

        Ok(RawIrcMsg {
            time,
            prefix: self.prefix.map(UserInfo::parse),
            command: self.command.to_vec(),
            params: self.params.iter().map(|p| p.to_vec()).collect(),
            tags,
        })
    }
}

/// Parse one protocol line (trailing CR/LF already stripped).
///
/// The only rejected input is a `time` tag that does not hold a valid
/// timestamp.
pub fn try_parse(line: &[u8]) -> Result<RawIrcMsg, ParseError> {
    ParsedLine::split(line).into_owned()
}

/// Parse one protocol line, yielding no message when it is rejected.
///
/// See [`try_parse`] for the reason a line may be rejected.
pub fn parse(line: &[u8]) -> Option<RawIrcMsg> {
    try_parse(line).ok()
}
