//! # slirc-wire
//!
//! Byte-oriented IRC line codec used by the extension host.
//!
//! ## Features
//!
//! - Lenient parsing of raw protocol lines into [`RawIrcMsg`]
//! - Rendering of outbound messages back to wire bytes
//! - RFC 2812 case-insensitive [`Identifier`]s for nicknames and channels
//! - IRCv3 message tags, with `server-time` lifted into a typed timestamp
//! - Optional tokio-util line framing ([`IrcCodec`])
//!
//! Messages hold raw bytes rather than `String`s. The protocol does not
//! promise UTF-8, and the extension ABI hands byte spans straight to native
//! code, so nothing here decodes text.
//!
//! ## Quick Start
//!
//! ```rust
//! use slirc_wire::{parse, render, RawIrcMsg};
//!
//! let msg = parse(b":nick!user@host PRIVMSG #channel :Hello, world!").unwrap();
//! assert_eq!(msg.command, b"PRIVMSG");
//! assert_eq!(msg.params, vec![b"#channel".to_vec(), b"Hello, world!".to_vec()]);
//!
//! let out = RawIrcMsg::new("PRIVMSG", ["#channel", "Hi there"]);
//! assert_eq!(render(&out), b"PRIVMSG #channel :Hi there\r\n");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

#[cfg(feature = "tokio")]
pub mod codec;
pub mod error;
pub mod ident;
pub mod message;
pub mod prefix;
pub mod tags;
pub mod time;

#[cfg(feature = "tokio")]
pub use self::codec::{IrcCodec, DEFAULT_MAX_LINE_LEN};
pub use self::error::{ParseError, WireError};
pub use self::ident::{fold, fold_byte, irc_eq, Identifier};
pub use self::message::{parse, render, try_parse, RawIrcMsg, Tag, MAX_MIDDLE_PARAMS};
pub use self::prefix::UserInfo;
