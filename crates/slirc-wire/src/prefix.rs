//! Message source (`nick!user@host`) handling.
//!
//! # Reference
//! - RFC 2812 Section 2.3.1: Message format

use crate::ident::Identifier;

/// The source of an inbound message.
///
/// Only produced by parsing a prefix. A missing `!user` or `@host` part is
/// kept as `None`; it is never defaulted to an empty string.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct UserInfo {
    /// Nickname (or server name, for server-originated messages).
    pub nick: Identifier,
    /// Username, the part between `!` and `@`.
    pub user: Option<Vec<u8>>,
    /// Hostname, everything after the first `@`.
    pub host: Option<Vec<u8>>,
}

impl UserInfo {
    /// Split a raw prefix token into its components.
    ///
    /// The nick runs up to the first `!` or `@`. The host is everything after
    /// the first `@`, the user everything between `!` and that `@`. A `!`
    /// appearing after the `@` belongs to the host.
    pub fn parse(raw: &[u8]) -> Self {
        let (front, host) = match raw.iter().position(|&b| b == b'@') {
            Some(at) => (&raw[..at], Some(raw[at + 1..].to_vec())),
            None => (raw, None),
        };
        let (nick, user) = match front.iter().position(|&b| b == b'!') {
            Some(bang) => (&front[..bang], Some(front[bang + 1..].to_vec())),
            None => (front, None),
        };

        Self {
            nick: Identifier::from_bytes(nick),
            user,
            host,
        }
    }

    /// Create a prefix with only a nickname.
    pub fn from_nick(nick: impl AsRef<[u8]>) -> Self {
        Self {
            nick: Identifier::from_bytes(nick.as_ref()),
            user: None,
            host: None,
        }
    }

    /// Render as `nick[!user][@host]`.
    ///
    /// Uses the original nick spelling and adds each optional part only when
    /// present. No canonicalisation is applied.
    pub fn render(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.rendered_len());
        self.render_into(&mut out);
        out
    }

    /// Append the rendered prefix to `out`.
    pub fn render_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.nick.original());
        if let Some(user) = &self.user {
            out.push(b'!');
            out.extend_from_slice(user);
        }
        if let Some(host) = &self.host {
            out.push(b'@');
            out.extend_from_slice(host);
        }
    }

    fn rendered_len(&self) -> usize {
        self.nick.original().len()
            + self.user.as_ref().map_or(0, |u| u.len() + 1)
            + self.host.as_ref().map_or(0, |h| h.len() + 1)
    }
}
