use chrono::{DateTime, Utc};

use crate::prefix::UserInfo;

/// A single IRCv3 message tag.
///
/// Keys are kept exactly as received and are not deduplicated. A tag sent
/// without `=value` has an empty value.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Tag {
    /// Tag key, including any vendor prefix or `+` client marker.
    pub key: Vec<u8>,
    /// Unescaped tag value.
    pub value: Vec<u8>,
}

impl Tag {
    /// Create a tag from a key and value.
    pub fn new(key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Self {
        Self {
            key: key.as_ref().to_vec(),
            value: value.as_ref().to_vec(),
        }
    }
}

/// One protocol line in structured form.
///
/// Owns all of its bytes, independently of the buffer it was parsed from.
///
/// # Example
///
/// ```
/// use slirc_wire::{parse, RawIrcMsg};
///
/// // Parse a message
/// let msg = parse(b":nick!user@host PRIVMSG #channel :Hello!").unwrap();
/// assert_eq!(msg.source_nick().map(|n| n.original()), Some(&b"nick"[..]));
///
/// // Construct a message
/// let msg = RawIrcMsg::new("PRIVMSG", ["#channel", "Hello!"]);
/// ```
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct RawIrcMsg {
    /// Value of the `server-time` tag, when present.
    pub time: Option<DateTime<Utc>>,
    /// Message source, when present.
    pub prefix: Option<UserInfo>,
    /// Command or numeric, exactly as received.
    pub command: Vec<u8>,
    /// Parameters, the final one possibly containing spaces.
    pub params: Vec<Vec<u8>>,
    /// Tags other than `time`, in wire order.
    pub tags: Vec<Tag>,
}

impl RawIrcMsg {
    /// Build an outbound message from a command and its parameters.
    pub fn new<C, I, P>(command: C, params: I) -> Self
    where
        C: AsRef<[u8]>,
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        Self {
            command: command.as_ref().to_vec(),
            params: params.into_iter().map(|p| p.as_ref().to_vec()).collect(),
            ..Self::default()
        }
    }

    /// Attach a tag, keeping any existing tags with the same key.
    #[must_use]
    pub fn with_tag(mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Self {
        self.tags.push(Tag::new(key, value));
        self
    }

    /// Attach a source prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: UserInfo) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Value of the first tag with the given key.
    pub fn tag_value(&self, key: &[u8]) -> Option<&[u8]> {
        self.tags
            .iter()
            .find(|tag| tag.key == key)
            .map(|tag| tag.value.as_slice())
    }

    /// Nickname from the message prefix, if present.
    pub fn source_nick(&self) -> Option<&crate::Identifier> {
        self.prefix.as_ref().map(|p| &p.nick)
    }

    /// The parameter at `index`, if present.
    pub fn param(&self, index: usize) -> Option<&[u8]> {
        self.params.get(index).map(Vec::as_slice)
    }
}
