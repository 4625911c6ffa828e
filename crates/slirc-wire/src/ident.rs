//! Case-insensitive IRC identifiers.
//!
//! IRC treats nicknames and channel names case-insensitively, and RFC 2812
//! also considers `{|}~` to be the lowercase forms of `[\]^`. Every
//! [`Identifier`] keeps the spelling it was created with for display, plus a
//! folded form that drives equality, ordering and hashing.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Fold a single byte using the RFC 2812 case mapping.
///
/// Folding goes towards the uppercase/bracket form:
/// - `a`..=`z` → `A`..=`Z`
/// - `{` → `[`
/// - `|` → `\`
/// - `}` → `]`
/// - `~` → `^`
///
/// Every other byte folds to itself.
#[inline]
pub const fn fold_byte(b: u8) -> u8 {
    match b {
        b'a'..=b'z' => b - 32,
        b'{' => b'[',
        b'|' => b'\\',
        b'}' => b']',
        b'~' => b'^',
        _ => b,
    }
}

/// Fold a byte string using the RFC 2812 case mapping.
pub fn fold(raw: &[u8]) -> Vec<u8> {
    raw.iter().copied().map(fold_byte).collect()
}

/// Compare two byte strings as IRC identifiers.
pub fn irc_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(&x, &y)| fold_byte(x) == fold_byte(y))
}

/// A nickname or channel name with IRC case-insensitive semantics.
///
/// # Example
///
/// ```
/// use slirc_wire::Identifier;
///
/// let a = Identifier::from_bytes(b"Nick[away]");
/// let b = Identifier::from_bytes(b"nick{AWAY}");
/// assert_eq!(a, b);
/// assert_eq!(a.original(), b"Nick[away]");
/// assert_eq!(a.folded(), b"NICK[AWAY]");
/// ```
#[derive(Clone)]
pub struct Identifier {
    original: Box<[u8]>,
    folded: Box<[u8]>,
}

impl Identifier {
    /// Build an identifier, computing its folded form eagerly.
    pub fn from_bytes(raw: &[u8]) -> Self {
        Self {
            original: raw.into(),
            folded: fold(raw).into_boxed_slice(),
        }
    }

    /// The spelling the identifier was created with.
    pub fn original(&self) -> &[u8] {
        &self.original
    }

    /// The case-folded form used for comparisons.
    pub fn folded(&self) -> &[u8] {
        &self.folded
    }

    /// Whether the identifier is empty.
    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for Identifier {}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded.cmp(&other.folded)
    }
}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Identifier")
            .field(&String::from_utf8_lossy(&self.original))
            .finish()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.original))
    }
}

impl From<&[u8]> for Identifier {
    fn from(raw: &[u8]) -> Self {
        Self::from_bytes(raw)
    }
}

impl From<&str> for Identifier {
    fn from(raw: &str) -> Self {
        Self::from_bytes(raw.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashMap};

    #[test]
    fn test_fold_byte() {
        // ASCII lowercase
        assert_eq!(fold_byte(b'a'), b'A');
        assert_eq!(fold_byte(b'z'), b'Z');

        // Special IRC chars
        assert_eq!(fold_byte(b'{'), b'[');
        assert_eq!(fold_byte(b'|'), b'\\');
        assert_eq!(fold_byte(b'}'), b']');
        assert_eq!(fold_byte(b'~'), b'^');

        // Already folded or unrelated
        assert_eq!(fold_byte(b'A'), b'A');
        assert_eq!(fold_byte(b'['), b'[');
        assert_eq!(fold_byte(b'0'), b'0');
        assert_eq!(fold_byte(b'#'), b'#');
        assert_eq!(fold_byte(0xE9), 0xE9);
    }

    #[test]
    fn test_fold_total_and_idempotent() {
        for b in 0..=u8::MAX {
            assert_eq!(fold_byte(fold_byte(b)), fold_byte(b), "byte {b:#04x}");
        }
    }

    #[test]
    fn test_fold() {
        assert_eq!(fold(b"hello"), b"HELLO");
        assert_eq!(fold(b"#Channel{1}"), b"#CHANNEL[1]");
        assert_eq!(fold(b"nick|away"), b"NICK\\AWAY");
        assert_eq!(fold(b"test~name"), b"TEST^NAME");
    }

    #[test]
    fn test_irc_eq() {
        assert!(irc_eq(b"hello", b"HELLO"));
        assert!(irc_eq(b"#channel[1]", b"#CHANNEL{1}"));
        assert!(irc_eq(b"nick\\test", b"NICK|TEST"));

        assert!(!irc_eq(b"hello", b"world"));
        assert!(!irc_eq(b"short", b"longer"));
    }

    #[test]
    fn test_identifier_keeps_original() {
        let id = Identifier::from_bytes(b"MixedCase");
        assert_eq!(id.original(), b"MixedCase");
        assert_eq!(id.folded(), b"MIXEDCASE");
        assert_eq!(id.to_string(), "MixedCase");
    }

    #[test]
    fn test_identifier_as_map_key() {
        let mut seen = HashMap::new();
        seen.insert(Identifier::from("#Rust"), 1);
        seen.insert(Identifier::from("#rust"), 2);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[&Identifier::from("#RUST")], 2);
    }

    #[test]
    fn test_identifier_ordering_uses_folded_form() {
        let set: BTreeSet<_> = ["b", "A", "a", "C"]
            .into_iter()
            .map(Identifier::from)
            .collect();
        let ordered: Vec<_> = set.iter().map(|id| id.folded().to_vec()).collect();
        assert_eq!(ordered, vec![b"A".to_vec(), b"B".to_vec(), b"C".to_vec()]);
    }
}
