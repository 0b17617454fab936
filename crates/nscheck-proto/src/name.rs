//! DNS domain names.
//!
//! Names are kept in their presentation form, always fully qualified (with
//! the trailing root dot). Comparison and hashing are case-insensitive per
//! RFC 1035 section 2.3.3, so `Host.Zone.TLD.` and `host.zone.tld.` index to
//! the same slot.
//!
//! Labels may carry RFC 1035 escapes (`\.`, `\\`, `\DDD`); an escaped dot
//! does not end a label.

use crate::error::{Error, Result};
use crate::{MAX_LABEL_LENGTH, MAX_NAME_LENGTH};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A fully-qualified DNS domain name.
///
/// # Example
///
/// ```rust
/// use nscheck_proto::name::Name;
/// use std::str::FromStr;
///
/// let name = Name::from_str("www.example.com").unwrap();
/// assert_eq!(name.to_string(), "www.example.com.");
/// assert_eq!(name.label_count(), 4); // www, example, com, root
/// assert_eq!(Name::from_str("WWW.EXAMPLE.COM.").unwrap(), name);
/// ```
#[derive(Clone)]
pub struct Name {
    /// Presentation form, always ending with `.`.
    text: CompactString,
}

impl Name {
    /// Creates the root name (`.`).
    pub fn root() -> Self {
        Self {
            text: CompactString::new("."),
        }
    }

    /// Builds a name from already-validated, dot-terminated text.
    pub(crate) fn from_fqdn_unchecked(text: impl Into<CompactString>) -> Self {
        let text = text.into();
        debug_assert!(text.ends_with('.'));
        Self { text }
    }

    /// Returns true if `text` ends with an unescaped dot.
    pub fn is_fqdn(text: &str) -> bool {
        let Some(body) = text.strip_suffix('.') else {
            return false;
        };
        let backslashes = body.bytes().rev().take_while(|&b| b == b'\\').count();
        backslashes % 2 == 0
    }

    /// Resolves `name` against `origin` the way zone files do.
    ///
    /// `@` is the origin itself, a trailing dot marks an absolute name, and
    /// anything else is relative and gets the origin appended.
    pub fn resolve(name: &str, origin: &Name) -> Result<Self> {
        if name == "@" {
            return Ok(origin.clone());
        }
        if Self::is_fqdn(name) {
            return Self::from_str(name);
        }
        if origin.is_root() {
            return Self::from_str(&format!("{name}."));
        }
        Self::from_str(&format!("{name}.{origin}"))
    }

    /// Returns the presentation form, including the trailing dot.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns true if this is the root domain.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.text.as_str() == "."
    }

    /// Returns the number of labels, counting the root label.
    pub fn label_count(&self) -> usize {
        self.labels().count() + 1
    }

    /// Returns the non-root labels from left to right.
    pub fn labels(&self) -> impl DoubleEndedIterator<Item = &str> + '_ {
        let trimmed = self.text.strip_suffix('.').unwrap_or(self.text.as_str());
        split_labels(trimmed)
            .into_iter()
            .filter(|label| !label.is_empty())
    }

    /// Returns the parent domain, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let text = self.text.as_str();
        match label_ends(text).next() {
            Some(idx) if idx + 1 < text.len() => Some(Self::from_fqdn_unchecked(&text[idx + 1..])),
            _ => Some(Self::root()),
        }
    }

    /// Returns true if this name equals `other` or lies below it.
    pub fn is_subdomain_of(&self, other: &Name) -> bool {
        if other.is_root() {
            return true;
        }
        let mut ours = self.labels().rev();
        for theirs in other.labels().rev() {
            match ours.next() {
                Some(label) if label.eq_ignore_ascii_case(theirs) => {}
                _ => return false,
            }
        }
        true
    }

    /// Returns true if this name lies strictly below `other`.
    pub fn is_below(&self, other: &Name) -> bool {
        self.label_count() > other.label_count() && self.is_subdomain_of(other)
    }

    fn validate(text: &str) -> Result<()> {
        let mut wire_len = 1; // root label
        for (position, label) in split_labels(text).into_iter().enumerate() {
            if label.is_empty() {
                return Err(Error::EmptyLabel { position });
            }
            wire_len += 1 + label_octets(label)?;
        }
        if wire_len > MAX_NAME_LENGTH {
            return Err(Error::NameTooLong { length: wire_len });
        }
        Ok(())
    }
}

/// Byte offsets of the unescaped dots in `text`.
fn label_ends(text: &str) -> impl Iterator<Item = usize> + '_ {
    let mut escaped = false;
    text.bytes().enumerate().filter_map(move |(i, b)| {
        if escaped {
            escaped = false;
            return None;
        }
        match b {
            b'\\' => {
                escaped = true;
                None
            }
            b'.' => Some(i),
            _ => None,
        }
    })
}

/// Splits presentation text into labels at unescaped dots.
fn split_labels(text: &str) -> SmallVec<[&str; 8]> {
    let mut labels = SmallVec::new();
    let mut start = 0;
    for end in label_ends(text) {
        labels.push(&text[start..end]);
        start = end + 1;
    }
    labels.push(&text[start..]);
    labels
}

/// Validates one label and returns its length in octets, counting each
/// escape sequence as one octet.
fn label_octets(label: &str) -> Result<usize> {
    let chars: SmallVec<[char; 64]> = label.chars().collect();
    let mut octets = 0;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            let digits = chars
                .get(i + 1..i + 4)
                .filter(|d| d.iter().all(char::is_ascii_digit));
            match (digits, chars.get(i + 1)) {
                (Some(digits), _) => {
                    let value = digits
                        .iter()
                        .filter_map(|d| d.to_digit(10))
                        .fold(0, |acc, d| acc * 10 + d);
                    if value > 255 {
                        return Err(Error::InvalidLabelChar {
                            character: c,
                            position: i,
                        });
                    }
                    i += 4;
                }
                (None, Some(_)) => i += 2,
                (None, None) => {
                    return Err(Error::InvalidLabelChar {
                        character: c,
                        position: i,
                    })
                }
            }
        } else if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '*' | '/') {
            // `/` appears in RFC 2317 classless reverse delegations.
            i += 1;
        } else {
            return Err(Error::InvalidLabelChar {
                character: c,
                position: i,
            });
        }
        octets += 1;
    }
    if octets > MAX_LABEL_LENGTH {
        return Err(Error::LabelTooLong { length: octets });
    }
    Ok(octets)
}

impl FromStr for Name {
    type Err = Error;

    /// Parses a dotted name. A missing trailing dot is implied.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || s == "." {
            return Ok(Self::root());
        }

        let body = if Self::is_fqdn(s) { &s[..s.len() - 1] } else { s };
        Self::validate(body)?;

        let mut text = CompactString::with_capacity(body.len() + 1);
        text.push_str(body);
        text.push('.');
        Ok(Self { text })
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name(\"{}\")", self.text)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.text.eq_ignore_ascii_case(&other.text)
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.text.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    /// Canonical ordering (RFC 4034 section 6.1): compare labels from the
    /// root down, case-insensitively.
    fn cmp(&self, other: &Self) -> Ordering {
        let mut ours = self.labels().rev();
        let mut theirs = other.labels().rev();
        loop {
            match (ours.next(), theirs.next()) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(a), Some(b)) => {
                    let ord = a
                        .bytes()
                        .map(|c| c.to_ascii_lowercase())
                        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
            }
        }
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::root()
    }
}

impl Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
