//! Key paths locating nodes inside a configuration tree.
//!
//! Paths are written the way JavaScript property paths are: dots separate
//! keys, `[n]` addresses an array index and `["k"]` quotes a key that
//! contains separators. [`KeyPath::parse`] never fails; anything that is not
//! a separator becomes part of a key.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::Peekable;
use std::str::{Chars, FromStr};

/// One step in a [`KeyPath`].
///
/// A key whose text is the canonical decimal form of an index is equal to
/// that index, so `Key("0") == Index(0)` while `Key("00") != Index(0)`.
#[derive(Clone, Debug)]
pub enum Segment {
    /// Object member name.
    Key(String),
    /// Array position.
    Index(usize),
}

impl Segment {
    /// Returns the array position this segment addresses, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use layered_config::Segment;
    /// assert_eq!(Segment::from("3").as_index(), Some(3));
    /// assert_eq!(Segment::from("03").as_index(), None);
    /// assert_eq!(Segment::Index(7).as_index(), Some(7));
    /// ```
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(idx) => Some(*idx),
            Self::Key(key) => canonical_index(key),
        }
    }

    /// Returns the object member name this segment addresses.
    #[must_use]
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            Self::Key(key) => Cow::Borrowed(key),
            Self::Index(idx) => Cow::Owned(idx.to_string()),
        }
    }
}

/// Parse `text` as an index only when it is written canonically.
fn canonical_index(text: &str) -> Option<usize> {
    let digits = !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit());
    if !digits || (text.len() > 1 && text.starts_with('0')) {
        return None;
    }
    text.parse().ok()
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Index(a), Self::Index(b)) => a == b,
            (Self::Key(a), Self::Key(b)) => a == b,
            _ => self.as_key() == other.as_key(),
        }
    }
}

impl Eq for Segment {}

impl Hash for Segment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_key().hash(state);
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(idx) => write!(f, "{idx}"),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_owned())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(idx: usize) -> Self {
        Self::Index(idx)
    }
}

/// Ordered sequence of [`Segment`]s identifying a location in a tree.
///
/// # Examples
///
/// ```
/// use layered_config::{KeyPath, Segment};
///
/// let path = KeyPath::parse("servers[0]['host.name']");
/// assert_eq!(
///     path.segments(),
///     &[
///         Segment::from("servers"),
///         Segment::Index(0),
///         Segment::from("host.name"),
///     ]
/// );
/// assert_eq!(path.to_string(), r#"servers[0]["host.name"]"#);
/// assert_eq!(KeyPath::parse(&path.to_string()), path);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<Segment>);

impl KeyPath {
    /// The empty path, addressing the whole tree.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted/bracketed path string.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::root();
        }
        let mut segments = Vec::new();
        let mut buf = String::new();
        let mut after_bracket = false;
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '.' => {
                    if after_bracket {
                        after_bracket = false;
                    } else {
                        segments.push(Segment::Key(std::mem::take(&mut buf)));
                    }
                }
                '[' => {
                    if !buf.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut buf)));
                    }
                    segments.push(parse_bracket(&mut chars));
                    after_bracket = true;
                }
                other => {
                    after_bracket = false;
                    buf.push(other);
                }
            }
        }
        if !after_bracket {
            segments.push(Segment::Key(buf));
        }
        Self(segments)
    }

    /// Borrow the segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Number of segments.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root path.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the segments.
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.0.iter()
    }

    /// Final segment, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    /// Path without its final segment. The root is its own parent.
    #[must_use]
    pub fn parent(&self) -> Self {
        let keep = self.0.len().saturating_sub(1);
        Self(self.0.iter().take(keep).cloned().collect())
    }

    /// Whether every segment of `prefix` equals the corresponding segment of
    /// `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use layered_config::KeyPath;
    /// let leaf = KeyPath::parse("sys.logging.level");
    /// assert!(leaf.starts_with(&KeyPath::parse("sys.logging")));
    /// assert!(leaf.starts_with(&KeyPath::root()));
    /// assert!(!leaf.starts_with(&KeyPath::parse("sys.log")));
    /// ```
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Whether either path is a prefix of the other.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }

    /// Append a segment in place.
    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.0.push(segment.into());
    }

    /// Remove and return the final segment.
    pub fn pop(&mut self) -> Option<Segment> {
        self.0.pop()
    }

    /// Return a new path extended by `segment`.
    #[must_use]
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        let mut next = self.clone();
        next.push(segment);
        next
    }

    /// Return a new path with `other` appended.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        let mut next = self.clone();
        next.0.extend(other.0.iter().cloned());
        next
    }
}

/// Read a bracketed segment; the opening `[` has already been consumed.
fn parse_bracket(chars: &mut Peekable<Chars<'_>>) -> Segment {
    if let Some(quote) = chars.next_if(|c| matches!(c, '"' | '\'')) {
        let mut key = String::new();
        while let Some(ch) = chars.next() {
            match ch {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        key.push(escaped);
                    }
                }
                c if c == quote => break,
                c => key.push(c),
            }
        }
        // Skip anything between the closing quote and the bracket.
        for ch in chars.by_ref() {
            if ch == ']' {
                break;
            }
        }
        return Segment::Key(key);
    }

    let mut raw = String::new();
    for ch in chars.by_ref() {
        if ch == ']' {
            break;
        }
        raw.push(ch);
    }
    canonical_index(&raw).map_or(Segment::Key(raw), Segment::Index)
}

fn needs_quoting(key: &str) -> bool {
    key.contains(['.', '[', ']'])
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [Segment::Key(only)] = self.0.as_slice() {
            if only.is_empty() {
                return f.write_str("[\"\"]");
            }
        }
        for (pos, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Index(idx) => write!(f, "[{idx}]")?,
                Segment::Key(key) if needs_quoting(key) => {
                    let escaped = key.replace('\\', "\\\\").replace('"', "\\\"");
                    write!(f, "[\"{escaped}\"]")?;
                }
                Segment::Key(key) if pos == 0 => f.write_str(key)?,
                Segment::Key(key) => write!(f, ".{key}")?,
            }
        }
        Ok(())
    }
}

impl FromStr for KeyPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for KeyPath {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<String> for KeyPath {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl From<&String> for KeyPath {
    fn from(text: &String) -> Self {
        Self::parse(text)
    }
}

impl From<&Self> for KeyPath {
    fn from(path: &Self) -> Self {
        path.clone()
    }
}

impl From<Vec<Segment>> for KeyPath {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl FromIterator<Segment> for KeyPath {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a KeyPath {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for KeyPath {
    type Item = Segment;
    type IntoIter = std::vec::IntoIter<Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
