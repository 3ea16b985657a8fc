use bytes::Bytes;
use std::borrow::{Borrow, Cow};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// How a byte string should be rendered as text.
///
/// This is presentation only: it never affects equality, hashing, ordering
/// or encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextEncoding {
    /// UTF-8, with invalid sequences replaced when displayed.
    #[default]
    Utf8,
    /// ISO-8859-1, where every byte maps to the code point of the same value.
    Latin1,
}

/// An immutable bencode byte string.
///
/// Byte strings compare, hash and sort by their raw bytes, which is the order
/// dictionary keys are encoded in.
///
/// # Examples
///
/// ```
/// use rbencode::{ByteString, TextEncoding};
///
/// let mut name = ByteString::from_static(b"caf\xe9");
/// assert_eq!(name.as_str(), None);
///
/// name.set_encoding(TextEncoding::Latin1);
/// assert_eq!(name.to_text(), "café");
/// assert_eq!(name, ByteString::from_static(b"caf\xe9"));
/// ```
#[derive(Clone, Default)]
pub struct ByteString {
    bytes: Bytes,
    encoding: TextEncoding,
}

impl ByteString {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            encoding: TextEncoding::default(),
        }
    }

    pub fn from_static(bytes: &'static [u8]) -> Self {
        Self::new(Bytes::from_static(bytes))
    }

    pub fn copy_from_slice(bytes: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the underlying buffer without copying.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn set_encoding(&mut self, encoding: TextEncoding) {
        self.encoding = encoding;
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Returns the bytes as UTF-8, if they are valid UTF-8.
    ///
    /// This ignores the display encoding.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    /// Decodes the bytes using the display encoding.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self.encoding {
            TextEncoding::Utf8 => String::from_utf8_lossy(&self.bytes),
            TextEncoding::Latin1 => match self.as_str() {
                Some(s) if s.is_ascii() => Cow::Borrowed(s),
                _ => Cow::Owned(self.bytes.iter().map(|&b| char::from(b)).collect()),
            },
        }
    }
}

impl PartialEq for ByteString {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for ByteString {}

impl PartialOrd for ByteString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ByteString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Hash for ByteString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl Borrow<[u8]> for ByteString {
    fn borrow(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => write!(f, "ByteString({:?})", s),
            None => write!(f, "ByteString({:?})", self.bytes),
        }
    }
}

impl fmt::Display for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<Bytes> for ByteString {
    fn from(bytes: Bytes) -> Self {
        Self::new(bytes)
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for ByteString {
    fn from(bytes: &[u8]) -> Self {
        Self::copy_from_slice(bytes)
    }
}

impl From<&str> for ByteString {
    fn from(s: &str) -> Self {
        Self::copy_from_slice(s.as_bytes())
    }
}

impl From<String> for ByteString {
    fn from(s: String) -> Self {
        Self::new(s.into_bytes())
    }
}

impl PartialEq<[u8]> for ByteString {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<&[u8]> for ByteString {
    fn eq(&self, other: &&[u8]) -> bool {
        self.as_bytes() == *other
    }
}

impl PartialEq<str> for ByteString {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for ByteString {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}
