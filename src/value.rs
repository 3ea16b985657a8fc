use bytes::Bytes;
use std::fmt;

use crate::byte_string::ByteString;
use crate::dict::Dictionary;
use crate::encode::encoded_len;

/// The four kinds of bencode node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    ByteString,
    Integer,
    List,
    Dictionary,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::ByteString => "byte string",
            NodeKind::Integer => "integer",
            NodeKind::List => "list",
            NodeKind::Dictionary => "dictionary",
        })
    }
}

/// A bencode value.
///
/// Bencode has four data types: integers, byte strings, lists, and dictionaries.
/// This enum represents any bencode value and provides methods for type-safe access.
///
/// # Examples
///
/// ```
/// use rbencode::{Dictionary, Value};
///
/// // Creating values directly
/// let int = Value::Integer(42);
/// let string = Value::string("hello");
/// let list = Value::List(vec![Value::Integer(1), Value::Integer(2)]);
///
/// // Using From implementations
/// let int: Value = 42i64.into();
/// let string: Value = "hello".into();
///
/// // Accessing values
/// assert_eq!(int.as_integer(), Some(42));
/// assert_eq!(string.as_str(), Some("hello"));
/// assert_eq!(list.encoded_len(), 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A signed 64-bit integer.
    Integer(i64),
    /// A byte string (may or may not be valid UTF-8).
    Bytes(ByteString),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A dictionary with byte string keys, kept in canonical order.
    Dict(Dictionary),
}

impl Value {
    /// Creates a byte string value from a UTF-8 string.
    pub fn string(s: &str) -> Self {
        Value::Bytes(ByteString::from(s))
    }

    /// Creates a byte string value from raw bytes.
    pub fn bytes(b: impl Into<Bytes>) -> Self {
        Value::Bytes(ByteString::new(b))
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Value::Integer(_) => NodeKind::Integer,
            Value::Bytes(_) => NodeKind::ByteString,
            Value::List(_) => NodeKind::List,
            Value::Dict(_) => NodeKind::Dictionary,
        }
    }

    /// Returns the exact number of bytes this value encodes to.
    pub fn encoded_len(&self) -> usize {
        encoded_len(self)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_byte_string(&self) -> Option<&ByteString> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the raw bytes, if this is a byte string.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbencode::Value;
    ///
    /// let value = Value::string("hello");
    /// assert_eq!(value.as_bytes(), Some(b"hello".as_slice()));
    /// ```
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.as_byte_string().map(ByteString::as_bytes)
    }

    /// Returns the value as a UTF-8 string, if it is a valid UTF-8 byte string.
    pub fn as_str(&self) -> Option<&str> {
        self.as_byte_string()?.as_str()
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Consumes the value and returns the dictionary, if it is one.
    pub fn into_dict(self) -> Option<Dictionary> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Looks up a key in this value if it is a dictionary.
    ///
    /// Returns `None` if the value is not a dictionary or if the key is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbencode::decode;
    ///
    /// let value = decode(b"d3:foo3:bare").unwrap().unwrap();
    /// assert_eq!(value.get(b"foo").and_then(|v| v.as_str()), Some("bar"));
    /// assert_eq!(value.get(b"missing"), None);
    /// ```
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.as_dict()?.get(key)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Bytes(ByteString::from(s))
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(ByteString::new(b))
    }
}

impl From<ByteString> for Value {
    fn from(b: ByteString) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

impl From<Dictionary> for Value {
    fn from(d: Dictionary) -> Self {
        Value::Dict(d)
    }
}

/// A type that a top-level value can be required to be.
///
/// Used by [`decode_as`](crate::decode_as) and [`Parser::parse_as`](crate::Parser::parse_as)
/// to reject input whose top-level node is of the wrong kind.
pub trait FromValue: Sized {
    /// The node kind this type is extracted from.
    const KIND: NodeKind;

    /// Extracts `Self`, handing the value back if it is of another kind.
    fn from_value(value: Value) -> Result<Self, Value>;
}

impl FromValue for i64 {
    const KIND: NodeKind = NodeKind::Integer;

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Integer(i) => Ok(i),
            other => Err(other),
        }
    }
}

impl FromValue for ByteString {
    const KIND: NodeKind = NodeKind::ByteString;

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Bytes(b) => Ok(b),
            other => Err(other),
        }
    }
}

impl FromValue for Vec<Value> {
    const KIND: NodeKind = NodeKind::List;

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::List(l) => Ok(l),
            other => Err(other),
        }
    }
}

impl FromValue for Dictionary {
    const KIND: NodeKind = NodeKind::Dictionary;

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Dict(d) => Ok(d),
            other => Err(other),
        }
    }
}
