//! rbencode - Streaming Bencode encoding and decoding ([BEP-3])
//!
//! Bencode is the serialization format used throughout BitTorrent for storing
//! and transmitting structured data, including `.torrent` files and tracker
//! responses.
//!
//! # Data Types
//!
//! Bencode supports four data types:
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` → 42 |
//! | Byte String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spami42ee` → ["spam", 42] |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` → {"foo": "bar"} |
//!
//! # Architecture
//!
//! - [`Reader`] - one-byte-lookahead cursor, implemented by [`SliceReader`],
//!   [`IoReader`] (blocking) and [`AsyncReader`] (segmented, zero-copy)
//! - [`Parser`] - recursive-descent grammar written once over any [`Reader`]
//! - [`Value`], [`ByteString`], [`Dictionary`] - the node model
//! - [`encoded_len`] / [`write_value`] - the two-pass canonical encoder over any [`Sink`]
//!
//! # Examples
//!
//! ## Decoding bencode data
//!
//! ```
//! use rbencode::{decode, Value};
//!
//! // Decode an integer
//! let value = decode(b"i42e").unwrap().unwrap();
//! assert_eq!(value.as_integer(), Some(42));
//!
//! // Decode a string
//! let value = decode(b"4:spam").unwrap().unwrap();
//! assert_eq!(value.as_str(), Some("spam"));
//!
//! // Decode a list
//! let value = decode(b"l4:spami42ee").unwrap().unwrap();
//! let list = value.as_list().unwrap();
//! assert_eq!(list.len(), 2);
//!
//! // Decode a dictionary
//! let value = decode(b"d3:foo3:bare").unwrap().unwrap();
//! let foo = value.get(b"foo").unwrap();
//! assert_eq!(foo.as_str(), Some("bar"));
//! ```
//!
//! ## Canonical encoding
//!
//! Dictionaries always encode with their keys in ascending byte order, so the
//! same content always produces the same bytes:
//!
//! ```
//! use rbencode::{decode, encode};
//!
//! let sorted = decode(b"d1:a2:bc3:one3:twoe").unwrap().unwrap();
//! let unsorted = decode(b"d3:one3:two1:a2:bce").unwrap().unwrap();
//! assert_eq!(sorted, unsorted);
//! assert_eq!(encode(&unsorted).unwrap(), b"d1:a2:bc3:one3:twoe");
//! ```
//!
//! # Error Handling
//!
//! Every parse error is a [`BencodeError`] carrying the byte offset of the
//! offending token:
//!
//! - [`ErrorKind::Invalid`] - malformed input (bad marker, missing `e`,
//!   leading zeros, duplicate or non-string dictionary key, truncated string)
//! - [`ErrorKind::Unsupported`] - well-formed input beyond the engine's limits
//!   (integers outside `i64`, strings over 2^31-1 bytes, nesting deeper than
//!   [`ParserConfig::max_depth`])
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod async_reader;
mod byte_string;
mod config;
mod decode;
mod dict;
mod digest;
mod encode;
mod error;
mod int;
mod reader;
mod ready;
mod value;

pub use async_reader::AsyncReader;
pub use byte_string::{ByteString, TextEncoding};
pub use config::{
    ParserConfig, DEFAULT_MAX_DEPTH, DEFAULT_SEGMENT_SIZE, MAX_INTEGER_DIGITS, MAX_LENGTH_DIGITS,
    MAX_STRING_LENGTH,
};
pub use decode::{
    decode, decode_as, decode_async, decode_async_with_cancel, decode_bytes, decode_from_reader,
    Parser,
};
pub use dict::{Dictionary, DuplicateKeyError};
pub use digest::info_hash;
pub use encode::{
    encode, encode_async, encode_to_buf, encode_to_writer, encoded_len, write_value, Sink,
    SyncSink,
};
pub use error::{BencodeError, ErrorKind};
pub use int::{parse_i64, IntError};
pub use reader::{IoReader, Reader, SliceReader, SyncReader};
pub use value::{FromValue, NodeKind, Value};

#[cfg(test)]
mod tests;
