use bytes::BufMut;
use std::io::{self, Write};
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::trace;

use crate::byte_string::ByteString;
use crate::config::MAX_WRITE_BUFFER;
use crate::error::BencodeError;
use crate::int::{digit_count, format_i64, int_text_len, MAX_INT_TEXT_LEN};
use crate::ready::run_ready;
use crate::value::Value;

/// A destination for encoded bytes.
///
/// The write pass is written once against this trait; implementations only
/// differ in where the bytes go.
#[allow(async_fn_in_trait)]
pub trait Sink {
    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), BencodeError>;
}

/// Marker for sinks whose writes complete without suspending.
pub trait SyncSink: Sink {}

/// Writes into an in-memory buffer.
pub(crate) struct BufSink<'a, B>(pub(crate) &'a mut B);

impl<B: BufMut> Sink for BufSink<'_, B> {
    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), BencodeError> {
        self.0.put_slice(bytes);
        Ok(())
    }
}

impl<B: BufMut> SyncSink for BufSink<'_, B> {}

/// Writes into a blocking writer.
pub(crate) struct IoSink<W>(pub(crate) W);

impl<W: Write> Sink for IoSink<W> {
    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), BencodeError> {
        self.0.write_all(bytes)?;
        Ok(())
    }
}

impl<W: Write> SyncSink for IoSink<W> {}

/// Writes into an asynchronous writer.
pub(crate) struct AsyncSink<W>(pub(crate) W);

impl<W: AsyncWrite + Unpin> Sink for AsyncSink<W> {
    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), BencodeError> {
        self.0.write_all(bytes).await?;
        Ok(())
    }
}

/// Computes the exact number of bytes `value` encodes to.
///
/// This is the first of the encoder's two passes; it lets callers size a
/// buffer once before writing.
///
/// # Examples
///
/// ```
/// use rbencode::{encode, encoded_len, decode};
///
/// let value = decode(b"d3:bar4:spam3:fooi-42ee").unwrap().unwrap();
/// assert_eq!(encoded_len(&value), encode(&value).unwrap().len());
/// ```
pub fn encoded_len(value: &Value) -> usize {
    match value {
        Value::Integer(i) => int_text_len(*i) + 2,
        Value::Bytes(b) => byte_string_len(b),
        Value::List(l) => 2 + l.iter().map(encoded_len).sum::<usize>(),
        Value::Dict(d) => {
            2 + d
                .iter()
                .map(|(k, v)| byte_string_len(k) + encoded_len(v))
                .sum::<usize>()
        }
    }
}

fn byte_string_len(b: &ByteString) -> usize {
    digit_count(b.len() as u64) + 1 + b.len()
}

/// Writes the canonical encoding of `value` into `sink`.
///
/// Dictionary entries are emitted in ascending key order.
pub async fn write_value<S: Sink>(value: &Value, sink: &mut S) -> Result<(), BencodeError> {
    match value {
        Value::Integer(i) => {
            let mut buf = [0u8; MAX_INT_TEXT_LEN];
            sink.write_all(b"i").await?;
            sink.write_all(format_i64(&mut buf, *i)).await?;
            sink.write_all(b"e").await?;
        }
        Value::Bytes(b) => write_byte_string(b, sink).await?,
        Value::List(l) => {
            sink.write_all(b"l").await?;
            for item in l {
                Box::pin(write_value(item, sink)).await?;
            }
            sink.write_all(b"e").await?;
        }
        Value::Dict(d) => {
            sink.write_all(b"d").await?;
            for (key, val) in d {
                write_byte_string(key, sink).await?;
                Box::pin(write_value(val, sink)).await?;
            }
            sink.write_all(b"e").await?;
        }
    }
    Ok(())
}

async fn write_byte_string<S: Sink>(b: &ByteString, sink: &mut S) -> Result<(), BencodeError> {
    let mut buf = [0u8; MAX_INT_TEXT_LEN];
    sink.write_all(format_i64(&mut buf, b.len() as i64)).await?;
    sink.write_all(b":").await?;
    sink.write_all(b.as_bytes()).await
}

/// Drives the write pass over a sink that never suspends.
pub(crate) fn write_value_blocking<S: SyncSink>(
    value: &Value,
    sink: &mut S,
) -> Result<(), BencodeError> {
    run_ready(write_value(value, sink))
}

/// Encodes a bencode value to a byte vector.
///
/// The output follows the canonical bencode format:
/// - Integers: `i<number>e`
/// - Byte strings: `<length>:<data>`
/// - Lists: `l<items>e`
/// - Dictionaries: `d<key><value>...e` (keys sorted lexicographically)
///
/// The vector is allocated once at its final size.
///
/// # Examples
///
/// ```
/// use rbencode::{encode, Dictionary, Value};
///
/// // Encode an integer
/// let encoded = encode(&Value::Integer(42)).unwrap();
/// assert_eq!(encoded, b"i42e");
///
/// // Encode a string
/// let encoded = encode(&Value::string("hello")).unwrap();
/// assert_eq!(encoded, b"5:hello");
///
/// // Encode a list
/// let list = Value::List(vec![Value::Integer(1), Value::string("two")]);
/// let encoded = encode(&list).unwrap();
/// assert_eq!(encoded, b"li1e3:twoe");
///
/// // Encode a dictionary
/// let mut dict = Dictionary::new();
/// dict.try_insert("b", Value::Integer(2)).unwrap();
/// dict.try_insert("a", Value::Integer(1)).unwrap();
/// let encoded = encode(&Value::Dict(dict)).unwrap();
/// assert_eq!(encoded, b"d1:ai1e1:bi2ee");
/// ```
pub fn encode(value: &Value) -> Result<Vec<u8>, BencodeError> {
    let len = encoded_len(value);
    trace!("encoding {} into {} bytes", value.kind(), len);
    let mut buf = Vec::with_capacity(len);
    write_value_blocking(value, &mut BufSink(&mut buf))?;
    debug_assert_eq!(buf.len(), len);
    Ok(buf)
}

/// Appends the encoding of `value` to `buf`.
///
/// # Errors
///
/// Fails with an I/O error of kind [`WriteZero`](io::ErrorKind::WriteZero),
/// leaving `buf` untouched, when it cannot hold the whole encoding.
pub fn encode_to_buf<B: BufMut>(value: &Value, buf: &mut B) -> Result<(), BencodeError> {
    let len = encoded_len(value);
    if buf.remaining_mut() < len {
        return Err(io::Error::new(
            io::ErrorKind::WriteZero,
            format!(
                "buffer has room for {} bytes, encoding needs {}",
                buf.remaining_mut(),
                len
            ),
        )
        .into());
    }
    write_value_blocking(value, &mut BufSink(buf))
}

/// Encodes `value` into a blocking writer and returns the number of bytes written.
pub fn encode_to_writer<W: Write>(value: &Value, writer: W) -> Result<usize, BencodeError> {
    let len = encoded_len(value);
    let mut sink = IoSink(writer);
    write_value_blocking(value, &mut sink)?;
    sink.0.flush()?;
    Ok(len)
}

/// Encodes `value` into an asynchronous writer and returns the number of bytes written.
///
/// Output is buffered in a single buffer sized from the encoded length, up to
/// a fixed cap, and flushed before returning.
///
/// # Examples
///
/// ```
/// use rbencode::{encode_async, Value};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), rbencode::BencodeError> {
/// let mut out = Vec::new();
/// let written = encode_async(&Value::string("spam"), &mut out).await?;
/// assert_eq!(written, 6);
/// assert_eq!(out, b"4:spam");
/// # Ok(())
/// # }
/// ```
pub async fn encode_async<W: AsyncWrite + Unpin>(
    value: &Value,
    writer: &mut W,
) -> Result<usize, BencodeError> {
    let len = encoded_len(value);
    trace!("encoding {} into {} bytes", value.kind(), len);
    let capacity = len.clamp(1, MAX_WRITE_BUFFER);
    let mut sink = AsyncSink(BufWriter::with_capacity(capacity, writer));
    write_value(value, &mut sink).await?;
    sink.0.flush().await?;
    Ok(len)
}
