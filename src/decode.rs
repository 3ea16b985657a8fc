use bytes::Bytes;
use std::io::{BufReader, Read};
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::async_reader::AsyncReader;
use crate::byte_string::ByteString;
use crate::config::{ParserConfig, MAX_INTEGER_DIGITS, MAX_LENGTH_DIGITS};
use crate::dict::Dictionary;
use crate::error::BencodeError;
use crate::int::{parse_i64, IntError, MAX_INT_TEXT_LEN};
use crate::reader::{IoReader, Reader, SliceReader, SyncReader};
use crate::ready::run_ready;
use crate::value::{FromValue, NodeKind, Value};

/// A recursive-descent bencode parser over any [`Reader`].
///
/// The grammar is written once as `async` functions. Over an
/// [`AsyncReader`] every segment fetch is a suspension point; over a
/// [`SyncReader`] the same code completes without suspending and can be run
/// with [`next_value_blocking`](Parser::next_value_blocking) or
/// [`parse_blocking`](Parser::parse_blocking).
///
/// # Examples
///
/// Reading several concatenated values from one source:
///
/// ```
/// use rbencode::{Parser, SliceReader, Value};
///
/// let mut parser = Parser::new(SliceReader::new(&b"i1e4:spamle"[..]));
/// assert_eq!(parser.next_value_blocking().unwrap(), Some(Value::Integer(1)));
/// assert_eq!(parser.next_value_blocking().unwrap(), Some(Value::string("spam")));
/// assert_eq!(parser.next_value_blocking().unwrap(), Some(Value::List(vec![])));
/// assert_eq!(parser.next_value_blocking().unwrap(), None);
/// ```
#[derive(Debug)]
pub struct Parser<R> {
    reader: R,
    config: ParserConfig,
    depth: usize,
}

impl<R: Reader> Parser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            config: ParserConfig::default(),
            depth: 0,
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Parses the next value, or returns `None` if the source is exhausted.
    ///
    /// Errors abort the value entirely; no partial value is produced.
    pub async fn next_value(&mut self) -> Result<Option<Value>, BencodeError> {
        self.depth = 0;
        let start = self.reader.position();
        let result = self.parse_value().await;
        match &result {
            Ok(Some(value)) => trace!(
                "parsed {} spanning offsets {}..{}",
                value.kind(),
                start,
                self.reader.position()
            ),
            Ok(None) => {}
            Err(e) => debug!("bencode parse failed: {}", e),
        }
        result
    }

    /// Parses the next value, requiring it to be of kind `T`.
    pub async fn next_value_as<T: FromValue>(&mut self) -> Result<Option<T>, BencodeError> {
        let start = self.reader.position();
        match self.next_value().await? {
            Some(value) => expect_kind(value, start).map(Some),
            None => Ok(None),
        }
    }

    /// Parses at most one value and requires the source to end after it.
    ///
    /// Empty input yields `Ok(None)`; bytes left after the value are an error.
    pub async fn parse(&mut self) -> Result<Option<Value>, BencodeError> {
        let value = self.next_value().await?;
        self.finish().await?;
        Ok(value)
    }

    /// Like [`parse`](Parser::parse), but requires the value to be of kind `T`.
    pub async fn parse_as<T: FromValue>(&mut self) -> Result<Option<T>, BencodeError> {
        let start = self.reader.position();
        match self.parse().await? {
            Some(value) => expect_kind(value, start).map(Some),
            None => Ok(None),
        }
    }

    /// Fails if any bytes remain in the source.
    pub async fn finish(&mut self) -> Result<(), BencodeError> {
        let pos = self.reader.position();
        match self.reader.peek().await? {
            None => Ok(()),
            Some(c) => Err(BencodeError::invalid(
                pos,
                None,
                format!("trailing data after value, starting with {}", describe(c)),
            )),
        }
    }

    /// Selects a sub-parser from the lookahead byte.
    async fn parse_value(&mut self) -> Result<Option<Value>, BencodeError> {
        let pos = self.reader.position();
        let value = match self.reader.peek().await? {
            None => return Ok(None),
            Some(b'0'..=b'9') => Value::Bytes(self.parse_byte_string().await?),
            Some(b'i') => Value::Integer(self.parse_integer().await?),
            Some(b'l') => Value::List(Box::pin(self.parse_list()).await?),
            Some(b'd') => Value::Dict(Box::pin(self.parse_dictionary()).await?),
            Some(c) => {
                return Err(BencodeError::invalid(
                    pos,
                    None,
                    format!("unexpected beginning character {}", describe(c)),
                ))
            }
        };
        Ok(Some(value))
    }

    async fn parse_byte_string(&mut self) -> Result<ByteString, BencodeError> {
        const NODE: Option<NodeKind> = Some(NodeKind::ByteString);
        let start = self.reader.position();

        let mut digits = [0u8; MAX_LENGTH_DIGITS];
        let mut count = 0;
        loop {
            let pos = self.reader.position();
            match self.reader.peek().await? {
                Some(c) if c.is_ascii_digit() => {
                    if count == MAX_LENGTH_DIGITS {
                        return Err(BencodeError::unsupported(
                            start,
                            NODE,
                            format!(
                                "length prefix has more than {} digits, implies a string over 10GB",
                                MAX_LENGTH_DIGITS
                            ),
                        ));
                    }
                    digits[count] = c;
                    count += 1;
                    self.reader.read_byte().await?;
                }
                Some(b':') => {
                    self.reader.read_byte().await?;
                    break;
                }
                Some(c) => {
                    return Err(BencodeError::invalid(
                        pos,
                        NODE,
                        format!("expected ':' but found {}", describe(c)),
                    ))
                }
                None => {
                    return Err(BencodeError::invalid(
                        pos,
                        NODE,
                        "expected ':' but reached end of input",
                    ))
                }
            }
        }

        let digits = &digits[..count];
        if digits.len() > 1 && digits[0] == b'0' {
            return Err(BencodeError::invalid(
                start,
                NODE,
                "leading zeros not valid in length prefix",
            ));
        }
        let len = parse_i64(digits).map_err(|e| {
            BencodeError::invalid(start, NODE, format!("malformed length prefix: {}", e))
        })?;

        let max = self.config.max_string_length;
        let len = match usize::try_from(len) {
            Ok(len) if len <= max => len,
            _ => {
                return Err(BencodeError::unsupported(
                    start,
                    NODE,
                    format!("length {} exceeds the maximum of {} bytes", len, max),
                ))
            }
        };

        // Fail before reading when the source is known to be too short.
        let body_start = self.reader.position();
        if let Some(total) = self.reader.length() {
            let available = total.saturating_sub(body_start);
            if available < len as u64 {
                return Err(short_read(start, len, available));
            }
        }

        let bytes = self.reader.read_bytes(len).await?;
        if bytes.len() < len {
            return Err(short_read(start, len, bytes.len() as u64));
        }
        Ok(ByteString::new(bytes))
    }

    async fn parse_integer(&mut self) -> Result<i64, BencodeError> {
        const NODE: Option<NodeKind> = Some(NodeKind::Integer);
        let start = self.reader.position();
        self.expect(b'i', NodeKind::Integer).await?;

        // Only the first MAX_INT_TEXT_LEN bytes are kept; longer runs are
        // counted and rejected below.
        let mut text = [0u8; MAX_INT_TEXT_LEN];
        let mut count = 0usize;
        let mut stray = None;
        loop {
            let pos = self.reader.position();
            match self.reader.read_byte().await? {
                None => {
                    return Err(BencodeError::invalid(
                        start,
                        NODE,
                        "missing end character 'e', reached end of input",
                    ))
                }
                Some(b'e') => break,
                Some(c) => {
                    let sign = c == b'-' && count == 0;
                    if !sign && !c.is_ascii_digit() && stray.is_none() {
                        stray = Some((pos, c));
                    }
                    if count < text.len() {
                        text[count] = c;
                    }
                    count += 1;
                }
            }
        }

        if let Some((pos, c)) = stray {
            return Err(BencodeError::invalid(
                pos,
                NODE,
                format!("unexpected character {} in integer", describe(c)),
            ));
        }

        let negative = count > 0 && text[0] == b'-';
        let digit_count = count - usize::from(negative);
        if digit_count == 0 {
            return Err(BencodeError::invalid(start, NODE, "contains no digits"));
        }
        if digit_count > MAX_INTEGER_DIGITS {
            return Err(BencodeError::unsupported(
                start,
                NODE,
                format!(
                    "{} digits, more than {} cannot fit in 64-bit",
                    digit_count, MAX_INTEGER_DIGITS
                ),
            ));
        }

        let text = &text[..count];
        let magnitude = &text[usize::from(negative)..];
        if magnitude[0] == b'0' {
            if negative && digit_count == 1 {
                return Err(BencodeError::invalid(start, NODE, "'-0' is not a valid number"));
            }
            if digit_count > 1 {
                return Err(BencodeError::invalid(start, NODE, "leading zeros not valid"));
            }
        }

        parse_i64(text).map_err(|e| match e {
            IntError::Overflow => BencodeError::unsupported(
                start,
                NODE,
                "magnitude exceeds the signed 64-bit range",
            ),
            other => BencodeError::invalid(start, NODE, other.to_string()),
        })
    }

    async fn parse_list(&mut self) -> Result<Vec<Value>, BencodeError> {
        let start = self.reader.position();
        self.expect(b'l', NodeKind::List).await?;
        self.enter(start, NodeKind::List)?;

        let mut items = Vec::new();
        loop {
            match self.reader.peek().await? {
                None => return Err(missing_end(start, NodeKind::List, self.reader.previous())),
                Some(b'e') => {
                    self.reader.read_byte().await?;
                    break;
                }
                Some(_) => {
                    if let Some(item) = self.parse_value().await? {
                        items.push(item);
                    }
                }
            }
        }

        self.depth -= 1;
        Ok(items)
    }

    async fn parse_dictionary(&mut self) -> Result<Dictionary, BencodeError> {
        const NODE: NodeKind = NodeKind::Dictionary;
        let start = self.reader.position();
        self.expect(b'd', NODE).await?;
        self.enter(start, NODE)?;

        let mut dict = Dictionary::new();
        loop {
            let key_start = self.reader.position();
            match self.reader.peek().await? {
                None => return Err(missing_end(start, NODE, self.reader.previous())),
                Some(b'e') => {
                    self.reader.read_byte().await?;
                    break;
                }
                Some(_) => {}
            }

            let key = self.parse_byte_string().await.map_err(|e| {
                e.context(
                    key_start,
                    NODE,
                    "dictionary keys must be strings, could not parse key",
                )
            })?;

            let value_start = self.reader.position();
            let value = match self.parse_value().await {
                Ok(Some(value)) => value,
                Ok(None) => {
                    return Err(BencodeError::invalid(
                        value_start,
                        Some(NODE),
                        format!("missing value for key {}, reached end of input", key),
                    ))
                }
                Err(e) => {
                    return Err(e.context(value_start, NODE, "could not parse dictionary value"))
                }
            };

            dict.try_insert(key, value).map_err(|e| {
                BencodeError::invalid(
                    key_start,
                    Some(NODE),
                    format!("dictionary already contains key {}", e.key),
                )
            })?;
        }

        self.depth -= 1;
        Ok(dict)
    }

    async fn expect(&mut self, marker: u8, node: NodeKind) -> Result<(), BencodeError> {
        let pos = self.reader.position();
        match self.reader.read_byte().await? {
            Some(c) if c == marker => Ok(()),
            Some(c) => Err(BencodeError::invalid(
                pos,
                Some(node),
                format!("expected {} but found {}", describe(marker), describe(c)),
            )),
            None => Err(BencodeError::invalid(
                pos,
                Some(node),
                format!("expected {} but reached end of input", describe(marker)),
            )),
        }
    }

    fn enter(&mut self, start: u64, node: NodeKind) -> Result<(), BencodeError> {
        if self.depth >= self.config.max_depth {
            return Err(BencodeError::unsupported(
                start,
                Some(node),
                format!("nesting deeper than {} levels", self.config.max_depth),
            ));
        }
        self.depth += 1;
        Ok(())
    }
}

impl<R: SyncReader> Parser<R> {
    /// Runs [`next_value`](Parser::next_value) on the calling thread.
    pub fn next_value_blocking(&mut self) -> Result<Option<Value>, BencodeError> {
        run_ready(self.next_value())
    }

    /// Runs [`parse`](Parser::parse) on the calling thread.
    pub fn parse_blocking(&mut self) -> Result<Option<Value>, BencodeError> {
        run_ready(self.parse())
    }

    /// Runs [`parse_as`](Parser::parse_as) on the calling thread.
    pub fn parse_as_blocking<T: FromValue>(&mut self) -> Result<Option<T>, BencodeError> {
        run_ready(self.parse_as())
    }
}

fn expect_kind<T: FromValue>(value: Value, start: u64) -> Result<T, BencodeError> {
    T::from_value(value).map_err(|other| {
        BencodeError::invalid(
            start,
            Some(T::KIND),
            format!("expected {} but found {}", T::KIND, other.kind()),
        )
    })
}

fn short_read(start: u64, expected: usize, available: u64) -> BencodeError {
    BencodeError::invalid(
        start,
        Some(NodeKind::ByteString),
        format!("expected {} bytes, could only read {}", expected, available),
    )
}

fn missing_end(start: u64, node: NodeKind, previous: Option<u8>) -> BencodeError {
    let message = match previous {
        Some(c) => format!(
            "missing end character 'e', reached end of input after {}",
            describe(c)
        ),
        None => "missing end character 'e', reached end of input".to_string(),
    };
    BencodeError::invalid(start, Some(node), message)
}

fn describe(c: u8) -> String {
    if c.is_ascii_graphic() || c == b' ' {
        format!("'{}'", c as char)
    } else {
        format!("byte 0x{:02x}", c)
    }
}

/// Decodes a single bencode value from a byte slice.
///
/// Empty input is not an error: it decodes to `None`. The input is copied
/// once; byte strings in the result share that copy.
///
/// # Errors
///
/// Fails with [`ErrorKind::Invalid`](crate::ErrorKind::Invalid) on malformed
/// input or trailing data, and with
/// [`ErrorKind::Unsupported`](crate::ErrorKind::Unsupported) when a value
/// exceeds the engine's limits.
///
/// # Examples
///
/// ```
/// use rbencode::{decode, ErrorKind, Value};
///
/// assert_eq!(decode(b"i42e").unwrap(), Some(Value::Integer(42)));
/// assert_eq!(decode(b"").unwrap(), None);
/// assert_eq!(decode(b"i01e").unwrap_err().kind(), ErrorKind::Invalid);
/// assert_eq!(decode(b"i9223372036854775808e").unwrap_err().kind(), ErrorKind::Unsupported);
/// assert_eq!(decode(b"i1ei2e").unwrap_err().kind(), ErrorKind::Invalid);
/// ```
pub fn decode(data: &[u8]) -> Result<Option<Value>, BencodeError> {
    decode_bytes(Bytes::copy_from_slice(data))
}

/// Decodes a single bencode value without copying the input.
pub fn decode_bytes(data: Bytes) -> Result<Option<Value>, BencodeError> {
    Parser::new(SliceReader::new(data)).parse_blocking()
}

/// Decodes a single value of kind `T`.
///
/// # Examples
///
/// ```
/// use rbencode::{decode_as, Dictionary};
///
/// let dict: Dictionary = decode_as(b"d3:cow3:mooe").unwrap().unwrap();
/// assert_eq!(dict.len(), 1);
/// assert!(decode_as::<Dictionary>(b"le").is_err());
/// ```
pub fn decode_as<T: FromValue>(data: &[u8]) -> Result<Option<T>, BencodeError> {
    Parser::new(SliceReader::from_slice(data)).parse_as_blocking()
}

/// Decodes a single value from a blocking source, reading it to the end.
pub fn decode_from_reader<R: Read>(reader: R) -> Result<Option<Value>, BencodeError> {
    Parser::new(IoReader::new(BufReader::new(reader))).parse_blocking()
}

/// Decodes a single value from an asynchronous source, reading it to the end.
pub async fn decode_async<R: AsyncRead + Unpin>(
    reader: R,
) -> Result<Option<Value>, BencodeError> {
    Parser::new(AsyncReader::new(reader)).parse().await
}

/// Like [`decode_async`], but gives up with [`BencodeError::Cancelled`] once
/// `token` is cancelled.
pub async fn decode_async_with_cancel<R: AsyncRead + Unpin>(
    reader: R,
    token: CancellationToken,
) -> Result<Option<Value>, BencodeError> {
    Parser::new(AsyncReader::new(reader).with_cancellation(token))
        .parse()
        .await
}
