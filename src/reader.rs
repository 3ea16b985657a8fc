//! Single-byte-lookahead readers.
//!
//! The grammar in [`Parser`](crate::Parser) is written once against the
//! [`Reader`] trait. Each transport implements the trait with exactly one
//! lookahead slot:
//!
//! - [`SliceReader`] over an in-memory [`Bytes`] buffer
//! - [`IoReader`] over any blocking [`std::io::Read`]
//! - [`AsyncReader`](crate::AsyncReader) over a [`tokio::io::AsyncRead`]
//!
//! Readers whose futures always complete on the first poll are marked
//! [`SyncReader`] and can be driven without a runtime.

use bytes::Bytes;
use std::io::{self, Read};

use crate::error::BencodeError;

/// A byte source with one byte of lookahead.
///
/// `peek` never consumes and returns the same byte until the next read.
/// `None` means the end of the source was reached.
#[allow(async_fn_in_trait)]
pub trait Reader {
    /// Returns the next byte without consuming it.
    async fn peek(&mut self) -> Result<Option<u8>, BencodeError>;

    /// Consumes and returns the next byte.
    async fn read_byte(&mut self) -> Result<Option<u8>, BencodeError>;

    /// Reads up to `n` bytes. Fewer are returned only at the end of the source.
    async fn read_bytes(&mut self, n: usize) -> Result<Bytes, BencodeError>;

    /// Number of bytes consumed so far.
    fn position(&self) -> u64;

    /// Total length of the source, if it can be known up front.
    fn length(&self) -> Option<u64>;

    /// The last byte consumed.
    fn previous(&self) -> Option<u8>;

    async fn is_eof(&mut self) -> Result<bool, BencodeError> {
        Ok(self.peek().await?.is_none())
    }
}

/// Marker for readers that never suspend.
///
/// Every future returned by a `SyncReader` completes on its first poll, which
/// lets the parser run them to completion on the calling thread.
pub trait SyncReader: Reader {}

/// A reader over an in-memory buffer.
///
/// Byte strings are returned as slices of the original buffer without copying.
#[derive(Debug, Clone)]
pub struct SliceReader {
    data: Bytes,
    pos: usize,
}

impl SliceReader {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }

    /// Copies `data` into a new buffer.
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// The bytes not yet consumed.
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.pos..]
    }
}

impl Reader for SliceReader {
    async fn peek(&mut self) -> Result<Option<u8>, BencodeError> {
        Ok(self.data.get(self.pos).copied())
    }

    async fn read_byte(&mut self) -> Result<Option<u8>, BencodeError> {
        let b = self.data.get(self.pos).copied();
        if b.is_some() {
            self.pos += 1;
        }
        Ok(b)
    }

    async fn read_bytes(&mut self, n: usize) -> Result<Bytes, BencodeError> {
        let end = self.pos.saturating_add(n).min(self.data.len());
        let out = self.data.slice(self.pos..end);
        self.pos = end;
        Ok(out)
    }

    fn position(&self) -> u64 {
        self.pos as u64
    }

    fn length(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }

    fn previous(&self) -> Option<u8> {
        self.pos.checked_sub(1).map(|i| self.data[i])
    }
}

impl SyncReader for SliceReader {}

/// A reader over a blocking byte source.
///
/// Bytes are pulled one at a time for lookahead, so wrap unbuffered sources
/// such as files in a [`std::io::BufReader`].
#[derive(Debug)]
pub struct IoReader<R> {
    inner: R,
    peeked: Option<Option<u8>>,
    position: u64,
    previous: Option<u8>,
    length: Option<u64>,
}

impl<R: Read> IoReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            peeked: None,
            position: 0,
            previous: None,
            length: None,
        }
    }

    /// Records the total length of the source, e.g. from file metadata.
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fetch(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read> Reader for IoReader<R> {
    async fn peek(&mut self) -> Result<Option<u8>, BencodeError> {
        if let Some(b) = self.peeked {
            return Ok(b);
        }
        let b = self.fetch()?;
        self.peeked = Some(b);
        Ok(b)
    }

    async fn read_byte(&mut self) -> Result<Option<u8>, BencodeError> {
        let b = match self.peeked.take() {
            Some(b) => b,
            None => self.fetch()?,
        };
        match b {
            Some(c) => {
                self.position += 1;
                self.previous = Some(c);
            }
            None => self.peeked = Some(None),
        }
        Ok(b)
    }

    async fn read_bytes(&mut self, n: usize) -> Result<Bytes, BencodeError> {
        if n == 0 {
            return Ok(Bytes::new());
        }

        let mut out = Vec::new();
        match self.peeked.take() {
            Some(Some(c)) => out.push(c),
            Some(None) => {
                self.peeked = Some(None);
                return Ok(Bytes::new());
            }
            None => {}
        }

        // Grows with the data actually read rather than the requested length.
        let wanted = (n - out.len()) as u64;
        self.inner.by_ref().take(wanted).read_to_end(&mut out)?;

        if out.len() < n {
            self.peeked = Some(None);
        }
        self.position += out.len() as u64;
        if let Some(&last) = out.last() {
            self.previous = Some(last);
        }
        Ok(Bytes::from(out))
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn length(&self) -> Option<u64> {
        self.length
    }

    fn previous(&self) -> Option<u8> {
        self.previous
    }
}

impl<R: Read> SyncReader for IoReader<R> {}
