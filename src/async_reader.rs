use bytes::{Buf, Bytes, BytesMut};
use std::collections::VecDeque;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::config::DEFAULT_SEGMENT_SIZE;
use crate::error::BencodeError;
use crate::reader::Reader;

/// A reader over an asynchronous byte source.
///
/// Data arrives as a queue of immutable segments. A read that fits inside the
/// front segment is returned as a slice of it without copying; only reads that
/// span segments are copied into a fresh buffer. The optional cancellation
/// token is checked on every read and raced against every segment fetch.
///
/// # Examples
///
/// ```
/// use rbencode::{AsyncReader, Parser};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), rbencode::BencodeError> {
/// let reader = AsyncReader::new(&b"l4:spami42ee"[..]);
/// let value = Parser::new(reader).parse().await?.expect("one value");
/// assert_eq!(value.as_list().map(|l| l.len()), Some(2));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AsyncReader<R> {
    inner: R,
    segments: VecDeque<Bytes>,
    segment_size: usize,
    position: u64,
    previous: Option<u8>,
    length: Option<u64>,
    eof: bool,
    cancel: Option<CancellationToken>,
}

impl<R: AsyncRead + Unpin> AsyncReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            segments: VecDeque::new(),
            segment_size: DEFAULT_SEGMENT_SIZE,
            position: 0,
            previous: None,
            length: None,
            eof: false,
            cancel: None,
        }
    }

    /// Fails reads with [`BencodeError::Cancelled`] once `token` fires.
    ///
    /// A segment fetch that is waiting on the source is interrupted, and every
    /// later read fails up front, including reads served from segments that
    /// are already buffered.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Sets how many bytes are requested from the source per segment.
    pub fn with_segment_size(mut self, segment_size: usize) -> Self {
        self.segment_size = segment_size.max(1);
        self
    }

    /// Records the total length of the source, if known.
    pub fn with_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Number of segments currently buffered.
    pub fn buffered_segments(&self) -> usize {
        self.segments.iter().filter(|s| !s.is_empty()).count()
    }

    /// Pulls one more segment from the source. Returns false at end of input.
    async fn fill(&mut self) -> Result<bool, BencodeError> {
        if self.eof {
            return Ok(false);
        }

        let mut buf = BytesMut::with_capacity(self.segment_size);
        let read = self.inner.read_buf(&mut buf);
        let n = match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("bencode read cancelled at offset {}", self.position);
                    return Err(BencodeError::Cancelled);
                }
                n = read => n?,
            },
            None => read.await?,
        };

        if n == 0 {
            self.eof = true;
            return Ok(false);
        }

        trace!("read {} byte segment at offset {}", n, self.position);
        self.segments.push_back(buf.freeze());
        Ok(true)
    }

    fn check_cancelled(&self) -> Result<(), BencodeError> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => {
                debug!("bencode read cancelled at offset {}", self.position);
                Err(BencodeError::Cancelled)
            }
            _ => Ok(()),
        }
    }

    fn discard_empty(&mut self) {
        while self.segments.front().is_some_and(Bytes::is_empty) {
            self.segments.pop_front();
        }
    }

    fn consumed(&mut self, bytes: &[u8]) {
        self.position += bytes.len() as u64;
        if let Some(&last) = bytes.last() {
            self.previous = Some(last);
        }
    }
}

impl<R: AsyncRead + Unpin> Reader for AsyncReader<R> {
    async fn peek(&mut self) -> Result<Option<u8>, BencodeError> {
        self.check_cancelled()?;
        loop {
            self.discard_empty();
            if let Some(segment) = self.segments.front() {
                return Ok(Some(segment[0]));
            }
            if !self.fill().await? {
                return Ok(None);
            }
        }
    }

    async fn read_byte(&mut self) -> Result<Option<u8>, BencodeError> {
        let b = self.peek().await?;
        if let Some(c) = b {
            if let Some(segment) = self.segments.front_mut() {
                segment.advance(1);
            }
            self.position += 1;
            self.previous = Some(c);
        }
        Ok(b)
    }

    async fn read_bytes(&mut self, n: usize) -> Result<Bytes, BencodeError> {
        self.check_cancelled()?;
        if n == 0 || self.peek().await?.is_none() {
            return Ok(Bytes::new());
        }

        if let Some(segment) = self.segments.front_mut() {
            if segment.len() >= n {
                let out = segment.split_to(n);
                self.consumed(&out);
                return Ok(out);
            }
        }

        let mut out = BytesMut::with_capacity(n.min(self.segment_size * 2));
        while out.len() < n {
            match self.segments.pop_front() {
                Some(mut segment) => {
                    let take = segment.len().min(n - out.len());
                    out.extend_from_slice(&segment.split_to(take));
                    if !segment.is_empty() {
                        self.segments.push_front(segment);
                    }
                }
                None => {
                    if !self.fill().await? {
                        break;
                    }
                }
            }
        }

        let out = out.freeze();
        self.consumed(&out);
        Ok(out)
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
