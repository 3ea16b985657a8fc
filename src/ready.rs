//! Runs futures that are known never to suspend.

use std::future::Future;
use std::io;
use std::pin::pin;
use std::task::{Context, Poll, Waker};

use crate::error::BencodeError;

/// Polls `fut` once and returns its output.
///
/// Only used with [`SyncReader`](crate::SyncReader) and
/// [`SyncSink`](crate::SyncSink) implementations, whose futures complete on
/// the first poll. A pending future means a non-blocking source slipped
/// through and is reported as [`io::ErrorKind::WouldBlock`].
pub(crate) fn run_ready<T, F>(fut: F) -> Result<T, BencodeError>
where
    F: Future<Output = Result<T, BencodeError>>,
{
    let mut fut = pin!(fut);
    let mut cx = Context::from_waker(Waker::noop());
    match fut.as_mut().poll(&mut cx) {
        Poll::Ready(result) => result,
        Poll::Pending => Err(BencodeError::Io(io::Error::new(
            io::ErrorKind::WouldBlock,
            "synchronous reader or sink suspended",
        ))),
    }
}
