use sha1::{Digest, Sha1};

use crate::encode::{write_value_blocking, Sink, SyncSink};
use crate::error::BencodeError;
use crate::value::Value;

struct HashSink(Sha1);

impl Sink for HashSink {
    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), BencodeError> {
        self.0.update(bytes);
        Ok(())
    }
}

impl SyncSink for HashSink {}

/// Computes the SHA-1 hash of the canonical encoding of `value`.
///
/// Applied to a torrent's `info` dictionary this yields its v1 info hash. The
/// encoding is streamed into the hasher, so no intermediate buffer is built.
///
/// # Examples
///
/// ```
/// use rbencode::{decode, encode, info_hash};
/// use sha1::{Digest, Sha1};
///
/// let info = decode(b"d6:lengthi1024e4:name8:test.txte").unwrap().unwrap();
/// let expected: [u8; 20] = Sha1::digest(encode(&info).unwrap()).into();
/// assert_eq!(info_hash(&info).unwrap(), expected);
/// ```
pub fn info_hash(value: &Value) -> Result<[u8; 20], BencodeError> {
    let mut sink = HashSink(Sha1::new());
    write_value_blocking(value, &mut sink)?;
    Ok(sink.0.finalize().into())
}
