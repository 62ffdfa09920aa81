//! Incremental size enforcement for upload streams.

use crate::traits::{ByteStream, StorageError};
use futures::StreamExt;

/// Wrap `stream` so it fails with `SizeLimitExceeded` as soon as more than
/// `max_bytes` have passed through.
///
/// The chunk that crosses the limit is never yielded, so a consumer that stops
/// at the first error has written at most `max_bytes`.
pub fn enforce_size_limit(stream: ByteStream<'_>, max_bytes: u64) -> ByteStream<'_> {
    let mut seen: u64 = 0;
    let mut tripped = false;

    Box::pin(stream.map(move |chunk| {
        if tripped {
            return Err(StorageError::SizeLimitExceeded { limit: max_bytes });
        }
        let chunk = chunk?;
        seen += chunk.len() as u64;
        if seen > max_bytes {
            tripped = true;
            return Err(StorageError::SizeLimitExceeded { limit: max_bytes });
        }
        Ok(chunk)
    }))
}
