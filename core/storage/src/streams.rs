//! Byte-stream types and helpers shared by the backend adapters.

use bytes::Bytes;
use futures::{stream, Stream, StreamExt};
use std::pin::Pin;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

use portage_common::Result;

/// Lazy byte stream used for uploads and downloads.
///
/// Forward-only and not restartable once partially consumed. The stream
/// does not pre-declare its size; backends that need a known content
/// length must spool it first (see [`spool_to_tempfile`]).
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Raw content-fetch response from a client shim.
///
/// Adapters decide which status codes are acceptable; the shim only
/// reports what the backend returned.
pub struct DownloadResponse {
    pub status: u16,
    pub body: ByteStream,
}

/// Consume a stream to exhaustion into an anonymous temporary file,
/// returning the rewound file and the total byte count.
///
/// The file is unlinked on creation, so it is released on every exit
/// path, including errors and cancellation, when the handle drops.
pub async fn spool_to_tempfile(mut stream: ByteStream) -> Result<(File, u64)> {
    let mut file = File::from_std(tempfile::tempfile()?);
    let mut size: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }

    file.flush().await?;
    file.rewind().await?;
    Ok((file, size))
}

/// Wrap an in-memory buffer as a single-chunk [`ByteStream`].
pub fn from_bytes(data: impl Into<Bytes>) -> ByteStream {
    let data = data.into();
    Box::pin(stream::once(async move { Ok(data) }))
}

/// Drain a [`ByteStream`] into memory.
pub async fn collect(mut stream: ByteStream) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk?);
    }
    Ok(out)
}
