//! Reading chunk-size lines from an async byte stream.
//!
//! This is the buffering loop around the chunk-size line scanner: bytes
//! are appended to a caller-owned [`BytesMut`] until a whole line is seen,
//! which is then split off and scanned no further. Anything read past the line stays in the
//! buffer for the caller (the chunk-data, typically).

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::chunk::{Halt, OwnedChunkHeader, scan_spans};
use crate::error::ChunkError;

/// Limits for [`read_chunk_header`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Largest incomplete line kept in the buffer before giving up.
    pub max_line_len: usize,
    /// Spare capacity reserved before each read.
    pub read_size: usize,
}

impl ReaderConfig {
    pub const DEFAULT_MAX_LINE_LEN: usize = 4096;
    pub const DEFAULT_READ_SIZE: usize = 512;

    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len;
        self
    }

    pub fn with_read_size(mut self, read_size: usize) -> Self {
        self.read_size = read_size.max(1);
        self
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_line_len: Self::DEFAULT_MAX_LINE_LEN,
            read_size: Self::DEFAULT_READ_SIZE,
        }
    }
}

/// Reads one chunk-size line, using `buf` for bytes already received.
///
/// On success the line is removed from the front of `buf`. On error `buf`
/// is left as it was after the last read.
pub async fn read_chunk_header<R>(
    reader: &mut R,
    buf: &mut BytesMut,
    config: &ReaderConfig,
) -> Result<OwnedChunkHeader, ChunkError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    loop {
        let parsed = match scan_spans(&buf[..]) {
            Ok(spans) => Some(spans),
            Err(Halt::Partial) => None,
            Err(Halt::Invalid) => {
                tracing::debug!(buffered = buf.len(), "rejecting invalid chunk-size line");
                return Err(ChunkError::Invalid);
            }
        };

        let Some(spans) = parsed else {
            if buf.len() > config.max_line_len {
                tracing::debug!(
                    buffered = buf.len(),
                    limit = config.max_line_len,
                    "chunk-size line too long"
                );
                return Err(ChunkError::LineTooLong {
                    limit: config.max_line_len,
                });
            }

            buf.reserve(config.read_size);
            if reader.read_buf(buf).await? == 0 {
                tracing::debug!(buffered = buf.len(), "eof inside chunk-size line");
                return Err(ChunkError::UnexpectedEof);
            }
            continue;
        };

        let line = buf.split_to(spans.consumed).freeze();
        let header = spans.into_owned(&line);
        tracing::debug!(
            size = header.size,
            extensions = header.extensions.len(),
            consumed = header.consumed(),
            "read chunk-size line"
        );
        return Ok(header);
    }
}
