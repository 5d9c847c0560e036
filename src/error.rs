//! Error types for reading chunk-size lines from a stream.

/// Errors that can occur while reading a chunk-size line.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    /// I/O error from the underlying reader.
    #[error("I/O error while reading chunk-size line: {0}")]
    Io(#[from] std::io::Error),

    /// The buffered bytes violate the chunk-size line grammar.
    ///
    /// This is terminal for the stream: no amount of further input makes
    /// the line valid.
    #[error("invalid chunk-size line")]
    Invalid,

    /// The line grew past the configured limit without being terminated.
    #[error("chunk-size line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    /// The stream ended in the middle of a chunk-size line.
    #[error("unexpected end of stream inside chunk-size line")]
    UnexpectedEof,
}
