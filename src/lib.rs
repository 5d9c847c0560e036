//! Byte-grammar validators for HTTP/1.1 (RFC 7230) and cookies (RFC 6265),
//! plus an incremental scanner for the chunk-size line of the chunked
//! transfer coding.

pub mod chunk;
pub mod error;
pub mod reader;
pub mod table;
pub mod util;
pub mod validate;
pub mod wire;

pub use chunk::{
    ChunkExtension, ChunkHeader, Extension, ExtensionValue, OwnedChunkExtension,
    OwnedChunkHeader, ScanResult, scan_chunk_header,
};
pub use error::ChunkError;
pub use reader::{ReaderConfig, read_chunk_header};
pub use util::trim_whitespace;
pub use validate::{is_cookie_value, is_token_chars, is_visible_chars};
pub use wire::Wire;
