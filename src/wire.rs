use bytes::{BufMut, Bytes, BytesMut};

use crate::chunk::{ChunkHeader, Extension, ExtensionValue, OwnedChunkHeader};

/// Serialization to wire format bytes.
pub trait Wire {
    fn to_bytes(&self) -> Bytes;
}

impl Wire for ChunkHeader<'_> {
    fn to_bytes(&self) -> Bytes {
        encode_line(self.size, &self.extensions)
    }
}

impl Wire for OwnedChunkHeader {
    fn to_bytes(&self) -> Bytes {
        encode_line(self.size, &self.extensions)
    }
}

/// Writes `chunk-size [ chunk-ext ] CRLF` with a lower-case hex size.
///
/// Quoted values are written between quotes as-is; they are expected to
/// already be escaped, which is how the scanner hands them out.
pub(crate) fn encode_line<T: AsRef<[u8]>>(size: u64, extensions: &[Extension<T>]) -> Bytes {
    let hex = format!("{size:x}");
    let ext_len: usize = extensions
        .iter()
        .map(|ext| 4 + ext.name().len() + ext.value().map_or(0, <[u8]>::len))
        .sum();

    let mut out = BytesMut::with_capacity(hex.len() + ext_len + 2);
    out.put_slice(hex.as_bytes());

    for ext in extensions {
        out.put_u8(b';');
        out.put_slice(ext.name());
        match &ext.value {
            None => {}
            Some(ExtensionValue::Token(v)) => {
                out.put_u8(b'=');
                out.put_slice(v.as_ref());
            }
            Some(ExtensionValue::Quoted(v)) => {
                out.put_slice(b"=\"");
                out.put_slice(v.as_ref());
                out.put_u8(b'"');
            }
        }
    }

    out.put_slice(b"\r\n");
    out.freeze()
}
