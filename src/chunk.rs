//! Incremental scanner for the chunk-size line of the chunked transfer coding.
//!
//! RFC 7230 §4.1:
//!
//! ```abnf
//! chunk          = chunk-size [ chunk-ext ] CRLF
//!                  chunk-data CRLF
//! chunk-size     = 1*HEXDIG
//! last-chunk     = 1*("0") [ chunk-ext ] CRLF
//!
//! chunk-ext      = *( BWS ";" BWS chunk-ext-name [ BWS "=" BWS chunk-ext-val ] )
//! chunk-ext-name = token
//! chunk-ext-val  = token / quoted-string
//!
//! quoted-string  = DQUOTE *( qdtext / quoted-pair ) DQUOTE
//! quoted-pair    = "\" ( HTAB / SP / VCHAR / obs-text )
//! ```
//!
//! The scanner only handles the line itself. It holds no state between
//! calls: when it answers [`ScanResult::NeedMoreInput`] the caller appends
//! more bytes and scans the whole buffer again from the start.

use std::ops::Range;

use bytes::Bytes;

use crate::table::{is_qdtext, is_tchar, is_vchar};
use crate::util::{parse_hex_u64, skip_ows};

/// Outcome of [`scan_chunk_header`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanResult<'a> {
    /// The buffer ends before the line does. Nothing was consumed.
    NeedMoreInput,
    /// The buffer can never start a valid chunk-size line.
    Invalid,
    /// A complete line was parsed.
    Parsed(ChunkHeader<'a>),
}

impl<'a> ScanResult<'a> {
    #[inline]
    pub fn is_partial(&self) -> bool {
        matches!(self, ScanResult::NeedMoreInput)
    }

    #[inline]
    pub fn is_invalid(&self) -> bool {
        matches!(self, ScanResult::Invalid)
    }

    /// The parsed header, if the line was complete and valid.
    #[inline]
    pub fn parsed(self) -> Option<ChunkHeader<'a>> {
        match self {
            ScanResult::Parsed(header) => Some(header),
            _ => None,
        }
    }
}

/// Value of a chunk extension.
///
/// A quoted value holds the bytes between the quotes. Quoted-pairs are kept
/// as they appear on the wire, backslash included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionValue<T> {
    Token(T),
    Quoted(T),
}

impl<T: AsRef<[u8]>> ExtensionValue<T> {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ExtensionValue::Token(v) | ExtensionValue::Quoted(v) => v.as_ref(),
        }
    }

    #[inline]
    pub fn is_quoted(&self) -> bool {
        matches!(self, ExtensionValue::Quoted(_))
    }
}

/// One `;name[=value]` entry of a chunk-size line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extension<T> {
    pub name: T,
    pub value: Option<ExtensionValue<T>>,
}

impl<T: AsRef<[u8]>> Extension<T> {
    #[inline]
    pub fn name(&self) -> &[u8] {
        self.name.as_ref()
    }

    #[inline]
    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_ref().map(ExtensionValue::as_bytes)
    }
}

/// Extension borrowing from the scanned buffer.
pub type ChunkExtension<'a> = Extension<&'a [u8]>;

/// Extension backed by the reference-counted line it was read from.
pub type OwnedChunkExtension = Extension<Bytes>;

/// A parsed chunk-size line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHeader<'a> {
    /// Length of the chunk-data that follows.
    pub size: u64,
    /// Length of the line, terminating CRLF included.
    pub consumed: usize,
    /// Extensions in the order they appear. Names may repeat.
    pub extensions: Vec<ChunkExtension<'a>>,
}

impl<'a> ChunkHeader<'a> {
    /// `true` for the `last-chunk` line, which has a size of zero.
    #[inline]
    pub fn is_last(&self) -> bool {
        self.size == 0
    }

    /// First extension whose name matches `name`, ignoring ASCII case.
    pub fn extension(&self, name: &[u8]) -> Option<&ChunkExtension<'a>> {
        self.extensions
            .iter()
            .find(|ext| ext.name.eq_ignore_ascii_case(name))
    }
}

/// A chunk-size line detached from the read buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedChunkHeader {
    pub size: u64,
    /// The raw line, terminating CRLF included.
    pub line: Bytes,
    pub extensions: Vec<OwnedChunkExtension>,
}

impl OwnedChunkHeader {
    /// Scans `line`, which must begin with a complete chunk-size line.
    ///
    /// Bytes after the line are dropped from the returned header.
    pub fn from_line(line: Bytes) -> Option<Self> {
        let spans = scan_spans(&line).ok()?;
        Some(spans.into_owned(&line))
    }

    #[inline]
    pub fn is_last(&self) -> bool {
        self.size == 0
    }

    #[inline]
    pub fn consumed(&self) -> usize {
        self.line.len()
    }

    /// First extension whose name matches `name`, ignoring ASCII case.
    pub fn extension(&self, name: &[u8]) -> Option<&OwnedChunkExtension> {
        self.extensions
            .iter()
            .find(|ext| ext.name.eq_ignore_ascii_case(name))
    }
}

/// Scans a chunk-size line at the head of `buf`.
///
/// ```
/// use rfcvalid::{scan_chunk_header, ScanResult};
///
/// let header = scan_chunk_header(b"1a;name=value\r\ndata").parsed().unwrap();
/// assert_eq!(header.size, 26);
/// assert_eq!(header.consumed, 15);
/// assert_eq!(header.extensions[0].value(), Some(&b"value"[..]));
///
/// assert_eq!(scan_chunk_header(b"1a;name"), ScanResult::NeedMoreInput);
/// assert_eq!(scan_chunk_header(b"1a;=value\r\n"), ScanResult::Invalid);
/// ```
pub fn scan_chunk_header(buf: &[u8]) -> ScanResult<'_> {
    match scan_spans(buf) {
        Ok(spans) => ScanResult::Parsed(spans.borrow(buf)),
        Err(Halt::Partial) => ScanResult::NeedMoreInput,
        Err(Halt::Invalid) => ScanResult::Invalid,
    }
}

pub(crate) enum Halt {
    Partial,
    Invalid,
}

/// A parsed line whose extensions are byte ranges into the scanned buffer.
pub(crate) struct LineSpans {
    pub(crate) size: u64,
    pub(crate) consumed: usize,
    extensions: Vec<Extension<Range<usize>>>,
}

impl LineSpans {
    fn borrow(self, buf: &[u8]) -> ChunkHeader<'_> {
        ChunkHeader {
            size: self.size,
            consumed: self.consumed,
            extensions: self
                .extensions
                .into_iter()
                .map(|ext| ext.map(move |range| &buf[range]))
                .collect(),
        }
    }

    /// Resolves the ranges against `buf`, the buffer that was scanned.
    pub(crate) fn into_owned(self, buf: &Bytes) -> OwnedChunkHeader {
        OwnedChunkHeader {
            size: self.size,
            line: buf.slice(..self.consumed),
            extensions: self
                .extensions
                .into_iter()
                .map(|ext| ext.map(|range| buf.slice(range)))
                .collect(),
        }
    }
}

impl<T> Extension<T> {
    fn map<U>(self, mut f: impl FnMut(T) -> U) -> Extension<U> {
        Extension {
            name: f(self.name),
            value: self.value.map(|value| match value {
                ExtensionValue::Token(v) => ExtensionValue::Token(f(v)),
                ExtensionValue::Quoted(v) => ExtensionValue::Quoted(f(v)),
            }),
        }
    }
}

/// Runs the scanner, logging where and why a line was rejected.
pub(crate) fn scan_spans(buf: &[u8]) -> Result<LineSpans, Halt> {
    let scanner = Scanner { buf, pos: 0 };
    scanner.run().map_err(|stop| match stop {
        Stop::Partial => Halt::Partial,
        Stop::Invalid { at, reason } => {
            tracing::trace!(offset = at, reason, "invalid chunk-size line");
            Halt::Invalid
        }
    })
}

enum Stop {
    Partial,
    Invalid { at: usize, reason: &'static str },
}

enum State {
    Size,
    ExtStart,
    ExtName,
    AfterName(Range<usize>),
    ExtValue(Range<usize>),
    Quoted { name: Range<usize>, start: usize },
    AfterValue,
    Eol,
}

struct Scanner<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl Scanner<'_> {
    #[inline]
    fn peek(&self) -> Result<u8, Stop> {
        self.buf.get(self.pos).copied().ok_or(Stop::Partial)
    }

    #[inline]
    fn skip_ows(&mut self) -> Result<u8, Stop> {
        self.pos = skip_ows(self.buf, self.pos);
        self.peek()
    }

    #[inline]
    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> Range<usize> {
        let start = self.pos;
        while self.pos < self.buf.len() && pred(self.buf[self.pos]) {
            self.pos += 1;
        }
        start..self.pos
    }

    #[inline]
    fn invalid<T>(&self, reason: &'static str) -> Result<T, Stop> {
        Err(Stop::Invalid {
            at: self.pos,
            reason,
        })
    }

    fn run(mut self) -> Result<LineSpans, Stop> {
        let mut size = 0;
        let mut extensions = Vec::new();
        let mut state = State::Size;

        loop {
            state = match state {
                State::Size => {
                    let Some((value, digits)) = parse_hex_u64(self.buf) else {
                        self.peek()?;
                        return self.invalid("chunk-size must start with a hex digit");
                    };
                    size = value;
                    self.pos = digits;
                    match self.peek()? {
                        b'\r' => State::Eol,
                        _ => State::ExtStart,
                    }
                }

                State::ExtStart => {
                    if self.skip_ows()? != b';' {
                        return self.invalid("expected `;` or CRLF after chunk-size");
                    }
                    self.pos += 1;
                    State::ExtName
                }

                State::ExtName => {
                    self.skip_ows()?;
                    let name = self.take_while(is_tchar);
                    if name.is_empty() {
                        return self.invalid("empty chunk-ext name");
                    }
                    State::AfterName(name)
                }

                State::AfterName(name) => match self.skip_ows()? {
                    b'=' => {
                        self.pos += 1;
                        State::ExtValue(name)
                    }
                    b';' => {
                        extensions.push(Extension { name, value: None });
                        self.pos += 1;
                        State::ExtName
                    }
                    b'\r' => {
                        extensions.push(Extension { name, value: None });
                        State::Eol
                    }
                    _ => return self.invalid("unexpected byte after chunk-ext name"),
                },

                State::ExtValue(name) => {
                    if self.skip_ows()? == b'"' {
                        self.pos += 1;
                        State::Quoted {
                            name,
                            start: self.pos,
                        }
                    } else {
                        let value = self.take_while(is_tchar);
                        extensions.push(Extension {
                            name,
                            value: Some(ExtensionValue::Token(value)),
                        });
                        State::AfterValue
                    }
                }

                State::Quoted { name, start } => {
                    self.take_while(is_qdtext);
                    match self.peek()? {
                        b'"' => {
                            extensions.push(Extension {
                                name,
                                value: Some(ExtensionValue::Quoted(start..self.pos)),
                            });
                            self.pos += 1;
                            State::AfterValue
                        }
                        b'\\' => {
                            let escaped = self.buf.get(self.pos + 1).copied().ok_or(Stop::Partial)?;
                            if !is_vchar(escaped) {
                                return self.invalid("invalid quoted-pair");
                            }
                            self.pos += 2;
                            State::Quoted { name, start }
                        }
                        _ => return self.invalid("invalid byte in quoted-string"),
                    }
                }

                State::AfterValue => match self.skip_ows()? {
                    b';' => {
                        self.pos += 1;
                        State::ExtName
                    }
                    b'\r' => State::Eol,
                    _ => return self.invalid("unexpected byte after chunk-ext value"),
                },

                State::Eol => {
                    return match self.buf.get(self.pos + 1) {
                        None => Err(Stop::Partial),
                        Some(b'\n') => Ok(LineSpans {
                            size,
                            consumed: self.pos + 2,
                            extensions,
                        }),
                        Some(_) => self.invalid("CR not followed by LF"),
                    };
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(buf: &[u8]) -> ChunkHeader<'_> {
        match scan_chunk_header(buf) {
            ScanResult::Parsed(header) => header,
            other => panic!("expected Parsed for {:?}, got {:?}", String::from_utf8_lossy(buf), other),
        }
    }

    fn ext<'a>(name: &'a str, value: Option<ExtensionValue<&'a str>>) -> ChunkExtension<'a> {
        Extension {
            name: name.as_bytes(),
            value: value.map(|v| match v {
                ExtensionValue::Token(v) => ExtensionValue::Token(v.as_bytes()),
                ExtensionValue::Quoted(v) => ExtensionValue::Quoted(v.as_bytes()),
            }),
        }
    }

    #[test]
    fn size_only() {
        let header = parsed(b"1a\r\n");
        assert_eq!(header.size, 26);
        assert_eq!(header.consumed, 4);
        assert!(header.extensions.is_empty());

        let header = parsed(b"0\r\n");
        assert_eq!(header.size, 0);
        assert_eq!(header.consumed, 3);
        assert!(header.is_last());
    }

    #[test]
    fn trailing_bytes_are_not_consumed() {
        let header = parsed(b"5\r\nhello\r\n0\r\n\r\n");
        assert_eq!(header.size, 5);
        assert_eq!(header.consumed, 3);
    }

    #[test]
    fn mixed_case_hex() {
        assert_eq!(parsed(b"aBcD\r\n").size, 0xabcd);
        assert_eq!(parsed(b"000F\r\n").size, 15);
    }

    #[test]
    fn token_extension() {
        let header = parsed(b"4;foo=bar\r\n");
        assert_eq!(header.size, 4);
        assert_eq!(header.consumed, 11);
        assert_eq!(
            header.extensions,
            vec![ext("foo", Some(ExtensionValue::Token("bar")))]
        );
    }

    #[test]
    fn quoted_extension() {
        let input = b"4;foo=\"ba r\"\r\n";
        let header = parsed(input);
        assert_eq!(header.size, 4);
        assert_eq!(header.consumed, input.len());
        assert_eq!(
            header.extensions,
            vec![ext("foo", Some(ExtensionValue::Quoted("ba r")))]
        );
    }

    #[test]
    fn quoted_pair_is_kept_verbatim() {
        let header = parsed(b"4;q=\"a\\\"b\\\\c\"\r\n");
        assert_eq!(header.extensions[0].value(), Some(&b"a\\\"b\\\\c"[..]));
        assert!(header.extensions[0].value.is_some_and(|v| v.is_quoted()));
    }

    #[test]
    fn quoted_value_may_hold_delimiters() {
        let header = parsed(b"4;q=\"a;b=c, d\"\r\n");
        assert_eq!(header.extensions.len(), 1);
        assert_eq!(header.extensions[0].value(), Some(&b"a;b=c, d"[..]));
    }

    #[test]
    fn empty_quoted_value() {
        let header = parsed(b"4;q=\"\"\r\n");
        assert_eq!(header.extensions[0].value(), Some(&b""[..]));
    }

    #[test]
    fn bare_names_and_duplicates() {
        let header = parsed(b"10;a;b=1;a;c=\"x\"\r\n");
        assert_eq!(header.size, 16);
        assert_eq!(
            header.extensions,
            vec![
                ext("a", None),
                ext("b", Some(ExtensionValue::Token("1"))),
                ext("a", None),
                ext("c", Some(ExtensionValue::Quoted("x"))),
            ]
        );
        assert_eq!(header.extension(b"B").and_then(|e| e.value()), Some(&b"1"[..]));
        assert!(header.extension(b"d").is_none());
    }

    #[test]
    fn whitespace_around_delimiters() {
        let header = parsed(b"4 \t; a \t= \"v\" ; b = w \r\n");
        assert_eq!(
            header.extensions,
            vec![
                ext("a", Some(ExtensionValue::Quoted("v"))),
                ext("b", Some(ExtensionValue::Token("w"))),
            ]
        );
    }

    #[test]
    fn trailing_whitespace_after_name() {
        let header = parsed(b"4;name \r\n");
        assert_eq!(header.extensions, vec![ext("name", None)]);
    }

    #[test]
    fn empty_token_value() {
        let header = parsed(b"4;a=;b\r\n");
        assert_eq!(
            header.extensions,
            vec![ext("a", Some(ExtensionValue::Token(""))), ext("b", None)]
        );
    }

    #[test]
    fn need_more_input() {
        for input in [
            &b""[..],
            b"a",
            b"1a",
            b"1a\r",
            b"1a ",
            b"1a;",
            b"1a; ",
            b"1a;foo",
            b"1a;foo ",
            b"1a;foo=",
            b"1a;foo=bar",
            b"1a;foo=\"ba",
            b"1a;foo=\"ba\\",
            b"1a;foo=\"bar\"",
            b"1a;foo=\"bar\" ",
            b"1a;foo=bar\r",
        ] {
            assert_eq!(
                scan_chunk_header(input),
                ScanResult::NeedMoreInput,
                "{:?}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn invalid_lines() {
        for input in [
            &b"g\r\n"[..],
            b"\r\n",
            b";a\r\n",
            b" 1\r\n",
            b"4;\r\n",
            b"4; ;a\r\n",
            b"4;=v\r\n",
            b"4 \r\n",
            b"4\n",
            b"4\rx",
            b"4x\r\n",
            b"4;a b\r\n",
            b"4;a=b c\r\n",
            b"4;a=\"b\"c\r\n",
            b"4;a=\"b\x01\"\r\n",
            b"4;a=\"b\\\x01\"\r\n",
            b"4;a=(b)\r\n",
            b"4;a=b\r\r\n",
            b"4;a\x00\r\n",
        ] {
            assert_eq!(
                scan_chunk_header(input),
                ScanResult::Invalid,
                "{:?}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn sixteen_digit_cap() {
        let header = parsed(b"ffffffffffffffff\r\n");
        assert_eq!(header.size, u64::MAX);
        assert_eq!(header.consumed, 18);

        assert!(scan_chunk_header(b"10000000000000000\r\n").is_invalid());
        assert!(scan_chunk_header(b"0000000000000000").is_partial());
    }

    #[test]
    fn every_prefix_is_partial() {
        let input = b"1f4 ; name=\"v\\\"al\" ;flag\r\n";
        let header = parsed(input);
        assert_eq!(header.consumed, input.len());
        for end in 0..input.len() {
            assert!(
                scan_chunk_header(&input[..end]).is_partial(),
                "prefix of length {end}"
            );
        }
    }

    #[test]
    fn owned_header_shares_line() {
        let line = Bytes::from_static(b"8;a=b;c=\"d e\"\r\nrest");
        let header = OwnedChunkHeader::from_line(line.clone()).unwrap();
        assert_eq!(header.size, 8);
        assert_eq!(header.line, Bytes::from_static(b"8;a=b;c=\"d e\"\r\n"));
        assert_eq!(header.consumed(), 15);
        assert_eq!(header.extension(b"a").and_then(|e| e.value()), Some(&b"b"[..]));
        assert_eq!(header.extensions[1].value, Some(ExtensionValue::Quoted(Bytes::from_static(b"d e"))));

        let borrowed = scan_chunk_header(&line).parsed().unwrap();
        assert_eq!(borrowed.consumed, header.consumed());
        for (b, o) in borrowed.extensions.iter().zip(&header.extensions) {
            assert_eq!(b.name(), o.name());
            assert_eq!(b.value(), o.value());
        }

        assert_eq!(OwnedChunkHeader::from_line(Bytes::from_static(b"8;")), None);
        assert_eq!(OwnedChunkHeader::from_line(Bytes::from_static(b"8;=x\r\n")), None);
    }

    #[test]
    fn quoted_pair_escapes_whitespace() {
        let header = parsed(b"4;q=\"a\\ b\\\tc\"\r\n");
        assert_eq!(header.extensions[0].value(), Some(&b"a\\ b\\\tc"[..]));
        assert!(header.extensions[0].value.is_some_and(|v| v.is_quoted()));
    }

    #[test]
    fn quoted_pair_rejects_obs_text_and_controls() {
        assert!(scan_chunk_header(b"4;q=\"a\\\x80\"\r\n").is_invalid());
        assert!(scan_chunk_header(b"4;q=\"a\\\r\"\r\n").is_invalid());
    }
}
