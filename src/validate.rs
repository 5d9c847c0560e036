//! Whole-value validators for header tokens, field values and cookie values.
//!
//! Each predicate trims SP / HTAB from both ends first. An empty (or
//! all-whitespace) input is accepted.

use crate::table::{is_cookie_octet, is_tchar, is_vchar};
use crate::util::trim_whitespace;

/// Returns `true` if every byte is a `tchar` (RFC 7230 §3.2.6).
///
/// Note that an empty input passes; use `!buf.is_empty()` as well when a
/// full `token` (`1*tchar`) is required.
pub fn is_token_chars(buf: &[u8]) -> bool {
    trim_whitespace(buf).iter().all(|&b| is_tchar(b))
}

/// Returns `true` if every byte is VCHAR, SP or HTAB.
///
/// This is the `field-value` character set of RFC 7230 §3.2 without
/// obs-text and obs-fold.
pub fn is_visible_chars(buf: &[u8]) -> bool {
    trim_whitespace(buf).iter().all(|&b| is_vchar(b))
}

/// Returns `true` if `buf` is an RFC 6265 `cookie-value`.
///
/// ```abnf
/// cookie-value = *cookie-octet / ( DQUOTE *cookie-octet DQUOTE )
/// ```
pub fn is_cookie_value(buf: &[u8]) -> bool {
    let value = match trim_whitespace(buf) {
        [b'"', inner @ .., b'"'] => inner,
        [b'"', ..] => return false,
        value => value,
    };
    value.iter().all(|&b| is_cookie_octet(b))
}
