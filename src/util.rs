use crate::table::hex_value;

/// Longest chunk-size accepted: 16 hex digits always fit in a `u64`.
pub(crate) const MAX_HEX_DIGITS: usize = 16;

#[inline(always)]
pub(crate) fn is_ows(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Strips leading and trailing SP / HTAB.
///
/// Returns a subslice of `buf`; an empty or all-whitespace input yields an
/// empty slice.
#[inline]
pub fn trim_whitespace(buf: &[u8]) -> &[u8] {
    let mut start = 0;
    while start < buf.len() && is_ows(buf[start]) {
        start += 1;
    }

    let mut end = buf.len();
    while end > start && is_ows(buf[end - 1]) {
        end -= 1;
    }

    &buf[start..end]
}

/// Index of the first byte at or after `pos` that is not SP / HTAB.
#[inline(always)]
pub(crate) fn skip_ows(buf: &[u8], mut pos: usize) -> usize {
    while pos < buf.len() && is_ows(buf[pos]) {
        pos += 1;
    }
    pos
}

/// Accumulates up to [`MAX_HEX_DIGITS`] hex digits from the head of `buf`.
///
/// Returns the value and the number of digits read, or `None` if `buf`
/// does not start with a hex digit. Accumulation stops at the first
/// non-hex byte or at the digit cap, whichever comes first.
#[inline]
pub(crate) fn parse_hex_u64(buf: &[u8]) -> Option<(u64, usize)> {
    let mut res: u64 = 0;
    let mut digits = 0;

    for &b in buf.iter().take(MAX_HEX_DIGITS) {
        match hex_value(b) {
            Some(v) => {
                res = (res << 4) | u64::from(v);
                digits += 1;
            }
            None => break,
        }
    }

    if digits > 0 { Some((res, digits)) } else { None }
}
