//! Character-class lookup tables.
//!
//! Each table maps a byte to its canonical member character, or to `0` when
//! the byte is not in the class. `0` is never a member of any class, so a
//! plain truthiness test is enough. [`HEXDIGIT`] stores `value + 1` for the
//! same reason.

const fn class(ranges: &[(u8, u8)]) -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut r = 0;
    while r < ranges.len() {
        let (lo, hi) = ranges[r];
        let mut b = lo as usize;
        while b <= hi as usize {
            table[b] = b as u8;
            b += 1;
        }
        r += 1;
    }
    table
}

/// RFC 7230 §3.2.6 `tchar`.
///
/// ```abnf
/// tchar = "!" / "#" / "$" / "%" / "&" / "'" / "*"
///       / "+" / "-" / "." / "^" / "_" / "`" / "|" / "~"
///       / DIGIT / ALPHA
/// ```
///
/// Letters map to their lower-case form.
pub static TCHAR: [u8; 256] = {
    let mut table = class(&[
        (b'!', b'!'),
        (b'#', b'\''),
        (b'*', b'+'),
        (b'-', b'.'),
        (b'0', b'9'),
        (b'^', b'z'),
        (b'|', b'|'),
        (b'~', b'~'),
    ]);
    let mut b = b'A';
    while b <= b'Z' {
        table[b as usize] = b.to_ascii_lowercase();
        b += 1;
    }
    table
};

/// `field-vchar` plus the whitespace allowed between them: HTAB, SP and
/// VCHAR (`%x21-7E`). Also the set of bytes a quoted-pair may escape.
pub static VCHAR: [u8; 256] = class(&[(b'\t', b'\t'), (b' ', b'~')]);

/// RFC 6265 §4.1.1 `cookie-octet`.
///
/// ```abnf
/// cookie-octet = %x21 / %x23-2B / %x2D-3A / %x3C-5B / %x5D-7E
/// ```
pub static COOKIE_OCTET: [u8; 256] = class(&[
    (0x21, 0x21),
    (0x23, 0x2b),
    (0x2d, 0x3a),
    (0x3c, 0x5b),
    (0x5d, 0x7e),
]);

/// RFC 7230 §3.2.6 `qdtext`, without obs-text.
///
/// ```abnf
/// qdtext = HTAB / SP / %x21 / %x23-5B / %x5D-7E
/// ```
pub static QDTEXT: [u8; 256] = class(&[
    (b'\t', b'\t'),
    (b' ', b'!'),
    (0x23, 0x5b),
    (0x5d, 0x7e),
]);

/// Hex digit value plus one; `0` for anything that is not `HEXDIG`.
pub static HEXDIGIT: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut b = 0usize;
    while b < 256 {
        table[b] = match b as u8 {
            d @ b'0'..=b'9' => d - b'0' + 1,
            d @ b'a'..=b'f' => d - b'a' + 11,
            d @ b'A'..=b'F' => d - b'A' + 11,
            _ => 0,
        };
        b += 1;
    }
    table
};

#[inline(always)]
pub(crate) fn is_tchar(b: u8) -> bool {
    TCHAR[b as usize] != 0
}

#[inline(always)]
pub(crate) fn is_vchar(b: u8) -> bool {
    VCHAR[b as usize] != 0
}

#[inline(always)]
pub(crate) fn is_cookie_octet(b: u8) -> bool {
    COOKIE_OCTET[b as usize] != 0
}

#[inline(always)]
pub(crate) fn is_qdtext(b: u8) -> bool {
    QDTEXT[b as usize] != 0
}

/// Value of a hex digit, if `b` is one.
#[inline(always)]
pub(crate) fn hex_value(b: u8) -> Option<u8> {
    match HEXDIGIT[b as usize] {
        0 => None,
        v => Some(v - 1),
    }
}
