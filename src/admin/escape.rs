//! Strict query unescaping for registered targets.
//!
//! Targets are stored as `String`, so a value whose escapes decode to bytes
//! that are not UTF-8 (for example `%FF`) is rejected with
//! [`UnescapeError::InvalidUtf8`] instead of being stored as raw bytes.

use percent_encoding::percent_decode;
use thiserror::Error;

/// Error unescaping a query value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnescapeError {
    #[error("invalid escape sequence at byte {0}")]
    InvalidEscape(usize),

    #[error("unescaped value is not valid UTF-8")]
    InvalidUtf8,
}

/// Unescape a query-encoded value: `+` becomes a space and `%XX` a byte.
///
/// Unlike lenient form decoding, a `%` not followed by two hex digits is an
/// error rather than being passed through.
pub fn query_unescape(value: &str) -> Result<String, UnescapeError> {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(UnescapeError::InvalidEscape(i));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let plus_decoded = value.replace('+', " ");
    percent_decode(plus_decoded.as_bytes())
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| UnescapeError::InvalidUtf8)
}
