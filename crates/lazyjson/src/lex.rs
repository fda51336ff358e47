//! Shared lexical helpers: whitespace handling and hex digits.

use std::io::{Read, Seek};

use lazyjson_buffers::{SeekReader, SourceError};

/// The four JSON whitespace bytes.
#[inline]
pub(crate) fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// Consumes any run of JSON whitespace at the cursor.
pub(crate) fn skip_whitespace<R: Read + Seek>(r: &mut SeekReader<R>) -> Result<(), SourceError> {
    while let Some(b) = r.peek()? {
        if !is_whitespace(b) {
            break;
        }
        r.byte()?;
    }
    Ok(())
}

/// Decodes one ASCII hex digit.
#[inline]
pub(crate) fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
