//! Error types for lazy JSON reading.

use lazyjson_buffers::SourceError;
use thiserror::Error;

/// Errors produced while navigating or decoding a JSON document.
///
/// Positions are absolute byte offsets into the source.
#[derive(Debug, Error)]
pub enum JsonError {
    /// The source is not readable, or holds no bytes at all.
    #[error("invalid source")]
    InvalidSource,
    /// Input ended where a value byte was required.
    #[error("unexpected end of input at position {0}")]
    UnexpectedEnd(u64),
    /// A byte appeared that no grammar rule at the current state admits.
    #[error("unexpected byte 0x{1:02x} at position {0}")]
    UnexpectedByte(u64, u8),
    /// A `null`/`true`/`false` literal was partially matched then diverged.
    #[error("invalid literal at position {0}")]
    InvalidLiteral(u64),
    /// An unescaped control byte (0x00–0x1F) inside a string.
    #[error("control byte in string at position {0}")]
    ControlByte(u64),
    /// A backslash followed by a byte that is not a recognised escape.
    #[error("invalid escape at position {0}")]
    InvalidEscape(u64),
    /// A `\uXXXX` escape with a non-hex digit.
    #[error("invalid unicode escape at position {0}")]
    InvalidUnicodeEscape(u64),
    /// An orphan or mispaired UTF-16 surrogate escape.
    #[error("invalid surrogate pair at position {0}")]
    InvalidSurrogate(u64),
    /// A raw byte sequence inside a string that is not valid UTF-8.
    #[error("invalid utf-8 in string at position {0}")]
    InvalidUtf8(u64),
    /// A `,` immediately followed by the container terminator.
    #[error("trailing comma at position {0}")]
    TrailingComma(u64),
    /// A container child was not followed by `,` or the terminator.
    #[error("expected ',' or '{1}' at position {0}")]
    ExpectedSeparator(u64, char),
    /// An object key was not followed by `:`.
    #[error("expected ':' at position {0}")]
    ExpectedColon(u64),
    /// An object key that is not a JSON string.
    #[error("non-string key at position {0}")]
    NonStringKey(u64),
    /// Attempt to mutate a container.
    #[error("containers are read-only")]
    ReadOnly,
    /// The byte source failed a read or seek.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    /// An internal invariant was violated; raised only on bugs or misuse of
    /// a handle outside its variant's operations.
    #[error("internal invariant violated: {0}")]
    Logic(&'static str),
}

impl From<SourceError> for JsonError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::EndOfInput(pos) => JsonError::UnexpectedEnd(pos),
            SourceError::Io(e) => JsonError::Io(e),
        }
    }
}
