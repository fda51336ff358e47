//! Random-access byte reading primitives for lazyjson.
//!
//! The only type of interest is [`SeekReader`], a cursor over any
//! `Read + Seek` stream. It is deliberately dumb: it moves the cursor, reads
//! bytes, and reports positions. Everything that knows about JSON lives one
//! crate up.

mod reader;

pub use reader::SeekReader;

use thiserror::Error;

/// Errors produced by [`SeekReader`] operations.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A read needed more bytes than the stream has left. Carries the
    /// position of the first missing byte.
    #[error("unexpected end of input at position {0}")]
    EndOfInput(u64),
    /// The underlying stream failed a read or seek.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}
