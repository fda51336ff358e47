//! `SeekReader` — a byte cursor over any `Read + Seek` stream.

use std::io::{Read, Seek, SeekFrom};

use crate::SourceError;

/// A byte reader that maintains a cursor position over a seekable stream.
///
/// The reader probes the stream length once at construction; after that,
/// `tell`, `eof` and `peek` are answered from the tracked cursor without
/// touching the stream beyond the bytes actually read. All reads advance the
/// cursor by the number of bytes returned.
///
/// The stream's position at construction time becomes the initial cursor, so
/// a caller that wants to read from the middle of a file just seeks first.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use lazyjson_buffers::SeekReader;
///
/// let mut reader = SeekReader::new(Cursor::new(b"abc".to_vec())).unwrap();
/// assert_eq!(reader.byte().unwrap(), b'a');
/// assert_eq!(reader.peek().unwrap(), Some(b'b'));
/// assert_eq!(reader.tell(), 1);
/// ```
pub struct SeekReader<R> {
    inner: R,
    /// Current cursor position.
    pos: u64,
    /// Total stream length (probed once at construction).
    len: u64,
}

impl<R: Read + Seek> SeekReader<R> {
    /// Wraps a stream, probing its current position and total length.
    ///
    /// Fails if the stream cannot be seeked; an unseekable stream is not a
    /// usable source.
    pub fn new(mut inner: R) -> std::io::Result<Self> {
        let pos = inner.stream_position()?;
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(pos))?;
        Ok(Self { inner, pos, len })
    }

    /// Returns the current cursor position.
    #[inline]
    pub fn tell(&self) -> u64 {
        self.pos
    }

    /// Returns the total stream length in bytes.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` if the stream holds no bytes at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the cursor is at or past the end of the stream.
    #[inline]
    pub fn eof(&self) -> bool {
        self.pos >= self.len
    }

    /// Moves the cursor to an absolute position.
    pub fn seek_to(&mut self, pos: u64) -> Result<(), SourceError> {
        if pos != self.pos {
            self.inner.seek(SeekFrom::Start(pos))?;
            self.pos = pos;
        }
        Ok(())
    }

    /// Moves the cursor by a signed delta.
    pub fn seek_by(&mut self, delta: i64) -> Result<(), SourceError> {
        let pos = self
            .pos
            .checked_add_signed(delta)
            .ok_or_else(|| SourceError::Io(std::io::Error::other("seek before start")))?;
        self.seek_to(pos)
    }

    /// Reads a single byte and advances the cursor.
    pub fn byte(&mut self) -> Result<u8, SourceError> {
        if self.eof() {
            return Err(SourceError::EndOfInput(self.len));
        }
        let mut buf = [0u8; 1];
        self.inner.read_exact(&mut buf)?;
        self.pos += 1;
        Ok(buf[0])
    }

    /// Returns the next byte without advancing the cursor, or `None` at end
    /// of stream.
    pub fn peek(&mut self) -> Result<Option<u8>, SourceError> {
        if self.eof() {
            return Ok(None);
        }
        let b = self.byte()?;
        self.seek_by(-1)?;
        Ok(Some(b))
    }

    /// Reads exactly `n` bytes. Fewer available bytes is an
    /// [`EndOfInput`](SourceError::EndOfInput) error.
    pub fn buf(&mut self, n: usize) -> Result<Vec<u8>, SourceError> {
        if self.pos + n as u64 > self.len {
            return Err(SourceError::EndOfInput(self.len));
        }
        let mut out = vec![0u8; n];
        self.inner.read_exact(&mut out)?;
        self.pos += n as u64;
        Ok(out)
    }

    /// Reads up to `n` bytes, short at end of stream.
    pub fn buf_upto(&mut self, n: usize) -> Result<Vec<u8>, SourceError> {
        let available = (self.len - self.pos.min(self.len)) as usize;
        self.buf(n.min(available))
    }
}
