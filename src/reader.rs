use std::io::{self, Read, Seek, SeekFrom};

use crate::error::ExtractError;

/// Positional read capability over a GRIB resource.
///
/// The extractor only performs absolute seeks followed by exact reads; any
/// `Read + Seek` wrapped in [`SeekableJumpReader`] provides this. The seek
/// pointer is per-call state, so a value implementing this trait must not be
/// shared between concurrent extraction calls.
pub trait JumpRead: Read + Seek {
    /// Moves to an absolute byte offset and returns the new position.
    fn seek_to(&mut self, offset: u64) -> Result<u64, ExtractError> {
        let pos = self.seek(SeekFrom::Start(offset))?;
        if pos != offset {
            return Err(ExtractError::ReadError(format!(
                "seek to {offset} landed at {pos}"
            )));
        }
        Ok(pos)
    }

    /// Fills `buf` completely; a short read is an error.
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<(), ExtractError> {
        self.read_exact(buf)?;
        Ok(())
    }

    /// Reads an 8-byte chunk and interprets it as a big-endian 64-bit word.
    fn read_word(&mut self) -> Result<u64, ExtractError> {
        let mut buf = [0; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }
}

pub struct SeekableJumpReader<R> {
    reader: R,
}

impl<R> SeekableJumpReader<R> {
    pub fn new(r: R) -> Self {
        Self { reader: r }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Read for SeekableJumpReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.reader.read_exact(buf)
    }
}

impl<S: Seek> Seek for SeekableJumpReader<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.reader.seek(pos)
    }
}

impl<R: Read + Seek> JumpRead for SeekableJumpReader<R> {}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn word_reads_are_big_endian() -> Result<(), ExtractError> {
        let buf = vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0xff];
        let mut reader = SeekableJumpReader::new(Cursor::new(buf));

        assert_eq!(reader.read_word()?, 0x0102030405060708);
        Ok(())
    }

    #[test]
    fn seek_returns_new_position() -> Result<(), ExtractError> {
        let buf = vec![0u8; 16];
        let mut reader = SeekableJumpReader::new(Cursor::new(buf));

        assert_eq!(reader.seek_to(9)?, 9);
        Ok(())
    }

    #[test]
    fn short_read_is_an_error() {
        let buf = vec![0u8; 4];
        let mut reader = SeekableJumpReader::new(Cursor::new(buf));

        let result = reader.read_word();
        assert!(matches!(result, Err(ExtractError::ReadError(_))));
    }

    #[test]
    fn reader_unwraps_to_its_inner_resource() -> Result<(), ExtractError> {
        let buf = vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let mut reader = SeekableJumpReader::new(Cursor::new(buf));
        assert_eq!(reader.read_word()?, 0x0102030405060708);

        // The inner resource comes back with its seek position intact.
        let cursor = reader.into_inner();
        assert_eq!(cursor.position(), 8);
        assert_eq!(cursor.into_inner().len(), 8);
        Ok(())
    }
}
