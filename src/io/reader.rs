use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Read, Seek, SeekFrom};

use crate::error::{Error, Result};

/// Bounded, seekable little-endian reader.
///
/// Every read is checked against the length of the source captured at
/// construction, so running past the end fails with
/// [`Error::UnexpectedEof`] instead of returning short data. Parsers use
/// [`with_saved_position`](Self::with_saved_position) for out-of-band reads
/// (such as a file body far from its descriptor) without losing their place.
pub struct BinaryReader<R> {
    inner: R,
    len: u64,
}

impl<R: Read + Seek> BinaryReader<R> {
    /// Wrap a source, measuring its length and rewinding it to the start.
    pub fn new(mut inner: R) -> Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self { inner, len })
    }

    /// Total length of the source in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current cursor position
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Bytes left between the cursor and the end of the source
    pub fn remaining(&mut self) -> Result<u64> {
        Ok(self.len.saturating_sub(self.position()?))
    }

    /// Move the cursor to an absolute offset.
    ///
    /// Seeking to the end is allowed; seeking beyond it is not.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        if offset > self.len {
            let position = self.position()?;
            return Err(Error::UnexpectedEof {
                offset: position,
                wanted: offset - position,
            });
        }
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Read exactly `n` bytes
    pub fn read(&mut self, n: u64) -> Result<Vec<u8>> {
        self.ensure(n)?;
        let mut buf = vec![0u8; n as usize];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Advance the cursor by `n` bytes without reading them
    pub fn skip(&mut self, n: u64) -> Result<()> {
        self.ensure(n)?;
        self.inner.seek(SeekFrom::Current(n as i64))?;
        Ok(())
    }

    /// Run `op`, then restore the cursor to where it was before, whether or
    /// not `op` succeeded.
    pub fn with_saved_position<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let saved = self.position()?;
        let result = op(self);
        let restored = self.inner.seek(SeekFrom::Start(saved));
        let value = result?;
        restored?;
        Ok(value)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.inner.read_u8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.inner.read_u16::<LittleEndian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.inner.read_u32::<LittleEndian>()?)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.inner.read_i32::<LittleEndian>()?)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.ensure(8)?;
        Ok(self.inner.read_u64::<LittleEndian>()?)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.ensure(4)?;
        Ok(self.inner.read_f32::<LittleEndian>()?)
    }

    /// Fail with `UnexpectedEof` unless `n` more bytes are available
    fn ensure(&mut self, n: u64) -> Result<()> {
        let position = self.position()?;
        match position.checked_add(n) {
            Some(end) if end <= self.len => Ok(()),
            _ => Err(Error::UnexpectedEof {
                offset: position,
                wanted: n,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(data: &[u8]) -> BinaryReader<Cursor<&[u8]>> {
        BinaryReader::new(Cursor::new(data)).unwrap()
    }

    #[test]
    fn test_read_little_endian() {
        let mut r = reader(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x00, 0x00, 0x80, 0x3f]);
        assert_eq!(r.read_u16().unwrap(), 0x0201);
        assert_eq!(r.read_u16().unwrap(), 0x0403);
        assert_eq!(r.read_u8().unwrap(), 0x05);
        assert_eq!(r.read_f32().unwrap(), 1.0);
        assert_eq!(r.remaining().unwrap(), 0);
    }

    #[test]
    fn test_read_past_end_fails() {
        let mut r = reader(&[1, 2, 3]);
        r.skip(1).unwrap();
        match r.read(4) {
            Err(Error::UnexpectedEof { offset, wanted }) => {
                assert_eq!(offset, 1);
                assert_eq!(wanted, 4);
            }
            other => panic!("expected UnexpectedEof, got {other:?}"),
        }
        // A failed read does not move the cursor
        assert_eq!(r.position().unwrap(), 1);
        assert!(r.skip(3).is_err());
        assert!(r.seek(4).is_err());
        r.seek(3).unwrap();
        assert!(r.read_u8().is_err());
    }

    #[test]
    fn test_saved_position_restored_on_success() {
        let mut r = reader(b"abcdefgh");
        r.skip(2).unwrap();
        let tail = r
            .with_saved_position(|r| {
                r.seek(6)?;
                r.read(2)
            })
            .unwrap();
        assert_eq!(tail, b"gh");
        assert_eq!(r.position().unwrap(), 2);
        assert_eq!(r.read(2).unwrap(), b"cd");
    }

    #[test]
    fn test_saved_position_restored_on_failure() {
        let mut r = reader(b"abcdefgh");
        r.skip(3).unwrap();
        let result = r.with_saved_position(|r| {
            r.seek(7)?;
            r.read(5)
        });
        assert!(matches!(result, Err(Error::UnexpectedEof { .. })));
        assert_eq!(r.position().unwrap(), 3);
    }
}
