//! Fixed-layout binary records.
//!
//! A record type declares its exact byte size and decodes its fields from a
//! buffer of that size (all little-endian). Validation is a separate step that
//! reports which field is wrong instead of failing, so callers that only want
//! to *probe* a format (see [`crate::archive::detect`]) can branch on the
//! result without going through an error path.

use std::io::{Read, Seek};

use crate::error::{Error, Result};
use crate::io::BinaryReader;

/// Outcome of checking a decoded record's constant fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Valid,
    /// The named field did not hold its required value
    Mismatch(&'static str),
}

impl Validation {
    pub fn is_valid(self) -> bool {
        self == Validation::Valid
    }

    /// Check one constant field; the first failing check wins
    pub fn check(self, field: &'static str, ok: bool) -> Self {
        match self {
            Validation::Valid if !ok => Validation::Mismatch(field),
            other => other,
        }
    }
}

/// A binary record with a fixed byte layout
pub trait Record: Sized {
    /// Name used in error messages
    const NAME: &'static str;
    /// Encoded size in bytes
    const SIZE: usize;

    /// Decode the fields from exactly [`Self::SIZE`] bytes
    fn decode(buf: &[u8]) -> Result<Self>;

    /// Check magic numbers, versions and other constant fields
    fn validate(&self) -> Validation {
        Validation::Valid
    }
}

/// Decode a record at the cursor without validating it
pub fn read_unchecked<T: Record, R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<T> {
    let buf = reader.read(T::SIZE as u64)?;
    T::decode(&buf)
}

/// Decode and validate a record at the cursor.
///
/// Fails with [`Error::FormatMismatch`] if validation fails.
pub fn read_record<T: Record, R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<T> {
    let record: T = read_unchecked(reader)?;
    ensure_valid(&record)?;
    Ok(record)
}

/// Decode and validate `count` consecutive records.
///
/// All backing bytes are fetched in one read before decoding; records are
/// returned in file order.
pub fn read_records<T: Record, R: Read + Seek>(
    reader: &mut BinaryReader<R>,
    count: usize,
) -> Result<Vec<T>> {
    let total = (count as u64)
        .checked_mul(T::SIZE as u64)
        .ok_or_else(|| Error::UnexpectedEof {
            offset: reader.position().unwrap_or_default(),
            wanted: u64::MAX,
        })?;
    let buf = reader.read(total)?;
    buf.chunks_exact(T::SIZE)
        .map(|chunk| {
            let record = T::decode(chunk)?;
            ensure_valid(&record)?;
            Ok(record)
        })
        .collect()
}

fn ensure_valid<T: Record>(record: &T) -> Result<()> {
    match record.validate() {
        Validation::Valid => Ok(()),
        Validation::Mismatch(field) => Err(Error::format_mismatch(T::NAME, field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{LittleEndian, ReadBytesExt};
    use std::io::Cursor;

    #[derive(Debug, PartialEq)]
    struct Pair {
        tag: [u8; 2],
        value: u16,
    }

    impl Record for Pair {
        const NAME: &'static str = "pair";
        const SIZE: usize = 4;

        fn decode(buf: &[u8]) -> Result<Self> {
            let mut cursor = Cursor::new(buf);
            let mut tag = [0u8; 2];
            cursor.read_exact(&mut tag)?;
            Ok(Self {
                tag,
                value: cursor.read_u16::<LittleEndian>()?,
            })
        }

        fn validate(&self) -> Validation {
            Validation::Valid.check("tag", &self.tag == b"PR")
        }
    }

    fn reader(data: &[u8]) -> BinaryReader<Cursor<&[u8]>> {
        BinaryReader::new(Cursor::new(data)).unwrap()
    }

    #[test]
    fn test_single_record() {
        let mut r = reader(b"PR\x2a\x00");
        let pair: Pair = read_record(&mut r).unwrap();
        assert_eq!(pair.value, 42);
    }

    #[test]
    fn test_validation_failure_is_format_mismatch() {
        let mut r = reader(b"XX\x2a\x00");
        match read_record::<Pair, _>(&mut r) {
            Err(Error::FormatMismatch { record, field }) => {
                assert_eq!(record, "pair");
                assert_eq!(field, "tag");
            }
            other => panic!("expected FormatMismatch, got {other:?}"),
        }

        let mut r = reader(b"XX\x2a\x00");
        let pair: Pair = read_unchecked(&mut r).unwrap();
        assert_eq!(pair.validate(), Validation::Mismatch("tag"));
    }

    #[test]
    fn test_bulk_records_in_file_order() {
        let mut r = reader(b"PR\x01\x00PR\x02\x00PR\x03\x00");
        let pairs: Vec<Pair> = read_records(&mut r, 3).unwrap();
        let values: Vec<u16> = pairs.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_bulk_records_truncated() {
        let mut r = reader(b"PR\x01\x00PR");
        let result = read_records::<Pair, _>(&mut r, 2);
        assert!(matches!(result, Err(Error::UnexpectedEof { .. })));
    }

    #[test]
    fn test_first_failing_check_wins() {
        let v = Validation::Valid
            .check("magic", true)
            .check("version", false)
            .check("method", false);
        assert_eq!(v, Validation::Mismatch("version"));
        assert!(!v.is_valid());
    }
}
