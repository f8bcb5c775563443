//! Sequential record decoder with location tracking

use byteorder::{LittleEndian, ReadBytesExt};
use glam::{Mat4, Quat, Vec2, Vec3};
use std::io::{self, Read, Seek, SeekFrom};

use crate::error::{JklError, RecordLocation, Result};
use crate::io_ext::ReadExt;

/// Reads fixed-width little-endian fields, attributing failures to the
/// record currently being decoded.
///
/// A premature end of stream becomes a [`JklError::Format`] naming the field,
/// so callers never see a bare `UnexpectedEof`.
pub struct RecordReader<'a, R: Read + Seek> {
    inner: &'a mut R,
    end: u64,
    location: RecordLocation,
}

impl<'a, R: Read + Seek> RecordReader<'a, R> {
    /// Wrap a stream, starting at its current position
    pub fn new(inner: &'a mut R, location: RecordLocation) -> Result<Self> {
        let start = inner.stream_position()?;
        let end = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(start))?;

        Ok(Self {
            inner,
            end,
            location,
        })
    }

    /// Record that subsequent reads belong to
    pub fn location(&self) -> RecordLocation {
        self.location
    }

    /// Switch to a new record
    pub fn at(&mut self, location: RecordLocation) {
        self.location = location;
    }

    /// Bytes left between the current position and the end of the stream
    pub fn remaining(&mut self) -> Result<u64> {
        let position = self.inner.stream_position()?;
        Ok(self.end.saturating_sub(position))
    }

    /// Build a format error for the current record
    pub fn error(&self, reason: impl Into<String>) -> JklError {
        JklError::format(self.location, reason)
    }

    fn field<T>(
        &mut self,
        field: &str,
        read: impl FnOnce(&mut R) -> io::Result<T>,
    ) -> Result<T> {
        read(&mut *self.inner).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                self.error(format!("unexpected end of stream while reading {field}"))
            } else {
                JklError::Io(e)
            }
        })
    }

    pub fn read_u8(&mut self, field: &str) -> Result<u8> {
        self.field(field, |r| r.read_u8())
    }

    pub fn read_i32(&mut self, field: &str) -> Result<i32> {
        self.field(field, |r| r.read_i32::<LittleEndian>())
    }

    pub fn read_u32(&mut self, field: &str) -> Result<u32> {
        self.field(field, |r| r.read_u32::<LittleEndian>())
    }

    pub fn read_f32(&mut self, field: &str) -> Result<f32> {
        self.field(field, |r| r.read_f32::<LittleEndian>())
    }

    pub fn read_vec2(&mut self, field: &str) -> Result<Vec2> {
        self.field(field, |r| r.read_vec2())
    }

    pub fn read_vec3(&mut self, field: &str) -> Result<Vec3> {
        self.field(field, |r| r.read_vec3())
    }

    pub fn read_quat(&mut self, field: &str) -> Result<Quat> {
        self.field(field, |r| r.read_quat())
    }

    pub fn read_mat4(&mut self, field: &str) -> Result<Mat4> {
        self.field(field, |r| r.read_mat4())
    }

    /// Read an `i32` element count and check it against the remaining bytes
    ///
    /// `record_size` is the smallest number of bytes one element can occupy.
    pub fn read_count(&mut self, field: &str, record_size: u64) -> Result<usize> {
        let count = self.read_i32(field)?;
        if count < 0 {
            return Err(self.error(format!("negative {field}: {count}")));
        }

        let needed = count as u64 * record_size;
        let remaining = self.remaining()?;
        if needed > remaining {
            return Err(self.error(format!(
                "{field} {count} inconsistent with remaining bytes ({needed} needed, {remaining} left)"
            )));
        }

        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_truncated_field_is_format_error() {
        let mut cursor = Cursor::new(vec![1u8, 0]);
        let mut reader = RecordReader::new(&mut cursor, RecordLocation::ClipHeader).unwrap();

        let err = reader.read_f32("duration").unwrap_err();
        match err {
            JklError::Format { location, reason } => {
                assert_eq!(location, RecordLocation::ClipHeader);
                assert!(reason.contains("duration"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_count_checks() {
        let mut data = Vec::new();
        data.extend_from_slice(&(-1i32).to_le_bytes());
        data.extend_from_slice(&3i32.to_le_bytes());
        data.extend_from_slice(&[0u8; 8]);
        let mut cursor = Cursor::new(data);
        let mut reader = RecordReader::new(&mut cursor, RecordLocation::MeshTable).unwrap();

        let err = reader.read_count("mesh count", 8).unwrap_err();
        assert!(err.to_string().contains("negative mesh count"));

        // 3 records of 4 bytes do not fit in the 8 bytes left
        let err = reader.read_count("index count", 4).unwrap_err();
        assert!(err.to_string().contains("inconsistent with remaining bytes"));
    }

    #[test]
    fn test_count_fits() {
        let mut data = Vec::new();
        data.extend_from_slice(&2i32.to_le_bytes());
        data.extend_from_slice(&[0u8; 8]);
        let mut cursor = Cursor::new(data);
        let mut reader = RecordReader::new(&mut cursor, RecordLocation::MeshTable).unwrap();

        assert_eq!(reader.read_count("index count", 4).unwrap(), 2);
        assert_eq!(reader.remaining().unwrap(), 8);
    }
}
