//! Bounds-checked little-endian reads over byte slices
//!
//! Every decoder goes through these helpers so that offsets taken from a
//! buffer are validated against that buffer before anything is read.

use byteorder::{ByteOrder, LE};

use crate::{Error, Result};

/// Borrow `len` bytes at `offset`, failing instead of reading out of bounds
pub fn slice_at<'a>(
    data: &'a [u8],
    offset: usize,
    len: usize,
    context: &'static str,
) -> Result<&'a [u8]> {
    let end = offset.checked_add(len).ok_or_else(|| Error::Malformed {
        context,
        reason: format!("offset {:#x} + length {} overflows", offset, len),
    })?;

    if end > data.len() {
        return Err(Error::DataTooShort {
            context,
            offset,
            needed: len,
            actual: data.len(),
        });
    }

    Ok(&data[offset..end])
}

/// Convert a stored offset into a buffer index
pub fn to_offset<T>(value: T, context: &'static str) -> Result<usize>
where
    T: TryInto<usize> + Copy + std::fmt::Display,
{
    value.try_into().map_err(|_| Error::Malformed {
        context,
        reason: format!("offset {} is not addressable", value),
    })
}

/// Sequential reader over a fixed-size record
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    context: &'static str,
}

impl<'a> Reader<'a> {
    /// Start reading `len` bytes at `offset`; the whole window is checked up front
    pub fn at(data: &'a [u8], offset: usize, len: usize, context: &'static str) -> Result<Self> {
        Ok(Self {
            data: slice_at(data, offset, len, context)?,
            pos: 0,
            context,
        })
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let bytes = slice_at(self.data, self.pos, n, self.context)?;
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LE::read_u16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LE::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LE::read_i32(self.take(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(LE::read_u64(self.take(8)?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(LE::read_f32(self.take(4)?))
    }

    pub fn read_tag(&mut self) -> Result<[u8; 4]> {
        let mut tag = [0u8; 4];
        tag.copy_from_slice(self.take(4)?);
        Ok(tag)
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_at_in_bounds() {
        let data = [1u8, 2, 3, 4, 5];
        assert_eq!(slice_at(&data, 1, 3, "test").unwrap(), &[2, 3, 4]);
        assert_eq!(slice_at(&data, 5, 0, "test").unwrap(), &[] as &[u8]);
    }

    #[test]
    fn test_slice_at_out_of_bounds() {
        let data = [0u8; 4];
        let err = slice_at(&data, 2, 4, "test").unwrap_err();
        assert!(matches!(
            err,
            Error::DataTooShort {
                offset: 2,
                needed: 4,
                actual: 4,
                ..
            }
        ));

        let err = slice_at(&data, usize::MAX, 2, "test").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_to_offset_rejects_negative() {
        assert_eq!(to_offset(16i32, "test").unwrap(), 16);
        assert!(to_offset(-1i32, "test").is_err());
        assert_eq!(to_offset(0x40u64, "test").unwrap(), 0x40);
    }

    #[test]
    fn test_reader_little_endian() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x0201u16.to_le_bytes());
        data.extend_from_slice(&0x0605_0403u32.to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.extend_from_slice(&(-7i32).to_le_bytes());
        data.extend_from_slice(&0x0807_0605_0403_0201u64.to_le_bytes());

        let mut reader = Reader::at(&data, 0, data.len(), "test").unwrap();
        assert_eq!(reader.read_u16().unwrap(), 0x0201);
        assert_eq!(reader.read_u32().unwrap(), 0x0605_0403);
        assert_eq!(reader.read_f32().unwrap(), 1.5);
        assert_eq!(reader.read_i32().unwrap(), -7);
        assert_eq!(reader.read_u64().unwrap(), 0x0807_0605_0403_0201);
        assert_eq!(reader.position(), data.len());
        assert!(reader.read_u16().is_err());
    }

    #[test]
    fn test_reader_window_checked_up_front() {
        let data = [0u8; 8];
        assert!(Reader::at(&data, 4, 8, "test").is_err());
    }
}
