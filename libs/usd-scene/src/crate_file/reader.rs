//! Little-endian cursor over the crate file bytes.

use crate::error::CrateError;

/// Bounds-checked reader over a byte slice.
#[derive(Debug, Clone)]
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// A reader over the same bytes positioned at `offset`.
    pub(crate) fn at(&self, offset: u64) -> Result<Self, CrateError> {
        let pos = usize::try_from(offset)
            .ok()
            .filter(|pos| *pos <= self.bytes.len())
            .ok_or(CrateError::Truncated {
                offset: self.bytes.len(),
                needed: 1,
            })?;
        Ok(Self {
            bytes: self.bytes,
            pos,
        })
    }

    /// Take the next `len` bytes.
    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8], CrateError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(CrateError::Truncated {
                offset: self.pos,
                needed: len,
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], CrateError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, CrateError> {
        Ok(self.array::<1>()?[0])
    }

    pub(crate) fn i8(&mut self) -> Result<i8, CrateError> {
        Ok(i8::from_le_bytes(self.array()?))
    }

    pub(crate) fn i16(&mut self) -> Result<i16, CrateError> {
        Ok(i16::from_le_bytes(self.array()?))
    }

    pub(crate) fn u16(&mut self) -> Result<u16, CrateError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    pub(crate) fn i32(&mut self) -> Result<i32, CrateError> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    pub(crate) fn u32(&mut self) -> Result<u32, CrateError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub(crate) fn i64(&mut self) -> Result<i64, CrateError> {
        Ok(i64::from_le_bytes(self.array()?))
    }

    pub(crate) fn u64(&mut self) -> Result<u64, CrateError> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    pub(crate) fn f32(&mut self) -> Result<f32, CrateError> {
        Ok(f32::from_le_bytes(self.array()?))
    }

    pub(crate) fn f64(&mut self) -> Result<f64, CrateError> {
        Ok(f64::from_le_bytes(self.array()?))
    }

    /// Read a `u64` length and check that `len * element_size` bytes could
    /// still follow.
    pub(crate) fn count(&mut self, element_size: usize) -> Result<usize, CrateError> {
        let count = self.u64()?;
        self.check_count(count, element_size)
    }

    /// Check that `count` elements of `element_size` bytes fit in the input.
    pub(crate) fn check_count(&self, count: u64, element_size: usize) -> Result<usize, CrateError> {
        let size = count.saturating_mul(element_size.max(1) as u64);
        if size > self.bytes.len() as u64 {
            return Err(CrateError::Truncated {
                offset: self.pos,
                needed: usize::try_from(size).unwrap_or(usize::MAX),
            });
        }
        Ok(count as usize)
    }
}
