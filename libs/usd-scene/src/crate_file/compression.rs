//! Chunked LZ4 framing and the delta integer codec used by crate files.
//!
//! ## Integer Encoding
//!
//! ```text
//! common: iN | codes: 2 bits per value | values: i8/i16/iN per code
//! ```
//!
//! Each decoded value is a delta from the previous one. Code 0 means the
//! common delta, codes 1 to 3 read a small, medium or full-width delta
//! from the value stream.

use super::reader::ByteReader;
use crate::error::CrateError;
use config::constants::MAX_FILE_SIZE;

/// Most bytes one LZ4 chunk decompresses to.
const LZ4_MAX_INPUT_SIZE: usize = 0x7E00_0000;

/// Width of the integers in an encoded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IntWidth {
    /// 32-bit integers; deltas are i8, i16 or i32.
    Four,
    /// 64-bit integers; deltas are i16, i32 or i64.
    Eight,
}

impl IntWidth {
    pub(crate) const fn bytes(self) -> usize {
        match self {
            Self::Four => 4,
            Self::Eight => 8,
        }
    }

    pub(crate) const fn small(self) -> usize {
        self.bytes() / 4
    }

    pub(crate) const fn medium(self) -> usize {
        self.bytes() / 2
    }

    /// Wrap a running sum the way fixed-width signed arithmetic does.
    pub(crate) const fn wrap(self, value: i64) -> i64 {
        match self {
            Self::Four => value as i32 as i64,
            Self::Eight => value,
        }
    }
}

fn check_output(size: usize, what: &'static str) -> Result<(), CrateError> {
    if size > MAX_FILE_SIZE {
        return Err(CrateError::TooLarge {
            what,
            size: size as u64,
            limit: MAX_FILE_SIZE,
        });
    }
    Ok(())
}

/// Decompress a buffer framed as a chunk count followed by LZ4 blocks.
///
/// A count of zero means the rest of the buffer is a single block.
/// Otherwise every chunk is prefixed with its compressed size as `i32`.
/// At most `output_size` bytes are produced.
pub(crate) fn decompress(input: &[u8], output_size: usize) -> Result<Vec<u8>, CrateError> {
    check_output(output_size, "decompressed buffer")?;
    let mut output = vec![0u8; output_size];

    let Some((&chunks, rest)) = input.split_first() else {
        if output_size == 0 {
            return Ok(output);
        }
        return Err(CrateError::Truncated { offset: 0, needed: 1 });
    };

    let written = if chunks == 0 {
        lz4_flex::block::decompress_into(rest, &mut output)?
    } else {
        let mut reader = ByteReader::new(rest);
        let mut written: usize = 0;
        for _ in 0..chunks {
            let size = reader.i32()?;
            let size = usize::try_from(size)
                .map_err(|_| CrateError::Corrupt(format!("negative chunk size {size}")))?;
            let chunk = reader.take(size)?;
            let end = output.len().min(written.saturating_add(LZ4_MAX_INPUT_SIZE));
            written += lz4_flex::block::decompress_into(chunk, &mut output[written..end])?;
        }
        written
    };

    output.truncate(written);
    Ok(output)
}

/// Bytes needed to hold `count` encoded integers of `width`.
pub(crate) fn encoded_size(count: usize, width: IntWidth) -> usize {
    if count == 0 {
        return 0;
    }
    width
        .bytes()
        .saturating_add(count.saturating_mul(2).saturating_add(7) / 8)
        .saturating_add(count.saturating_mul(width.bytes()))
}

fn read_signed(reader: &mut ByteReader<'_>, bytes: usize) -> Result<i64, CrateError> {
    Ok(match bytes {
        1 => reader.i8()?.into(),
        2 => reader.i16()?.into(),
        4 => reader.i32()?.into(),
        _ => reader.i64()?,
    })
}

/// Decode `count` delta-encoded integers from an uncompressed buffer.
pub(crate) fn decode_integers(
    data: &[u8],
    count: usize,
    width: IntWidth,
) -> Result<Vec<i64>, CrateError> {
    let mut reader = ByteReader::new(data);
    let common = read_signed(&mut reader, width.bytes())?;
    let codes = reader.take(count.saturating_mul(2).saturating_add(7) / 8)?;

    let mut previous = 0i64;
    let mut values = Vec::with_capacity(count);
    for index in 0..count {
        let code = (codes[index / 4] >> (2 * (index % 4))) & 0b11;
        let delta = match code {
            0 => common,
            1 => read_signed(&mut reader, width.small())?,
            2 => read_signed(&mut reader, width.medium())?,
            _ => read_signed(&mut reader, width.bytes())?,
        };
        previous = width.wrap(previous.wrapping_add(delta));
        values.push(previous);
    }

    Ok(values)
}

/// Read a compressed size, the compressed bytes, and decode `count`
/// integers from them.
pub(crate) fn read_compressed_ints(
    reader: &mut ByteReader<'_>,
    count: usize,
    width: IntWidth,
) -> Result<Vec<i64>, CrateError> {
    let compressed_size = reader.u64()?;
    let compressed = reader.take(usize::try_from(compressed_size).unwrap_or(usize::MAX))?;
    if count == 0 {
        return Ok(Vec::new());
    }

    let workspace = decompress(compressed, encoded_size(count, width))?;
    decode_integers(&workspace, count, width)
}

/// [`read_compressed_ints`] for unsigned 32-bit table indices.
pub(crate) fn read_u32s(reader: &mut ByteReader<'_>, count: usize) -> Result<Vec<u32>, CrateError> {
    Ok(read_compressed_ints(reader, count, IntWidth::Four)?
        .into_iter()
        .map(|value| value as u32)
        .collect())
}

/// [`read_compressed_ints`] for signed 32-bit values.
pub(crate) fn read_i32s(reader: &mut ByteReader<'_>, count: usize) -> Result<Vec<i32>, CrateError> {
    Ok(read_compressed_ints(reader, count, IntWidth::Four)?
        .into_iter()
        .map(|value| value as i32)
        .collect())
}
