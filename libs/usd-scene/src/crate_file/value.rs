//! Value reps and their decoding into layer values.
//!
//! A value rep is a `u64`:
//!
//! ```text
//! bit 63: array | bit 62: inlined | bit 61: compressed | bits 48..56: type | bits 0..48: payload
//! ```
//!
//! Inlined values keep their data in the low 32 payload bits; everything
//! else stores a file offset there.

use super::compression::{read_compressed_ints, read_u32s, IntWidth};
use super::reader::ByteReader;
use super::CrateFile;
use crate::error::CrateError;
use config::constants::MAX_FILE_SIZE;
use usda_parser::Value;

/// A packed value representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ValueRep(pub(crate) u64);

impl ValueRep {
    pub(crate) const ARRAY_BIT: u64 = 1 << 63;
    pub(crate) const INLINED_BIT: u64 = 1 << 62;
    pub(crate) const COMPRESSED_BIT: u64 = 1 << 61;
    const PAYLOAD_MASK: u64 = (1 << 48) - 1;

    pub(crate) fn type_id(self) -> u8 {
        ((self.0 >> 48) & 0xff) as u8
    }

    pub(crate) fn is_array(self) -> bool {
        self.0 & Self::ARRAY_BIT != 0
    }

    pub(crate) fn is_inlined(self) -> bool {
        self.0 & Self::INLINED_BIT != 0
    }

    pub(crate) fn is_compressed(self) -> bool {
        self.0 & Self::COMPRESSED_BIT != 0
    }

    pub(crate) fn payload(self) -> u64 {
        self.0 & Self::PAYLOAD_MASK
    }
}

/// Component type of vectors, quaternions and scalar arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scalar {
    Double,
    Float,
    Half,
    Int,
}

impl Scalar {
    const fn size(self) -> usize {
        match self {
            Self::Double => 8,
            Self::Float | Self::Int => 4,
            Self::Half => 2,
        }
    }

    fn read(self, reader: &mut ByteReader<'_>) -> Result<f64, CrateError> {
        Ok(match self {
            Self::Double => reader.f64()?,
            Self::Float => reader.f32()?.into(),
            Self::Half => half_to_f64(reader.u16()?),
            Self::Int => reader.i32()?.into(),
        })
    }
}

/// Type tags this reader decodes. Everything else is [`CrateType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CrateType {
    Bool,
    UChar,
    Int,
    UInt,
    Int64,
    UInt64,
    Half,
    Float,
    Double,
    TimeCode,
    String,
    Token,
    AssetPath,
    /// Square matrix of doubles with this many rows.
    Matrix(usize),
    Quat(Scalar),
    /// Vector with this many components.
    Vec(usize, Scalar),
    Dictionary,
    PathVector,
    TokenVector,
    StringVector,
    DoubleVector,
    Specifier,
    Permission,
    Variability,
    TimeSamples,
    ValueBlock,
    Other(u8),
}

impl CrateType {
    pub(crate) fn from_id(id: u8) -> Self {
        use Scalar::{Double, Float, Half, Int};
        match id {
            1 => Self::Bool,
            2 => Self::UChar,
            3 => Self::Int,
            4 => Self::UInt,
            5 => Self::Int64,
            6 => Self::UInt64,
            7 => Self::Half,
            8 => Self::Float,
            9 => Self::Double,
            10 => Self::String,
            11 => Self::Token,
            12 => Self::AssetPath,
            13 => Self::Matrix(2),
            14 => Self::Matrix(3),
            15 => Self::Matrix(4),
            16 => Self::Quat(Double),
            17 => Self::Quat(Float),
            18 => Self::Quat(Half),
            19 => Self::Vec(2, Double),
            20 => Self::Vec(2, Float),
            21 => Self::Vec(2, Half),
            22 => Self::Vec(2, Int),
            23 => Self::Vec(3, Double),
            24 => Self::Vec(3, Float),
            25 => Self::Vec(3, Half),
            26 => Self::Vec(3, Int),
            27 => Self::Vec(4, Double),
            28 => Self::Vec(4, Float),
            29 => Self::Vec(4, Half),
            30 => Self::Vec(4, Int),
            31 => Self::Dictionary,
            40 => Self::PathVector,
            41 => Self::TokenVector,
            42 => Self::Specifier,
            43 => Self::Permission,
            44 => Self::Variability,
            46 => Self::TimeSamples,
            48 => Self::DoubleVector,
            50 => Self::StringVector,
            51 => Self::ValueBlock,
            56 => Self::TimeCode,
            other => Self::Other(other),
        }
    }
}

/// IEEE half-precision bits to `f64`.
fn half_to_f64(bits: u16) -> f64 {
    let sign = if bits & 0x8000 != 0 { -1.0 } else { 1.0 };
    let exponent = i32::from((bits >> 10) & 0x1f);
    let mantissa = f64::from(bits & 0x3ff);
    sign * match exponent {
        0 => mantissa * 2f64.powi(-24),
        0x1f if mantissa == 0.0 => f64::INFINITY,
        0x1f => f64::NAN,
        _ => (1.0 + mantissa / 1024.0) * 2f64.powi(exponent - 15),
    }
}

fn numbers(values: impl IntoIterator<Item = f64>) -> Value {
    Value::Tuple(values.into_iter().map(Value::Number).collect())
}

/// Rows of an `n` by `n` matrix as nested tuples.
fn matrix_rows(n: usize, values: &[f64]) -> Value {
    Value::Tuple(
        values
            .chunks(n)
            .map(|row| numbers(row.iter().copied()))
            .collect(),
    )
}

/// Quaternions are stored imaginary first; layer values list the real part
/// first, as text layers author them.
fn quat(values: [f64; 4]) -> Value {
    let [i, j, k, real] = values;
    numbers([real, i, j, k])
}

fn enum_token(names: &[&str], bits: u32) -> Value {
    let name = names.get(bits as usize).copied().unwrap_or(names[0]);
    Value::Token(name.to_string())
}

impl CrateFile<'_> {
    /// Decode a field value.
    ///
    /// Returns `None` for types this reader does not decode (list ops,
    /// payloads, time samples and non-empty dictionaries).
    pub(crate) fn decode_value(&self, rep: ValueRep) -> Result<Option<Value>, CrateError> {
        let kind = CrateType::from_id(rep.type_id());
        if rep.is_array() {
            return self.decode_array(kind, rep);
        }
        if rep.is_inlined() {
            return self.decode_inlined(kind, rep.payload() as u32);
        }

        let mut reader = self.reader().at(rep.payload())?;
        let value = match kind {
            CrateType::Bool => Value::Bool(reader.u8()? != 0),
            CrateType::UChar => Value::Number(reader.u8()?.into()),
            CrateType::Int => Value::Number(reader.i32()?.into()),
            CrateType::UInt => Value::Number(reader.u32()?.into()),
            CrateType::Int64 => Value::Number(reader.i64()? as f64),
            CrateType::UInt64 => Value::Number(reader.u64()? as f64),
            CrateType::Half => Value::Number(Scalar::Half.read(&mut reader)?),
            CrateType::Float => Value::Number(Scalar::Float.read(&mut reader)?),
            CrateType::Double | CrateType::TimeCode => Value::Number(reader.f64()?),
            CrateType::Vec(n, scalar) => {
                numbers((0..n).map(|_| scalar.read(&mut reader)).collect::<Result<Vec<_>, _>>()?)
            }
            CrateType::Quat(scalar) => {
                let mut values = [0.0; 4];
                for slot in &mut values {
                    *slot = scalar.read(&mut reader)?;
                }
                quat(values)
            }
            CrateType::Matrix(n) => {
                let values = (0..n * n)
                    .map(|_| reader.f64())
                    .collect::<Result<Vec<_>, _>>()?;
                matrix_rows(n, &values)
            }
            CrateType::TokenVector => {
                let count = reader.count(4)?;
                Value::Array(self.read_indexed(&mut reader, count, |file, index| {
                    file.token(index).map(|t| Value::Token(t.to_string()))
                })?)
            }
            CrateType::StringVector => {
                let count = reader.count(4)?;
                Value::Array(self.read_indexed(&mut reader, count, |file, index| {
                    file.string(index).map(|s| Value::String(s.to_string()))
                })?)
            }
            CrateType::PathVector => {
                let count = reader.count(4)?;
                Value::Array(self.read_indexed(&mut reader, count, |file, index| {
                    file.path(index).map(|p| Value::Path(p.to_string()))
                })?)
            }
            CrateType::DoubleVector => {
                let count = reader.count(8)?;
                Value::Array(
                    (0..count)
                        .map(|_| reader.f64().map(Value::Number))
                        .collect::<Result<_, _>>()?,
                )
            }
            // Index-like types are always inlined; decode the payload the same way.
            CrateType::String
            | CrateType::Token
            | CrateType::AssetPath
            | CrateType::Specifier
            | CrateType::Permission
            | CrateType::Variability
            | CrateType::ValueBlock => return self.decode_inlined(kind, rep.payload() as u32),
            CrateType::Dictionary | CrateType::TimeSamples | CrateType::Other(_) => {
                return Ok(None)
            }
        };
        Ok(Some(value))
    }

    /// Decode a value whose data lives in the low 32 payload bits.
    fn decode_inlined(&self, kind: CrateType, bits: u32) -> Result<Option<Value>, CrateError> {
        let bytes = bits.to_le_bytes();
        let value = match kind {
            CrateType::Bool => Value::Bool(bits != 0),
            CrateType::UChar => Value::Number(bytes[0].into()),
            CrateType::Int | CrateType::Int64 => Value::Number((bits as i32).into()),
            CrateType::UInt | CrateType::UInt64 => Value::Number(bits.into()),
            CrateType::Half => Value::Number(half_to_f64(bits as u16)),
            // Doubles that fit a float exactly are inlined as one.
            CrateType::Float | CrateType::Double | CrateType::TimeCode => {
                Value::Number(f32::from_bits(bits).into())
            }
            CrateType::String => Value::String(self.string(bits)?.to_string()),
            CrateType::Token => Value::Token(self.token(bits)?.to_string()),
            CrateType::AssetPath => Value::AssetPath(self.token(bits)?.to_string()),
            // Vectors of small integers pack one i8 per component.
            CrateType::Vec(n, _) => numbers(bytes[..n].iter().map(|b| f64::from(*b as i8))),
            // Diagonal matrices of small integers pack the diagonal.
            CrateType::Matrix(n) => {
                let mut values = vec![0.0; n * n];
                for (i, b) in bytes[..n].iter().enumerate() {
                    values[i * n + i] = f64::from(*b as i8);
                }
                matrix_rows(n, &values)
            }
            CrateType::Dictionary => Value::Dictionary(Vec::new()),
            CrateType::Specifier => enum_token(&["def", "over", "class"], bits),
            CrateType::Permission => enum_token(&["public", "private"], bits),
            CrateType::Variability => enum_token(&["varying", "uniform"], bits),
            CrateType::ValueBlock => Value::None,
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    /// Decode an array value.
    fn decode_array(&self, kind: CrateType, rep: ValueRep) -> Result<Option<Value>, CrateError> {
        if rep.payload() == 0 {
            return Ok(Some(Value::Array(Vec::new())));
        }

        let mut reader = self.reader().at(rep.payload())?;
        let count = if self.version >= (0, 7, 0) {
            reader.u64()?
        } else {
            reader.u32()?.into()
        };
        if count > (MAX_FILE_SIZE / 4) as u64 {
            return Err(CrateError::TooLarge {
                what: "array",
                size: count,
                limit: MAX_FILE_SIZE / 4,
            });
        }
        let count = count as usize;

        if rep.is_compressed() {
            return self.decode_compressed_array(kind, &mut reader, count);
        }

        let items = match kind {
            CrateType::Bool => self.read_each(&mut reader, count, 1, |r| {
                Ok(Value::Bool(r.u8()? != 0))
            })?,
            CrateType::UChar => {
                self.read_each(&mut reader, count, 1, |r| Ok(Value::Number(r.u8()?.into())))?
            }
            CrateType::Int => {
                self.read_each(&mut reader, count, 4, |r| Ok(Value::Number(r.i32()?.into())))?
            }
            CrateType::UInt => {
                self.read_each(&mut reader, count, 4, |r| Ok(Value::Number(r.u32()?.into())))?
            }
            CrateType::Int64 => {
                self.read_each(&mut reader, count, 8, |r| Ok(Value::Number(r.i64()? as f64)))?
            }
            CrateType::UInt64 => {
                self.read_each(&mut reader, count, 8, |r| Ok(Value::Number(r.u64()? as f64)))?
            }
            CrateType::Half => self.read_scalars(&mut reader, count, Scalar::Half)?,
            CrateType::Float => self.read_scalars(&mut reader, count, Scalar::Float)?,
            CrateType::Double | CrateType::TimeCode => {
                self.read_scalars(&mut reader, count, Scalar::Double)?
            }
            CrateType::Token => self.read_indexed(&mut reader, count, |file, index| {
                file.token(index).map(|t| Value::Token(t.to_string()))
            })?,
            CrateType::String => self.read_indexed(&mut reader, count, |file, index| {
                file.string(index).map(|s| Value::String(s.to_string()))
            })?,
            CrateType::AssetPath => self.read_indexed(&mut reader, count, |file, index| {
                file.token(index).map(|t| Value::AssetPath(t.to_string()))
            })?,
            CrateType::Vec(n, scalar) => self.read_each(&mut reader, count, n * scalar.size(), |r| {
                Ok(numbers((0..n).map(|_| scalar.read(r)).collect::<Result<Vec<_>, _>>()?))
            })?,
            CrateType::Quat(scalar) => self.read_each(&mut reader, count, 4 * scalar.size(), |r| {
                let mut values = [0.0; 4];
                for slot in &mut values {
                    *slot = scalar.read(r)?;
                }
                Ok(quat(values))
            })?,
            CrateType::Matrix(n) => self.read_each(&mut reader, count, n * n * 8, |r| {
                let values = (0..n * n).map(|_| r.f64()).collect::<Result<Vec<_>, _>>()?;
                Ok(matrix_rows(n, &values))
            })?,
            _ => return Ok(None),
        };
        Ok(Some(Value::Array(items)))
    }

    /// Integer arrays are delta coded; floating point arrays are either
    /// integers (`'i'`) or indices into a lookup table (`'t'`).
    fn decode_compressed_array(
        &self,
        kind: CrateType,
        reader: &mut ByteReader<'_>,
        count: usize,
    ) -> Result<Option<Value>, CrateError> {
        let numbers: Vec<f64> = match kind {
            CrateType::Int | CrateType::UInt => read_compressed_ints(reader, count, IntWidth::Four)?
                .into_iter()
                .map(|v| if kind == CrateType::UInt { f64::from(v as u32) } else { v as f64 })
                .collect(),
            CrateType::Int64 | CrateType::UInt64 => {
                read_compressed_ints(reader, count, IntWidth::Eight)?
                    .into_iter()
                    .map(|v| if kind == CrateType::UInt64 { v as u64 as f64 } else { v as f64 })
                    .collect()
            }
            CrateType::Half | CrateType::Float | CrateType::Double => {
                let scalar = match kind {
                    CrateType::Half => Scalar::Half,
                    CrateType::Float => Scalar::Float,
                    _ => Scalar::Double,
                };
                match reader.u8()? {
                    b'i' => read_compressed_ints(reader, count, IntWidth::Four)?
                        .into_iter()
                        .map(|v| v as f64)
                        .collect(),
                    b't' => {
                        let table_len = reader.u32()? as usize;
                        reader.check_count(table_len as u64, scalar.size())?;
                        let table = (0..table_len)
                            .map(|_| scalar.read(reader))
                            .collect::<Result<Vec<_>, _>>()?;
                        read_u32s(reader, count)?
                            .into_iter()
                            .map(|index| {
                                table.get(index as usize).copied().ok_or(CrateError::BadIndex {
                                    table: "lookup table",
                                    index: index as usize,
                                })
                            })
                            .collect::<Result<_, _>>()?
                    }
                    code => {
                        return Err(CrateError::Corrupt(format!(
                            "unknown float array encoding {code:#04x}"
                        )))
                    }
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(Value::Array(numbers.into_iter().map(Value::Number).collect())))
    }

    fn read_each(
        &self,
        reader: &mut ByteReader<'_>,
        count: usize,
        element_size: usize,
        mut read: impl FnMut(&mut ByteReader<'_>) -> Result<Value, CrateError>,
    ) -> Result<Vec<Value>, CrateError> {
        reader.check_count(count as u64, element_size)?;
        (0..count).map(|_| read(reader)).collect()
    }

    fn read_scalars(
        &self,
        reader: &mut ByteReader<'_>,
        count: usize,
        scalar: Scalar,
    ) -> Result<Vec<Value>, CrateError> {
        self.read_each(reader, count, scalar.size(), |r| scalar.read(r).map(Value::Number))
    }

    /// Read `count` `u32` table indices and resolve each.
    fn read_indexed(
        &self,
        reader: &mut ByteReader<'_>,
        count: usize,
        resolve: impl Fn(&Self, u32) -> Result<Value, CrateError>,
    ) -> Result<Vec<Value>, CrateError> {
        reader.check_count(count as u64, 4)?;
        (0..count)
            .map(|_| reader.u32().and_then(|index| resolve(self, index)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rep_bits() {
        let rep = ValueRep(ValueRep::ARRAY_BIT | ValueRep::COMPRESSED_BIT | (3 << 48) | 0x1234);
        assert!(rep.is_array());
        assert!(rep.is_compressed());
        assert!(!rep.is_inlined());
        assert_eq!(rep.type_id(), 3);
        assert_eq!(rep.payload(), 0x1234);
    }

    #[test]
    fn test_type_tags() {
        assert_eq!(CrateType::from_id(15), CrateType::Matrix(4));
        assert_eq!(CrateType::from_id(17), CrateType::Quat(Scalar::Float));
        assert_eq!(CrateType::from_id(23), CrateType::Vec(3, Scalar::Double));
        assert_eq!(CrateType::from_id(41), CrateType::TokenVector);
        assert_eq!(CrateType::from_id(35), CrateType::Other(35));
    }

    #[test]
    fn test_half_floats() {
        assert_eq!(half_to_f64(0x3c00), 1.0);
        assert_eq!(half_to_f64(0xc000), -2.0);
        assert_eq!(half_to_f64(0x3800), 0.5);
        assert_eq!(half_to_f64(0x0000), 0.0);
        assert!(half_to_f64(0x7c00).is_infinite());
        assert!(half_to_f64(0x7e00).is_nan());
    }

    #[test]
    fn test_quat_puts_real_part_first() {
        assert_eq!(quat([1.0, 2.0, 3.0, 4.0]).as_vec4(), Some([4.0, 1.0, 2.0, 3.0]));
    }
}
