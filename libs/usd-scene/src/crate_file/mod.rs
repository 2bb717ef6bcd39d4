//! # Crate Files
//!
//! Reader for binary USD layers (`.usdc`), decoded into the same
//! [`Layer`] the text parser produces.
//!
//! ## File Layout
//!
//! ```text
//! "PXR-USDC" | version | toc offset | ... values ... | sections | toc
//! ```
//!
//! The table of contents names six sections:
//!
//! - `TOKENS`: every token, LZ4 compressed and NUL separated
//! - `STRINGS`: token indices used by string values
//! - `FIELDS`: (token, value rep) pairs
//! - `FIELDSETS`: runs of field indices, each ended by `u32::MAX`
//! - `PATHS`: the path tree in pre-order with sibling jumps
//! - `SPECS`: (path, field set, spec type) triples
//!
//! Integer tables are delta coded and LZ4 compressed, see
//! [`compression`].
//!
//! ## Example
//!
//! ```rust
//! use usd_scene::crate_file::read_crate;
//!
//! assert!(read_crate(b"PXR-USDC").is_err());
//! ```

mod compression;
mod layer;
mod reader;
mod value;

#[cfg(test)]
pub(crate) mod writer;

use crate::error::CrateError;
use compression::{decompress, read_i32s, read_u32s};
use config::constants::{MAX_FILE_SIZE, USDC_MAGIC};
use reader::ByteReader;
use usda_parser::Layer;
use value::ValueRep;

/// Oldest crate version with compressed structural sections and
/// shape-free arrays.
const MIN_VERSION: (u8, u8, u8) = (0, 5, 0);

/// Section names are stored in 16 NUL padded bytes.
const SECTION_NAME_LEN: usize = 16;

/// Terminator of a field set run.
const FIELD_SET_END: u32 = u32::MAX;

/// Decode a binary crate layer.
pub fn read_crate(bytes: &[u8]) -> Result<Layer, CrateError> {
    let file = CrateFile::parse(bytes)?;
    log::debug!(
        "usdc {}.{}.{}: {} tokens, {} specs",
        file.version.0,
        file.version.1,
        file.version.2,
        file.tokens.len(),
        file.specs.len()
    );
    file.build_layer()
}

// =============================================================================
// STRUCTURE
// =============================================================================

#[derive(Debug, Clone)]
struct Section {
    name: String,
    start: u64,
}

#[derive(Debug, Clone, Copy)]
struct Field {
    token: u32,
    rep: ValueRep,
}

/// What kind of object a spec describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecType {
    Attribute,
    Prim,
    PseudoRoot,
    Relationship,
    Other(u32),
}

impl SpecType {
    fn from_id(id: u32) -> Self {
        match id {
            1 => Self::Attribute,
            6 => Self::Prim,
            7 => Self::PseudoRoot,
            8 => Self::Relationship,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Spec {
    path: u32,
    field_set: u32,
    spec_type: SpecType,
}

/// The decoded structural tables of a crate file.
pub(crate) struct CrateFile<'a> {
    bytes: &'a [u8],
    version: (u8, u8, u8),
    tokens: Vec<String>,
    strings: Vec<u32>,
    fields: Vec<Field>,
    field_sets: Vec<u32>,
    paths: Vec<Option<String>>,
    specs: Vec<Spec>,
}

impl<'a> CrateFile<'a> {
    fn parse(bytes: &'a [u8]) -> Result<Self, CrateError> {
        let mut reader = ByteReader::new(bytes);
        if reader.take(USDC_MAGIC.len())? != USDC_MAGIC {
            return Err(CrateError::Corrupt("missing PXR-USDC magic".to_string()));
        }
        let version_bytes = reader.take(8)?;
        let version = (version_bytes[0], version_bytes[1], version_bytes[2]);
        if version.0 != 0 || version < MIN_VERSION {
            return Err(CrateError::UnsupportedVersion(version.0, version.1, version.2));
        }
        let toc_offset = reader.u64()?;
        let sections = read_toc(&mut reader.at(toc_offset)?)?;

        let section = |name: &'static str| -> Result<ByteReader<'a>, CrateError> {
            let section = sections
                .iter()
                .find(|s| s.name == name)
                .ok_or(CrateError::MissingSection(name))?;
            reader.at(section.start)
        };

        let tokens = read_tokens(&mut section("TOKENS")?)?;
        let strings = match section("STRINGS") {
            Ok(mut reader) => read_strings(&mut reader)?,
            Err(CrateError::MissingSection(_)) => Vec::new(),
            Err(e) => return Err(e),
        };
        let fields = read_fields(&mut section("FIELDS")?)?;
        let field_sets = read_field_sets(&mut section("FIELDSETS")?)?;
        let specs = read_specs(&mut section("SPECS")?)?;

        let mut file = Self {
            bytes,
            version,
            tokens,
            strings,
            fields,
            field_sets,
            paths: Vec::new(),
            specs,
        };
        file.paths = file.read_paths(&mut section("PATHS")?)?;
        Ok(file)
    }

    pub(crate) fn reader(&self) -> ByteReader<'a> {
        ByteReader::new(self.bytes)
    }

    pub(crate) fn token(&self, index: u32) -> Result<&str, CrateError> {
        self.tokens
            .get(index as usize)
            .map(String::as_str)
            .ok_or(CrateError::BadIndex {
                table: "token",
                index: index as usize,
            })
    }

    pub(crate) fn string(&self, index: u32) -> Result<&str, CrateError> {
        let token = self.strings.get(index as usize).ok_or(CrateError::BadIndex {
            table: "string",
            index: index as usize,
        })?;
        self.token(*token)
    }

    pub(crate) fn path(&self, index: u32) -> Result<&str, CrateError> {
        self.paths
            .get(index as usize)
            .and_then(Option::as_deref)
            .ok_or(CrateError::BadIndex {
                table: "path",
                index: index as usize,
            })
    }

    /// Field names and reps of a spec, in stored order.
    fn spec_fields(&self, spec: &Spec) -> Result<Vec<(&str, ValueRep)>, CrateError> {
        let start = spec.field_set as usize;
        let run = self.field_sets.get(start..).ok_or(CrateError::BadIndex {
            table: "field set",
            index: start,
        })?;

        let mut fields = Vec::new();
        for &index in run.iter().take_while(|index| **index != FIELD_SET_END) {
            let field = self.fields.get(index as usize).ok_or(CrateError::BadIndex {
                table: "field",
                index: index as usize,
            })?;
            fields.push((self.token(field.token)?, field.rep));
        }
        Ok(fields)
    }

    /// Rebuild path strings from the pre-order path tree.
    ///
    /// Each entry has a jump: `-1` child only, `0` sibling only, `-2`
    /// neither, and a positive offset to the sibling when both follow.
    /// Negative element tokens name properties.
    fn read_paths(&self, reader: &mut ByteReader<'_>) -> Result<Vec<Option<String>>, CrateError> {
        let path_count = reader.u64()?;
        if path_count > (MAX_FILE_SIZE / 8) as u64 {
            return Err(CrateError::TooLarge {
                what: "path table",
                size: path_count,
                limit: MAX_FILE_SIZE / 8,
            });
        }
        let mut paths = vec![None; path_count as usize];

        let encoded = usize::try_from(reader.u64()?).unwrap_or(usize::MAX);
        let path_indexes = read_u32s(reader, encoded)?;
        let element_tokens = read_i32s(reader, encoded)?;
        let jumps = read_i32s(reader, encoded)?;
        if encoded == 0 {
            return Ok(paths);
        }

        let mut pending: Vec<(usize, Option<String>)> = vec![(0, None)];
        let mut visited = 0usize;
        while let Some((mut index, mut parent)) = pending.pop() {
            loop {
                visited += 1;
                if index >= encoded || visited > encoded {
                    return Err(CrateError::Corrupt("path tree jumps out of range".to_string()));
                }

                let path = match &parent {
                    None => "/".to_string(),
                    Some(parent) => {
                        let element = element_tokens[index];
                        let name = self.token(element.unsigned_abs())?;
                        if element < 0 {
                            format!("{parent}.{name}")
                        } else if parent == "/" {
                            format!("/{name}")
                        } else {
                            format!("{parent}/{name}")
                        }
                    }
                };

                let slot = path_indexes[index] as usize;
                *paths.get_mut(slot).ok_or(CrateError::BadIndex {
                    table: "path",
                    index: slot,
                })? = Some(path.clone());

                let jump = jumps[index];
                let has_child = jump > 0 || jump == -1;
                let has_sibling = jump >= 0;
                if has_child {
                    if has_sibling {
                        pending.push((index + jump as usize, parent.clone()));
                    }
                    parent = Some(path);
                }
                if !has_child && !has_sibling {
                    break;
                }
                index += 1;
            }
        }

        Ok(paths)
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

fn read_toc(reader: &mut ByteReader<'_>) -> Result<Vec<Section>, CrateError> {
    let count = reader.count(SECTION_NAME_LEN + 16)?;
    (0..count)
        .map(|_| {
            let raw = reader.take(SECTION_NAME_LEN)?;
            let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
            let name = String::from_utf8_lossy(&raw[..end]).into_owned();
            let start = reader.u64()?;
            let _size = reader.u64()?;
            Ok(Section { name, start })
        })
        .collect()
}

fn read_tokens(reader: &mut ByteReader<'_>) -> Result<Vec<String>, CrateError> {
    let count = usize::try_from(reader.u64()?).unwrap_or(usize::MAX);
    let uncompressed = usize::try_from(reader.u64()?).unwrap_or(usize::MAX);
    let compressed = usize::try_from(reader.u64()?).unwrap_or(usize::MAX);
    let chars = decompress(reader.take(compressed)?, uncompressed)?;

    let tokens: Vec<String> = chars
        .split(|b| *b == 0)
        .take(count)
        .map(|token| String::from_utf8_lossy(token).into_owned())
        .collect();
    if tokens.len() != count {
        return Err(CrateError::Corrupt(format!(
            "expected {count} tokens, found {}",
            tokens.len()
        )));
    }
    Ok(tokens)
}

fn read_strings(reader: &mut ByteReader<'_>) -> Result<Vec<u32>, CrateError> {
    let count = reader.count(4)?;
    (0..count).map(|_| reader.u32()).collect()
}

fn read_fields(reader: &mut ByteReader<'_>) -> Result<Vec<Field>, CrateError> {
    let count = usize::try_from(reader.u64()?).unwrap_or(usize::MAX);
    let tokens = read_u32s(reader, count)?;

    let reps_size = usize::try_from(reader.u64()?).unwrap_or(usize::MAX);
    let rep_bytes = decompress(reader.take(reps_size)?, count.saturating_mul(8))?;
    if rep_bytes.len() != count * 8 {
        return Err(CrateError::Corrupt(format!(
            "expected {count} value reps, found {} bytes",
            rep_bytes.len()
        )));
    }

    let mut reps = ByteReader::new(&rep_bytes);
    tokens
        .into_iter()
        .map(|token| {
            Ok(Field {
                token,
                rep: ValueRep(reps.u64()?),
            })
        })
        .collect()
}

fn read_field_sets(reader: &mut ByteReader<'_>) -> Result<Vec<u32>, CrateError> {
    let count = usize::try_from(reader.u64()?).unwrap_or(usize::MAX);
    read_u32s(reader, count)
}

fn read_specs(reader: &mut ByteReader<'_>) -> Result<Vec<Spec>, CrateError> {
    let count = usize::try_from(reader.u64()?).unwrap_or(usize::MAX);
    let paths = read_u32s(reader, count)?;
    let field_sets = read_u32s(reader, count)?;
    let spec_types = read_u32s(reader, count)?;

    Ok(paths
        .into_iter()
        .zip(field_sets)
        .zip(spec_types)
        .map(|((path, field_set), spec_type)| Spec {
            path,
            field_set,
            spec_type: SpecType::from_id(spec_type),
        })
        .collect())
}
