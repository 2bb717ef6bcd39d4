//! Container format detection and USDZ unpacking.

use crate::error::SceneError;
use config::constants::{MAX_FILE_SIZE, USDC_MAGIC, USDZ_LAYER_EXTENSIONS, ZIP_MAGIC};
use std::io::{Cursor, Read};
use std::path::Path;

/// On-disk flavour of a USD file, decided by its leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerFormat {
    /// Text layer.
    Usda,
    /// Binary crate layer.
    Usdc,
    /// ZIP package holding a root layer.
    Usdz,
}

impl LayerFormat {
    /// Detect the format from the first bytes of a file.
    ///
    /// Anything that is neither a crate file nor a ZIP archive is treated as
    /// text; the parser rejects it if the `#usda` header is missing.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(USDC_MAGIC) {
            Self::Usdc
        } else if bytes.starts_with(ZIP_MAGIC) {
            Self::Usdz
        } else {
            Self::Usda
        }
    }
}

/// True if an archive entry name looks like a USD layer.
fn is_layer_entry(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            USDZ_LAYER_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        })
}

/// Extract the root layer of a USDZ package.
///
/// The root layer is the first USD layer in archive order.
///
/// ## Returns
///
/// The entry name and its bytes.
pub fn read_usdz_root(bytes: &[u8]) -> Result<(String, Vec<u8>), SceneError> {
    read_usdz_root_limited(bytes, MAX_FILE_SIZE)
}

/// [`read_usdz_root`] refusing root layers larger than `limit` bytes.
///
/// The declared entry size is checked first, then the read itself stops one
/// byte past the limit, so a lying header cannot force a larger buffer.
fn read_usdz_root_limited(bytes: &[u8], limit: usize) -> Result<(String, Vec<u8>), SceneError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() || !is_layer_entry(entry.name()) {
            continue;
        }

        let name = entry.name().to_string();
        let too_large = |size: u64| SceneError::FileTooLarge {
            path: name.clone().into(),
            size,
            limit,
        };
        if entry.size() > limit as u64 {
            return Err(too_large(entry.size()));
        }

        let mut contents = Vec::new();
        (&mut entry)
            .take(limit as u64 + 1)
            .read_to_end(&mut contents)
            .map_err(|e| SceneError::io(&name, e))?;
        if contents.len() > limit {
            return Err(too_large(contents.len() as u64));
        }

        log::debug!("usdz root layer: {name} ({} bytes)", contents.len());
        return Ok((name, contents));
    }

    Err(SceneError::NoRootLayer)
}

// =============================================================================
// TESTS
// =============================================================================
