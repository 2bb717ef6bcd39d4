//! # Stage
//!
//! An opened USD file: the root layer plus traversal with world
//! transforms.
//!
//! ## Example
//!
//! ```rust
//! use usd_scene::Stage;
//!
//! let stage = Stage::from_usda("#usda 1.0\ndef Xform \"World\" {\n def Cube \"Box\" {}\n}").unwrap();
//! let paths: Vec<_> = stage.traverse().iter().map(|p| p.path().to_string()).collect();
//! assert_eq!(paths, ["/World", "/World/Box"]);
//! ```

mod format;

pub use format::{read_usdz_root, LayerFormat};

use crate::crate_file::read_crate;
use crate::error::{SceneError, XformError};
use crate::xform::local_transform;
use config::constants::{EXPECTED_UP_AXIS, MAX_FILE_SIZE};
use glam::DMat4;
use std::path::Path;
use usda_parser::{Attribute, Layer, PrimSpec, Specifier, Value};

// =============================================================================
// STAGE
// =============================================================================

/// A loaded scene.
///
/// Only the root layer is read. Composition arcs (references, payloads,
/// inherits, variants) are left unresolved and prims are taken as authored.
#[derive(Debug, Clone)]
pub struct Stage {
    layer: Layer,
}

impl Stage {
    /// Open a `.usda`, `.usdc` or `.usdz` file.
    ///
    /// The format is decided by the file's leading bytes, not its extension.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)
            .map_err(|e| SceneError::io(path, e))?
            .len();
        if size > MAX_FILE_SIZE as u64 {
            return Err(SceneError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit: MAX_FILE_SIZE,
            });
        }

        let bytes = std::fs::read(path).map_err(|e| SceneError::io(path, e))?;
        log::info!("opening stage {}", path.display());
        Self::from_bytes(&bytes)
    }

    /// Load a stage from file contents.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SceneError> {
        match LayerFormat::detect(bytes) {
            LayerFormat::Usdc => Ok(Self::from_layer(read_crate(bytes)?)),
            LayerFormat::Usdz => {
                let (name, contents) = read_usdz_root(bytes)?;
                log::debug!("reading usdz root layer {name}");
                Self::from_bytes(&contents)
            }
            LayerFormat::Usda => Self::from_usda(std::str::from_utf8(bytes)?),
        }
    }

    /// Load a stage from USDA text.
    ///
    /// Any parse error rejects the whole layer.
    pub fn from_usda(source: &str) -> Result<Self, SceneError> {
        let parsed = usda_parser::parse(source);
        for error in parsed.errors.iter().skip(1) {
            log::debug!("additional parse error: {error}");
        }
        Ok(Self::from_layer(parsed.into_result()?))
    }

    /// Wrap an already parsed layer.
    pub fn from_layer(layer: Layer) -> Self {
        let stage = Self { layer };
        if let Some(axis) = stage.up_axis() {
            if axis != EXPECTED_UP_AXIS {
                log::warn!("stage upAxis is {axis}; cubes are oriented assuming {EXPECTED_UP_AXIS}-up");
            }
        }
        stage
    }

    /// The root layer.
    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    /// `upAxis` layer metadata, if authored.
    pub fn up_axis(&self) -> Option<&str> {
        self.layer.metadata.get("upAxis").and_then(Value::as_str)
    }

    /// `metersPerUnit` layer metadata, if authored.
    pub fn meters_per_unit(&self) -> Option<f64> {
        self.layer.metadata.get("metersPerUnit").and_then(Value::as_f64)
    }

    /// Walk the prim tree depth-first in pre-order.
    ///
    /// Only defined (`def`), active, non-abstract prims are visited; any
    /// other prim prunes its whole subtree. Children are visited in authored
    /// order, so the result is stable for a given file.
    pub fn traverse(&self) -> Vec<Prim<'_>> {
        let mut visited = Vec::new();
        let mut stack: Vec<(&PrimSpec, String, Result<DMat4, XformError>)> = self
            .layer
            .prims
            .iter()
            .rev()
            .map(|spec| (spec, String::new(), Ok(DMat4::IDENTITY)))
            .collect();

        while let Some((spec, parent_path, parent_world)) = stack.pop() {
            if !is_traversable(spec) {
                continue;
            }

            let path = format!("{parent_path}/{}", spec.name);
            if spec.has_composition_arcs() {
                log::warn!("{path}: composition arcs are not resolved");
            }

            let world = parent_world.and_then(|parent| {
                local_transform(&path, spec).map(|local| local.to_world(parent))
            });

            for child in spec.children.iter().rev() {
                stack.push((child, path.clone(), world.clone()));
            }

            visited.push(Prim {
                path,
                spec,
                local_to_world: world,
            });
        }

        visited
    }
}

/// Defined, active and not abstract.
fn is_traversable(spec: &PrimSpec) -> bool {
    spec.specifier == Specifier::Def && spec.is_active()
}

// =============================================================================
// PRIM
// =============================================================================

/// A prim visited by [`Stage::traverse`].
#[derive(Debug, Clone)]
pub struct Prim<'a> {
    path: String,
    spec: &'a PrimSpec,
    local_to_world: Result<DMat4, XformError>,
}

impl<'a> Prim<'a> {
    /// Absolute prim path, e.g. `/World/Wall1`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Prim name (last path element).
    pub fn name(&self) -> &'a str {
        &self.spec.name
    }

    /// Schema type name, empty for typeless prims.
    pub fn type_name(&self) -> &'a str {
        self.spec.type_name.as_deref().unwrap_or_default()
    }

    /// True if the prim's type name is exactly `type_name`.
    pub fn is_a(&self, type_name: &str) -> bool {
        self.type_name() == type_name
    }

    /// The underlying spec.
    pub fn spec(&self) -> &'a PrimSpec {
        self.spec
    }

    /// Attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&'a Attribute> {
        self.spec.attribute(name)
    }

    /// Local-to-world transform at the default time.
    ///
    /// Fails if the ops of this prim or of any ancestor cannot be evaluated.
    pub fn local_to_world(&self) -> Result<DMat4, XformError> {
        self.local_to_world.clone()
    }
}
