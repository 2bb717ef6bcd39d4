//! # Cube Extractor
//!
//! Finds `Cube` prims on a stage and turns each into world-space corners
//! plus a type label, then into meshes.

use crate::canonical::canonicalize;
use crate::corners::CubeCorners;
use crate::error::MeshError;
use crate::mesh::{assemble_mesh, Mesh};
use config::constants::CUBE_TYPE_NAME;
use glam::{DMat4, DVec3};
use usd_scene::Stage;

/// A cube found on the stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedCube {
    /// Prim path.
    pub path: String,
    /// Unit cube corners in world space.
    pub corners: CubeCorners,
    /// Label derived from the prim name.
    pub type_label: String,
}

/// Normalized type label for a prim name: lowercased, trailing digits
/// removed.
///
/// ```rust
/// assert_eq!(cube_mesh::type_label("Wall12"), "wall");
/// assert_eq!(cube_mesh::type_label("Door2B"), "door2b");
/// ```
pub fn type_label(prim_name: &str) -> String {
    prim_name
        .to_lowercase()
        .trim_end_matches(|c: char| c.is_ascii_digit())
        .to_string()
}

/// Stage units to meters, from `metersPerUnit`.
///
/// Unauthored means meters. A zero, negative or non-finite value is
/// ignored with a warning.
pub fn stage_to_meters(stage: &Stage) -> f64 {
    match stage.meters_per_unit() {
        None => 1.0,
        Some(scale) if scale.is_finite() && scale > 0.0 => scale,
        Some(scale) => {
            log::warn!("ignoring metersPerUnit = {scale}; treating stage units as meters");
            1.0
        }
    }
}

/// Collect every cube on the stage in traversal order.
///
/// Corners are in meters. A cube whose transform cannot be evaluated is
/// skipped and logged at debug level.
pub fn extract_cubes(stage: &Stage) -> Vec<ExtractedCube> {
    let mut cubes = Vec::new();
    let to_meters = DMat4::from_scale(DVec3::splat(stage_to_meters(stage)));

    for prim in stage.traverse() {
        if !prim.is_a(CUBE_TYPE_NAME) {
            continue;
        }

        match prim.local_to_world() {
            Ok(matrix) => cubes.push(ExtractedCube {
                path: prim.path().to_string(),
                corners: CubeCorners::from_transform(to_meters * matrix),
                type_label: type_label(prim.name()),
            }),
            Err(e) => log::debug!("skipping cube {}: {e}", prim.path()),
        }
    }

    log::debug!("extracted {} cubes", cubes.len());
    cubes
}

/// Build a typed mesh for each cube, preserving order.
///
/// # Errors
///
/// The first cube whose corners cannot be ordered stops the build with
/// [`MeshError::Shape`].
pub fn meshes_from_cubes(cubes: &[ExtractedCube]) -> Result<Vec<Mesh>, MeshError> {
    cubes
        .iter()
        .map(|cube| {
            let ordered = canonicalize(&cube.corners)
                .map_err(|source| MeshError::shape(&cube.path, source))?;
            Ok(assemble_mesh(&ordered, Some(cube.type_label.clone())))
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
