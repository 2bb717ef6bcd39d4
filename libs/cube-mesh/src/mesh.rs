//! # Mesh Assembler
//!
//! Flat vertex and face arrays for an ordered cube, in the layout the
//! Speckle mesh object expects.

use crate::canonical::{canonicalize, OrderedCubeVertices};
use crate::corners::CubeCorners;
use crate::error::ShapeError;
use config::constants::{CUBE_CORNER_COUNT, CUBE_QUAD_COUNT, QUAD_VERTEX_COUNT};
use serde::{Deserialize, Serialize};

/// Quad faces of a canonical cube as indices into the ordered vertices.
///
/// Order: back, left, front, right, top, bottom.
pub const CUBE_FACES: [[u32; 4]; CUBE_QUAD_COUNT] = [
    [0, 1, 5, 4],
    [0, 3, 7, 4],
    [4, 5, 6, 7],
    [1, 2, 6, 5],
    [3, 2, 6, 7],
    [0, 1, 2, 3],
];

/// Number of floats in a cube mesh's vertex array.
pub const CUBE_VERTEX_FLOATS: usize = CUBE_CORNER_COUNT * 3;

/// Number of integers in a cube mesh's face array.
pub const CUBE_FACE_INTS: usize = CUBE_QUAD_COUNT * (1 + QUAD_VERTEX_COUNT as usize);

/// A polygon mesh in flat-array form.
///
/// - `vertices`: three floats per vertex
/// - `faces`: each face is `[n, i0, .., i(n-1)]`
/// - `type`: optional free-text label
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    vertices: Vec<f64>,
    faces: Vec<u32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    type_label: Option<String>,
}

impl Mesh {
    /// Flat vertex coordinates.
    pub fn vertices(&self) -> &[f64] {
        &self.vertices
    }

    /// Flat face list.
    pub fn faces(&self) -> &[u32] {
        &self.faces
    }

    /// Type label, if any.
    pub fn type_label(&self) -> Option<&str> {
        self.type_label.as_deref()
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of faces, walking the `[n, ...]` groups.
    pub fn face_count(&self) -> usize {
        let mut count = 0;
        let mut i = 0;
        while i < self.faces.len() {
            i += 1 + self.faces[i] as usize;
            count += 1;
        }
        count
    }
}

/// Build the six-quad mesh for an ordered cube.
///
/// Each vertex is written as `(z, x, y)`: depth, width, height.
///
/// # Example
///
/// ```rust
/// use cube_mesh::{assemble_mesh, canonicalize, CubeCorners};
///
/// let ordered = canonicalize(&CubeCorners::unit()).unwrap();
/// let mesh = assemble_mesh(&ordered, Some("wall".to_string()));
/// assert_eq!(mesh.vertices().len(), 24);
/// assert_eq!(mesh.faces().len(), 30);
/// ```
pub fn assemble_mesh(ordered: &OrderedCubeVertices, type_label: Option<String>) -> Mesh {
    let vertices = ordered
        .vertices()
        .iter()
        .flat_map(|v| [v.z, v.x, v.y])
        .collect();

    let faces = CUBE_FACES
        .iter()
        .flat_map(|quad| std::iter::once(QUAD_VERTEX_COUNT).chain(quad.iter().copied()))
        .collect();

    Mesh {
        vertices,
        faces,
        type_label,
    }
}

/// Untyped mesh of an axis-aligned box centred on the origin.
///
/// Runs the same ordering and assembly as scene cubes.
pub fn demo_box_mesh(half_extent: f64) -> Result<Mesh, ShapeError> {
    let ordered = canonicalize(&CubeCorners::centered_box(half_extent))?;
    Ok(assemble_mesh(&ordered, None))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    const UNIT_VERTICES: [f64; CUBE_VERTEX_FLOATS] = [
        -0.5, -0.5, -0.5,
        -0.5,  0.5, -0.5,
         0.5,  0.5, -0.5,
         0.5, -0.5, -0.5,
        -0.5, -0.5,  0.5,
        -0.5,  0.5,  0.5,
         0.5,  0.5,  0.5,
         0.5, -0.5,  0.5,
    ];

    #[rustfmt::skip]
    const FACES: [u32; CUBE_FACE_INTS] = [
        4, 0, 1, 5, 4,
        4, 0, 3, 7, 4,
        4, 4, 5, 6, 7,
        4, 1, 2, 6, 5,
        4, 3, 2, 6, 7,
        4, 0, 1, 2, 3,
    ];

    #[test]
    fn test_unit_demo_box_matches_reference() {
        let mesh = demo_box_mesh(0.5).unwrap();
        assert_eq!(mesh.vertices(), &UNIT_VERTICES);
        assert_eq!(mesh.faces(), &FACES);
        assert_eq!(mesh.type_label(), None);
    }

    #[test]
    fn test_top_face_is_not_degenerate() {
        let top = &CUBE_FACES[4];
        let mut sorted = *top;
        sorted.sort_unstable();
        sorted.windows(2).for_each(|w| assert_ne!(w[0], w[1]));
        assert!(top.iter().all(|&i| i >= 2));
    }

    #[test]
    fn test_counts() {
        let mesh = demo_box_mesh(2.0).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 6);
        assert_eq!(CUBE_VERTEX_FLOATS, 24);
        assert_eq!(CUBE_FACE_INTS, 30);
    }

    #[test]
    fn test_vertices_are_depth_width_height() {
        let ordered = canonicalize(&CubeCorners::centered_box(1.0)).unwrap();
        let mesh = assemble_mesh(&ordered, None);
        let first = ordered.vertices()[1];
        assert_eq!(&mesh.vertices()[3..6], &[first.z, first.x, first.y]);
    }

    #[test]
    fn test_serialized_label_is_named_type() {
        let mesh = assemble_mesh(&canonicalize(&CubeCorners::unit()).unwrap(), Some("wall".into()));
        let json = serde_json::to_value(&mesh).unwrap();
        assert_eq!(json["type"], "wall");

        let untyped = serde_json::to_value(demo_box_mesh(0.5).unwrap()).unwrap();
        assert!(untyped.get("type").is_none());
    }

    #[test]
    fn test_zero_extent_box_is_shape_error() {
        assert!(demo_box_mesh(0.0).is_err());
    }
}
