//! # Vertex Canonicalizer
//!
//! Orders eight cube corners into a bottom face then a top face, each
//! counter-clockwise when viewed from above.
//!
//! ## Algorithm
//!
//! ```text
//! 1. centroid c of all eight corners
//! 2. bottom = { p | p.y <  c.y },  top = { p | p.y >= c.y }
//! 3. sort each face by atan2(z - cz, x - cx) about the face's own centroid
//! 4. vertices = bottom ++ top
//! ```
//!
//! The split is exact: rotated cubes whose corners do not fall four on each
//! side are rejected, and ones that happen to split 4/4 are accepted as-is.

use crate::corners::CubeCorners;
use crate::error::ShapeError;
use config::constants::{CUBE_CORNER_COUNT, CUBE_FACE_CORNER_COUNT, VERTICAL_AXIS};
use glam::DVec3;

/// Corners in mesh order: `0..4` bottom face, `4..8` top face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedCubeVertices([DVec3; CUBE_CORNER_COUNT]);

impl OrderedCubeVertices {
    /// All eight vertices in order.
    pub fn vertices(&self) -> &[DVec3; CUBE_CORNER_COUNT] {
        &self.0
    }

    /// Bottom face, counter-clockwise from above.
    pub fn bottom(&self) -> &[DVec3] {
        &self.0[..CUBE_FACE_CORNER_COUNT]
    }

    /// Top face, counter-clockwise from above.
    pub fn top(&self) -> &[DVec3] {
        &self.0[CUBE_FACE_CORNER_COUNT..]
    }
}

/// Order cube corners for meshing.
///
/// # Errors
///
/// - [`ShapeError::NonFinite`] if any coordinate is NaN or infinite
/// - [`ShapeError::UnbalancedPartition`] if the vertical split is not 4/4
///
/// # Example
///
/// ```rust
/// use cube_mesh::{canonicalize, CubeCorners};
///
/// let ordered = canonicalize(&CubeCorners::unit()).unwrap();
/// assert!(ordered.bottom().iter().all(|v| v.y < 0.0));
/// assert!(ordered.top().iter().all(|v| v.y > 0.0));
/// ```
pub fn canonicalize(corners: &CubeCorners) -> Result<OrderedCubeVertices, ShapeError> {
    if let Some((index, point)) = corners
        .points()
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite())
    {
        return Err(ShapeError::NonFinite {
            index,
            point: *point,
        });
    }

    let split = corners.centroid()[VERTICAL_AXIS];
    let (mut bottom, mut top): (Vec<DVec3>, Vec<DVec3>) = corners
        .points()
        .iter()
        .partition(|p| p[VERTICAL_AXIS] < split);

    if bottom.len() != CUBE_FACE_CORNER_COUNT {
        return Err(ShapeError::UnbalancedPartition {
            bottom: bottom.len(),
            top: top.len(),
        });
    }

    sort_counter_clockwise(&mut bottom);
    sort_counter_clockwise(&mut top);

    let mut ordered = [DVec3::ZERO; CUBE_CORNER_COUNT];
    for (slot, vertex) in ordered.iter_mut().zip(bottom.into_iter().chain(top)) {
        *slot = vertex;
    }
    Ok(OrderedCubeVertices(ordered))
}

/// Sort face corners by polar angle in the horizontal plane, ascending.
///
/// Equal angles keep their input order.
fn sort_counter_clockwise(face: &mut [DVec3]) {
    let center = face.iter().copied().sum::<DVec3>() / face.len() as f64;
    let angle = |p: &DVec3| (p.z - center.z).atan2(p.x - center.x);
    face.sort_by(|a, b| angle(a).total_cmp(&angle(b)));
}
