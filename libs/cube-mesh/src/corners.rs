//! # Cube Corners
//!
//! The eight unordered corners of a (possibly transformed) cube.

use config::constants::{CUBE_CORNER_COUNT, UNIT_CUBE_HALF_EXTENT};
use glam::{DMat4, DVec3};

/// Eight corner points in no particular order.
///
/// # Example
///
/// ```rust
/// use cube_mesh::CubeCorners;
/// use glam::{DMat4, DVec3};
///
/// let corners = CubeCorners::from_transform(DMat4::from_translation(DVec3::new(0.0, 3.0, 0.0)));
/// assert_eq!(corners.centroid(), DVec3::new(0.0, 3.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeCorners([DVec3; CUBE_CORNER_COUNT]);

impl CubeCorners {
    /// Wraps eight points.
    pub const fn new(points: [DVec3; CUBE_CORNER_COUNT]) -> Self {
        Self(points)
    }

    /// Corners of an axis-aligned box centred on the origin.
    ///
    /// Corner `i` takes the positive extent on X when bit 0 of `i` is set,
    /// on Y for bit 1 and on Z for bit 2.
    pub fn centered_box(half_extent: f64) -> Self {
        let mut points = [DVec3::ZERO; CUBE_CORNER_COUNT];
        for (i, point) in points.iter_mut().enumerate() {
            let sign = |bit: usize| if i & bit != 0 { half_extent } else { -half_extent };
            *point = DVec3::new(sign(1), sign(2), sign(4));
        }
        Self(points)
    }

    /// Corners of the unit cube (`±0.5` on every axis).
    pub fn unit() -> Self {
        Self::centered_box(UNIT_CUBE_HALF_EXTENT)
    }

    /// Unit cube corners mapped through `local_to_world`.
    pub fn from_transform(local_to_world: DMat4) -> Self {
        Self(Self::unit().0.map(|p| local_to_world.transform_point3(p)))
    }

    /// The eight points.
    pub fn points(&self) -> &[DVec3; CUBE_CORNER_COUNT] {
        &self.0
    }

    /// Mean of the eight points.
    pub fn centroid(&self) -> DVec3 {
        self.0.iter().copied().sum::<DVec3>() / CUBE_CORNER_COUNT as f64
    }
}

// =============================================================================
// TESTS
// =============================================================================
