//! # Mesh Errors
//!
//! Error types for corner ordering and mesh building.

use glam::DVec3;
use thiserror::Error;

/// Corners that cannot be ordered into a bottom and a top face.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    /// A corner has a NaN or infinite coordinate.
    #[error("corner {index} is not finite: {point}")]
    NonFinite {
        /// Index of the corner in the input.
        index: usize,
        /// The offending point.
        point: DVec3,
    },

    /// The vertical split did not give four corners on each side.
    #[error("expected 4 bottom and 4 top corners, found {bottom} and {top}")]
    UnbalancedPartition {
        /// Corners below the centroid.
        bottom: usize,
        /// Corners at or above the centroid.
        top: usize,
    },
}

/// Errors building meshes for extracted cubes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    /// A cube's corners could not be ordered.
    #[error("{path}: {source}")]
    Shape {
        /// Prim path of the cube.
        path: String,
        /// Ordering failure.
        #[source]
        source: ShapeError,
    },
}

impl MeshError {
    /// Creates a shape error for the cube at `path`.
    pub fn shape(path: impl Into<String>, source: ShapeError) -> Self {
        Self::Shape {
            path: path.into(),
            source,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
