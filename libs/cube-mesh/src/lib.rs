//! # Cube Mesh
//!
//! Turns the `Cube` prims of a USD stage into quad meshes.
//!
//! ## Architecture
//!
//! ```text
//! Stage → extract_cubes (CubeCorners + label) → canonicalize (OrderedCubeVertices)
//!       → assemble_mesh (Mesh) → Container
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cube_mesh::{extract_cubes, meshes_from_cubes};
//! use usd_scene::Stage;
//!
//! let stage = Stage::from_usda("#usda 1.0\ndef Cube \"Wall1\" {}").unwrap();
//! let meshes = meshes_from_cubes(&extract_cubes(&stage)).unwrap();
//! assert_eq!(meshes[0].type_label(), Some("wall"));
//! assert_eq!(meshes[0].vertices().len(), 24);
//! ```

pub mod canonical;
pub mod container;
pub mod corners;
pub mod error;
pub mod extract;
pub mod mesh;

// Re-export public API
pub use canonical::{canonicalize, OrderedCubeVertices};
pub use container::Container;
pub use corners::CubeCorners;
pub use error::{MeshError, ShapeError};
pub use extract::{extract_cubes, meshes_from_cubes, stage_to_meters, type_label, ExtractedCube};
pub use mesh::{assemble_mesh, demo_box_mesh, Mesh, CUBE_FACES};
