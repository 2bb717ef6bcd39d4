//! # USD Scene
//!
//! Stage loading, prim traversal and transform evaluation.
//!
//! ## Architecture
//!
//! ```text
//! file bytes → format detection → usda-parser or crate_file (Layer) → Stage → traverse → Prim + local-to-world
//! ```
//!
//! ## Example
//!
//! ```rust
//! use usd_scene::Stage;
//!
//! let stage = Stage::from_usda(
//!     "#usda 1.0\ndef Cube \"Box\" {\n double3 xformOp:translate = (0, 2, 0)\n uniform token[] xformOpOrder = [\"xformOp:translate\"]\n}",
//! )
//! .unwrap();
//!
//! for prim in stage.traverse() {
//!     let world = prim.local_to_world().unwrap();
//!     assert_eq!(world.w_axis.y, 2.0);
//! }
//! ```

pub mod crate_file;
pub mod error;
pub mod stage;
pub mod xform;

// Re-export public API
pub use crate_file::read_crate;
pub use error::{CrateError, SceneError, XformError};
pub use stage::{LayerFormat, Prim, Stage};
pub use xform::{local_transform, LocalTransform, XformOp, XformOpKind};
