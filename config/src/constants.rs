//! # Configuration Constants
//!
//! Centralized constants for the USD to Speckle importer.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Geometry**: Unit cube and mesh layout values
//! - **Scene**: USD type names and file signatures
//! - **Remote**: Speckle server, stream, and commit defaults
//! - **Serialization**: Object hashing and upload batching

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for floating-point comparisons.
///
/// # Example
///
/// ```rust
/// use config::constants::EPSILON;
///
/// fn approximately_equal(a: f64, b: f64) -> bool {
///     (a - b).abs() < EPSILON
/// }
///
/// assert!(approximately_equal(1.0, 1.0 + 1e-11));
/// ```
pub const EPSILON: f64 = 1e-10;

/// Determinant magnitude below which a matrix is treated as singular.
///
/// Used when an `!invert!` xform op asks for the inverse of an op matrix.
pub const SINGULAR_DETERMINANT: f64 = 1e-12;

// =============================================================================
// GEOMETRY CONSTANTS
// =============================================================================

/// Half the edge length of the canonical unit cube.
///
/// A USD `Cube` prim is meshed by transforming the eight corners
/// `(±0.5, ±0.5, ±0.5)` into world space. The prim's `size` attribute is not
/// consulted.
///
/// # Example
///
/// ```rust
/// use config::constants::UNIT_CUBE_HALF_EXTENT;
///
/// let edge = UNIT_CUBE_HALF_EXTENT * 2.0;
/// assert_eq!(edge, 1.0);
/// ```
pub const UNIT_CUBE_HALF_EXTENT: f64 = 0.5;

/// Number of corners of a cube.
pub const CUBE_CORNER_COUNT: usize = 8;

/// Number of corners on each horizontal face (bottom and top).
pub const CUBE_FACE_CORNER_COUNT: usize = 4;

/// Number of quadrilateral faces of a cube mesh.
pub const CUBE_QUAD_COUNT: usize = 6;

/// Index of the vertical axis (Y) used to split a cube into bottom and top
/// faces.
///
/// Horizontal ordering uses the remaining two axes, X and Z.
pub const VERTICAL_AXIS: usize = 1;

/// Vertex count written before every face in the flat face list.
pub const QUAD_VERTEX_COUNT: u32 = 4;

/// Half extent of the box uploaded by the `demo-box` program.
pub const DEMO_BOX_HALF_EXTENT: f64 = 2.0;

// =============================================================================
// SCENE CONSTANTS
// =============================================================================

/// USD prim type name identifying cube primitives.
pub const CUBE_TYPE_NAME: &str = "Cube";

/// Prim type names that carry xform ops.
///
/// Ops authored on any other prim (typeless prims, `Scope`, shaders) are
/// ignored and the prim contributes an identity transform.
pub const XFORMABLE_TYPE_NAMES: &[&str] = &[
    "Xform",
    "Cube",
    "Sphere",
    "Cylinder",
    "Cone",
    "Capsule",
    "Plane",
    "Mesh",
    "Points",
    "BasisCurves",
    "NurbsCurves",
    "NurbsPatch",
    "PointInstancer",
    "Camera",
    "SkelRoot",
    "Skeleton",
    "DistantLight",
    "DomeLight",
    "SphereLight",
    "RectLight",
    "DiskLight",
    "CylinderLight",
];

/// Up axis assumed by the vertex canonicalizer.
///
/// Layers authored with any other `upAxis` are still processed; the stage
/// logs a warning.
pub const EXPECTED_UP_AXIS: &str = "Y";

/// Magic bytes at the start of a binary USD crate file (`.usdc`).
pub const USDC_MAGIC: &[u8] = b"PXR-USDC";

/// Magic bytes at the start of a ZIP archive, and therefore of a `.usdz`.
pub const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Header every text layer (`.usda`) must start with.
pub const USDA_HEADER: &str = "#usda";

/// File extensions accepted as a root layer inside a USDZ archive.
pub const USDZ_LAYER_EXTENSIONS: &[&str] = &["usda", "usd", "usdc"];

/// Maximum accepted input file size in bytes.
///
/// # Example
///
/// ```rust
/// use config::constants::MAX_FILE_SIZE;
///
/// let file_size = 1024;
/// assert!(file_size <= MAX_FILE_SIZE);
/// ```
pub const MAX_FILE_SIZE: usize = 256 * 1024 * 1024;

// =============================================================================
// LIMIT CONSTANTS
// =============================================================================

/// Maximum nesting of prims and values the text parser accepts.
///
/// Deeper input is rejected with a parse error instead of exhausting the
/// stack.
///
/// # Example
///
/// ```rust
/// use config::constants::MAX_NESTING_DEPTH;
///
/// let scene_depth = 12;
/// assert!(scene_depth < MAX_NESTING_DEPTH);
/// ```
pub const MAX_NESTING_DEPTH: usize = 512;

/// Remaining stack below which the parser switches to a fresh segment.
pub const STACKER_RED_ZONE_BYTES: usize = 64 * 1024;

/// Size of each stack segment allocated by `stacker` during parsing.
pub const STACKER_STACK_SIZE_BYTES: usize = 2 * 1024 * 1024;

// =============================================================================
// REMOTE CONSTANTS
// =============================================================================

/// Environment variable holding the Speckle API bearer token.
pub const API_TOKEN_ENV_VAR: &str = "SPECKLE_API_TOKEN";

/// Speckle server the importer uploads to.
pub const DEFAULT_SERVER_URL: &str = "https://app.speckle.systems";

/// Stream (project) receiving the commits.
pub const DEFAULT_STREAM_ID: &str = "0cbda26868";

/// Branch (model) receiving the commits.
pub const DEFAULT_BRANCH_NAME: &str = "main";

/// Commit message for scene imports.
pub const IMPORT_COMMIT_MESSAGE: &str = "Imported from USDZ file";

/// Commit message for the demo box upload.
pub const DEMO_COMMIT_MESSAGE: &str = "Demo box";

/// Source application recorded on every commit.
pub const SOURCE_APPLICATION: &str = "usd-to-speckle";

/// Container key under which the meshes are stored.
pub const CONTAINER_KEY: &str = "Custom Elements";

/// HTTP request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// SERIALIZATION CONSTANTS
// =============================================================================

/// Number of hex characters kept from the SHA-256 digest as an object id.
pub const OBJECT_ID_LENGTH: usize = 32;

/// `speckle_type` of the container object.
pub const BASE_SPECKLE_TYPE: &str = "Base";

/// `speckle_type` of mesh objects.
pub const MESH_SPECKLE_TYPE: &str = "Objects.Geometry.Mesh";

/// `speckle_type` of a detached-object reference.
pub const REFERENCE_SPECKLE_TYPE: &str = "reference";

/// Length units written on every mesh.
pub const MESH_UNITS: &str = "m";

/// Upper bound on the serialized size of one upload batch.
///
/// Objects are grouped into multipart batches no larger than this. A single
/// object bigger than the limit is sent in a batch of its own.
pub const MAX_BATCH_BYTES: usize = 1024 * 1024;
