//! # USD to Speckle
//!
//! One import run: credentials, scene, meshes, upload, commit.
//!
//! ```text
//! credentials ──► connect ──► Stage::open ──► extract_cubes ──► meshes_from_cubes
//!                                                 │
//!                       MeshSink::publish ◄── Container { "Custom Elements": [...] }
//! ```
//!
//! Every step runs in sequence and the first failure ends the run.

use config::constants::{
    CONTAINER_KEY, DEMO_BOX_HALF_EXTENT, DEMO_COMMIT_MESSAGE, IMPORT_COMMIT_MESSAGE,
};
use cube_mesh::{demo_box_mesh, extract_cubes, meshes_from_cubes, Container, MeshError};
use speckle_sink::{ConfigError, Credentials, MeshSink, Receipt, SinkError};
use std::path::Path;
use thiserror::Error;
use usd_scene::{SceneError, Stage};

/// Label used for the demo box in shape errors.
const DEMO_BOX_PATH: &str = "<demo box>";

/// Why a run stopped.
#[derive(Debug, Error)]
pub enum RunError {
    /// Credentials are missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The input could not be read or parsed.
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    /// A cube's corners could not be ordered.
    #[error("shape error: {0}")]
    Shape(#[from] MeshError),

    /// The sink failed.
    #[error("remote error: {0}")]
    Remote(#[from] SinkError),
}

/// Build the container holding a mesh for every cube on `stage`.
pub fn build_container(stage: &Stage) -> Result<Container, MeshError> {
    let cubes = extract_cubes(stage);
    let meshes = meshes_from_cubes(&cubes)?;
    log::info!("built {} cube meshes", meshes.len());
    Ok(Container::with_meshes(CONTAINER_KEY, meshes))
}

/// Check credentials and open the sink.
///
/// Nothing else is touched when the credentials are unusable.
pub fn connect_sink<S, F>(
    credentials: Result<Credentials, ConfigError>,
    connect: F,
) -> Result<S, RunError>
where
    S: MeshSink,
    F: FnOnce(Credentials) -> Result<S, SinkError>,
{
    let credentials = credentials?;
    Ok(connect(credentials)?)
}

/// Import every cube of the scene at `input` and commit it.
///
/// An input without cubes still publishes an empty container.
pub fn import_scene<S: MeshSink>(input: &Path, sink: &mut S) -> Result<Receipt, RunError> {
    log::info!("opening {}", input.display());
    let stage = Stage::open(input)?;
    let container = build_container(&stage)?;
    Ok(sink.publish(&container, IMPORT_COMMIT_MESSAGE)?)
}

/// Publish the untyped demo box.
pub fn publish_demo_box<S: MeshSink>(sink: &mut S) -> Result<Receipt, RunError> {
    let mesh = demo_box_mesh(DEMO_BOX_HALF_EXTENT)
        .map_err(|source| MeshError::shape(DEMO_BOX_PATH, source))?;
    let container = Container::with_meshes(CONTAINER_KEY, vec![mesh]);
    Ok(sink.publish(&container, DEMO_COMMIT_MESSAGE)?)
}

/// Credentials, then connection, then import.
pub fn run_import<S, F>(
    input: &Path,
    credentials: Result<Credentials, ConfigError>,
    connect: F,
) -> Result<Receipt, RunError>
where
    S: MeshSink,
    F: FnOnce(Credentials) -> Result<S, SinkError>,
{
    let mut sink = connect_sink(credentials, connect)?;
    import_scene(input, &mut sink)
}

// =============================================================================
// TESTS
// =============================================================================
