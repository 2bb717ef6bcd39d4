//! # Speckle Sink
//!
//! Sends mesh containers to a Speckle server.
//!
//! ## Architecture
//!
//! ```text
//! Container → serialize_container (content-addressed objects)
//!           → MeshSink::send   (root object id)
//!           → MeshSink::commit (commit id)
//! ```
//!
//! [`ServerSink`] talks HTTP; [`MemorySink`] keeps everything in process.
//!
//! ## Example
//!
//! ```rust
//! use cube_mesh::{demo_box_mesh, Container};
//! use speckle_sink::{MemorySink, MeshSink};
//!
//! let container = Container::with_meshes("Elements", vec![demo_box_mesh(2.0).unwrap()]);
//! let receipt = MemorySink::new().publish(&container, "Demo box").unwrap();
//! assert_eq!(receipt.object_id.len(), 32);
//! ```

pub mod credentials;
pub mod error;
pub mod memory;
pub mod serializer;
pub mod server;
pub mod sink;

// Re-export public API
pub use credentials::{Credentials, SinkConfig};
pub use error::{ConfigError, SinkError};
pub use memory::{CommitRecord, MemorySink};
pub use serializer::{mesh_object, object_id, serialize_container, SerializedContainer, SpeckleObject};
pub use server::ServerSink;
pub use sink::{MeshSink, Receipt};
