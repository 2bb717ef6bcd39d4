//! # Memory Sink
//!
//! In-process content-addressed store. Backs tests and dry runs.

use crate::error::SinkError;
use crate::serializer::{object_id, serialize_container};
use crate::sink::MeshSink;
use cube_mesh::Container;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Length of the commit ids handed out.
const COMMIT_ID_LENGTH: usize = 10;

/// A commit recorded by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Commit id.
    pub id: String,
    /// Referenced root object.
    pub object_id: String,
    /// Commit message.
    pub message: String,
}

/// Stores objects and commits in memory.
///
/// # Example
///
/// ```rust
/// use cube_mesh::{demo_box_mesh, Container};
/// use speckle_sink::{MemorySink, MeshSink};
///
/// let mut sink = MemorySink::new();
/// let container = Container::with_meshes("Elements", vec![demo_box_mesh(1.0).unwrap()]);
/// let receipt = sink.publish(&container, "Demo box").unwrap();
/// assert!(sink.object(&receipt.object_id).is_some());
/// assert_eq!(sink.commits().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    objects: BTreeMap<String, Value>,
    commits: Vec<CommitRecord>,
    failure: Option<String>,
}

impl MemorySink {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every request with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Stored object by id.
    pub fn object(&self, id: &str) -> Option<&Value> {
        self.objects.get(id)
    }

    /// Number of stored objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Commits in creation order.
    pub fn commits(&self) -> &[CommitRecord] {
        &self.commits
    }

    fn check(&self) -> Result<(), SinkError> {
        match &self.failure {
            Some(reason) => Err(SinkError::Rejected(reason.clone())),
            None => Ok(()),
        }
    }
}

impl MeshSink for MemorySink {
    fn send(&mut self, container: &Container) -> Result<String, SinkError> {
        self.check()?;
        let serialized = serialize_container(container)?;
        let root_id = serialized.root_id().to_string();
        for object in serialized.objects() {
            self.objects
                .entry(object.id.clone())
                .or_insert_with(|| object.value.clone());
        }
        Ok(root_id)
    }

    fn commit(&mut self, object_id: &str, message: &str) -> Result<String, SinkError> {
        self.check()?;
        if !self.objects.contains_key(object_id) {
            return Err(SinkError::Rejected(format!("unknown object {object_id}")));
        }

        let mut id = commit_hash(object_id, message, self.commits.len())?;
        id.truncate(COMMIT_ID_LENGTH);
        self.commits.push(CommitRecord {
            id: id.clone(),
            object_id: object_id.to_string(),
            message: message.to_string(),
        });
        Ok(id)
    }
}

fn commit_hash(root: &str, message: &str, sequence: usize) -> Result<String, SinkError> {
    Ok(object_id(&json!({
        "objectId": root,
        "message": message,
        "sequence": sequence,
    }))?)
}

// =============================================================================
// TESTS
// =============================================================================
