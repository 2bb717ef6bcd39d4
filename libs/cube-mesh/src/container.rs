//! # Container
//!
//! Key to mesh-list bag handed to a mesh sink.

use crate::mesh::Mesh;
use serde::Serialize;
use std::collections::BTreeMap;

/// Named lists of meshes.
///
/// No structural validation: any key, any number of meshes, including none.
///
/// # Example
///
/// ```rust
/// use cube_mesh::{demo_box_mesh, Container};
///
/// let container = Container::with_meshes("Elements", vec![demo_box_mesh(1.0).unwrap()]);
/// assert_eq!(container.mesh_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Container {
    entries: BTreeMap<String, Vec<Mesh>>,
}

impl Container {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a container holding `meshes` under `key`.
    pub fn with_meshes(key: impl Into<String>, meshes: Vec<Mesh>) -> Self {
        let mut container = Self::new();
        container.insert(key, meshes);
        container
    }

    /// Stores `meshes` under `key`, returning what was there before.
    pub fn insert(&mut self, key: impl Into<String>, meshes: Vec<Mesh>) -> Option<Vec<Mesh>> {
        self.entries.insert(key.into(), meshes)
    }

    /// Meshes stored under `key`.
    pub fn get(&self, key: &str) -> Option<&[Mesh]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Mesh])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total meshes across all keys.
    pub fn mesh_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

// =============================================================================
// TESTS
// =============================================================================
