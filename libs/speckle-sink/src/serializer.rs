//! # Object Serializer
//!
//! Turns a [`Container`] into content-addressed Speckle objects.
//!
//! Every mesh becomes a detached object. The container becomes a `Base`
//! object whose keys hold references to those children. An object's id is
//! the truncated SHA-256 of its JSON without the `id` field; `serde_json`
//! maps are sorted, so the bytes hashed are canonical.
//!
//! ```text
//! Container { "Elements": [m0, m1, m0] }
//!     → Mesh(id a), Mesh(id b), Base { Elements: [ref a, ref b, ref a],
//!                                      __closure: { a: 1, b: 1 } }
//! ```

use config::constants::{
    BASE_SPECKLE_TYPE, MESH_SPECKLE_TYPE, MESH_UNITS, OBJECT_ID_LENGTH, REFERENCE_SPECKLE_TYPE,
};
use cube_mesh::{Container, Mesh};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Depth of a mesh below the container in the closure table.
const CHILD_DEPTH: u64 = 1;

/// A serialized object with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeckleObject {
    /// Content hash.
    pub id: String,
    /// Full JSON, `id` included.
    pub value: Value,
}

/// All objects of one container, children first and the root last.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedContainer {
    objects: Vec<SpeckleObject>,
}

impl SerializedContainer {
    /// Id of the container object.
    pub fn root_id(&self) -> &str {
        &self.root().id
    }

    /// The container object.
    pub fn root(&self) -> &SpeckleObject {
        // `serialize_container` always pushes the root last.
        &self.objects[self.objects.len() - 1]
    }

    /// Every object, unique by id.
    pub fn objects(&self) -> &[SpeckleObject] {
        &self.objects
    }

    /// Number of distinct children of the root.
    pub fn children_count(&self) -> usize {
        self.objects.len() - 1
    }

    /// Ids of every object in upload order.
    pub fn ids(&self) -> Vec<&str> {
        self.objects.iter().map(|o| o.id.as_str()).collect()
    }
}

/// Id of a JSON object: the first hex characters of the SHA-256 of its
/// compact encoding.
pub fn object_id(value: &Value) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(value)?;
    let digest = Sha256::digest(&bytes);

    let mut id = String::with_capacity(OBJECT_ID_LENGTH);
    for byte in digest.iter() {
        // Writing into a String cannot fail.
        let _ = write!(id, "{byte:02x}");
    }
    id.truncate(OBJECT_ID_LENGTH);
    Ok(id)
}

/// Attach an id to `fields`, hashing them first.
fn finish_object(mut fields: Map<String, Value>) -> Result<SpeckleObject, serde_json::Error> {
    fields.remove("id");
    let body = Value::Object(fields);
    let id = object_id(&body)?;

    let mut value = body;
    if let Value::Object(map) = &mut value {
        map.insert("id".to_string(), Value::String(id.clone()));
    }
    Ok(SpeckleObject { id, value })
}

/// Serialize one mesh as a detached `Objects.Geometry.Mesh`.
pub fn mesh_object(mesh: &Mesh) -> Result<SpeckleObject, serde_json::Error> {
    let mut fields = Map::new();
    fields.insert("vertices".into(), json!(mesh.vertices()));
    fields.insert("faces".into(), json!(mesh.faces()));
    if let Some(label) = mesh.type_label() {
        fields.insert("type".into(), json!(label));
    }
    fields.insert("speckle_type".into(), json!(MESH_SPECKLE_TYPE));
    fields.insert("units".into(), json!(MESH_UNITS));
    fields.insert("colors".into(), json!([]));
    fields.insert("textureCoordinates".into(), json!([]));
    fields.insert("totalChildrenCount".into(), json!(0));

    finish_object(fields)
}

/// Serialize a container and its meshes.
///
/// Identical meshes are stored once and referenced from every slot they
/// occupy. An empty container still yields a root object.
///
/// # Example
///
/// ```rust
/// use cube_mesh::{demo_box_mesh, Container};
/// use speckle_sink::serialize_container;
///
/// let mesh = demo_box_mesh(1.0).unwrap();
/// let container = Container::with_meshes("Elements", vec![mesh.clone(), mesh]);
/// let serialized = serialize_container(&container).unwrap();
/// assert_eq!(serialized.children_count(), 1);
/// ```
pub fn serialize_container(container: &Container) -> Result<SerializedContainer, serde_json::Error> {
    let mut objects: Vec<SpeckleObject> = Vec::new();
    let mut closure: BTreeMap<String, u64> = BTreeMap::new();
    let mut root = Map::new();

    for (key, meshes) in container.iter() {
        let mut references = Vec::with_capacity(meshes.len());
        for mesh in meshes {
            let child = mesh_object(mesh)?;
            references.push(json!({
                "referencedId": child.id,
                "speckle_type": REFERENCE_SPECKLE_TYPE,
            }));
            if closure.insert(child.id.clone(), CHILD_DEPTH).is_none() {
                objects.push(child);
            }
        }
        root.insert(key.to_string(), Value::Array(references));
    }

    root.insert("speckle_type".into(), json!(BASE_SPECKLE_TYPE));
    root.insert("totalChildrenCount".into(), json!(closure.len()));
    root.insert("__closure".into(), json!(closure));

    let root = finish_object(root)?;
    log::debug!(
        "serialized container {} with {} children",
        root.id,
        objects.len()
    );
    objects.push(root);

    Ok(SerializedContainer { objects })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cube_mesh::{assemble_mesh, canonicalize, demo_box_mesh, CubeCorners};

    fn labelled(label: &str) -> Mesh {
        assemble_mesh(&canonicalize(&CubeCorners::unit()).unwrap(), Some(label.to_string()))
    }

    #[test]
    fn test_object_id_is_truncated_hex() {
        let id = object_id(&json!({"a": 1})).unwrap();
        assert_eq!(id.len(), OBJECT_ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_object_id_ignores_key_order() {
        let a = object_id(&json!({"x": 1, "y": [1, 2]})).unwrap();
        let b = object_id(&json!({"y": [1, 2], "x": 1})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_mesh_object_fields() {
        let object = mesh_object(&labelled("wall")).unwrap();
        let value = &object.value;
        assert_eq!(value["speckle_type"], MESH_SPECKLE_TYPE);
        assert_eq!(value["units"], "m");
        assert_eq!(value["type"], "wall");
        assert_eq!(value["vertices"].as_array().unwrap().len(), 24);
        assert_eq!(value["faces"].as_array().unwrap().len(), 30);
        assert_eq!(value["id"], object.id.as_str());
    }

    #[test]
    fn test_untyped_mesh_has_no_type_field() {
        let mesh = demo_box_mesh(1.0).unwrap();
        let object = mesh_object(&mesh).unwrap();
        let fields = object.value.as_object().unwrap();

        assert!(!fields.contains_key("type"));
        assert_eq!(fields["vertices"], json!(mesh.vertices()));
        assert_eq!(fields["faces"], json!(mesh.faces()));
        let mut keys: Vec<_> = fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "colors",
                "faces",
                "id",
                "speckle_type",
                "textureCoordinates",
                "totalChildrenCount",
                "units",
                "vertices"
            ]
        );
    }

    #[test]
    fn test_id_excludes_id_field() {
        let object = mesh_object(&labelled("wall")).unwrap();
        let mut without_id = object.value.clone();
        without_id.as_object_mut().unwrap().remove("id");
        assert_eq!(object_id(&without_id).unwrap(), object.id);
    }

    #[test]
    fn test_label_changes_id() {
        let wall = mesh_object(&labelled("wall")).unwrap();
        let door = mesh_object(&labelled("door")).unwrap();
        assert_ne!(wall.id, door.id);
    }

    #[test]
    fn test_container_references_and_closure() {
        let container =
            Container::with_meshes("Elements", vec![labelled("wall"), labelled("door"), labelled("wall")]);
        let serialized = serialize_container(&container).unwrap();

        assert_eq!(serialized.children_count(), 2);
        assert_eq!(serialized.objects().len(), 3);

        let root = &serialized.root().value;
        let references = root["Elements"].as_array().unwrap();
        assert_eq!(references.len(), 3);
        assert_eq!(references[0], references[2]);
        assert_eq!(references[0]["speckle_type"], "reference");
        assert_eq!(root["totalChildrenCount"], 2);
        assert_eq!(root["__closure"].as_object().unwrap().len(), 2);
        assert_eq!(serialized.ids().last().copied(), Some(serialized.root_id()));
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let container = Container::with_meshes("Elements", vec![demo_box_mesh(2.0).unwrap()]);
        let a = serialize_container(&container).unwrap();
        let b = serialize_container(&container.clone()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_container_has_root_only() {
        let serialized = serialize_container(&Container::with_meshes("Elements", Vec::new())).unwrap();
        assert_eq!(serialized.children_count(), 0);
        assert_eq!(serialized.root().value["Elements"], json!([]));
        assert_eq!(serialized.root().value["speckle_type"], "Base");
    }
}
