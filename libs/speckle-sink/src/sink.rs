//! # Mesh Sink
//!
//! The boundary between mesh building and whatever stores the result.

use crate::error::SinkError;
use cube_mesh::Container;

/// Ids returned by a successful [`MeshSink::publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Root object id of the sent container.
    pub object_id: String,
    /// Id of the commit pointing at it.
    pub commit_id: String,
}

/// Destination for mesh containers.
///
/// Implementations are content addressed: sending the same container twice
/// yields the same object id.
pub trait MeshSink {
    /// Serialize and store `container`, returning its root object id.
    fn send(&mut self, container: &Container) -> Result<String, SinkError>;

    /// Record a commit referencing `object_id`, returning the commit id.
    fn commit(&mut self, object_id: &str, message: &str) -> Result<String, SinkError>;

    /// Send then commit.
    fn publish(&mut self, container: &Container, message: &str) -> Result<Receipt, SinkError> {
        let object_id = self.send(container)?;
        log::info!("sent container as object {object_id}");
        let commit_id = self.commit(&object_id, message)?;
        log::info!("created commit {commit_id}");
        Ok(Receipt {
            object_id,
            commit_id,
        })
    }
}

impl<S: MeshSink + ?Sized> MeshSink for &mut S {
    fn send(&mut self, container: &Container) -> Result<String, SinkError> {
        (**self).send(container)
    }

    fn commit(&mut self, object_id: &str, message: &str) -> Result<String, SinkError> {
        (**self).commit(object_id, message)
    }
}
