use futures::future::LocalBoxFuture;

use crate::error::MeshLoadError;
use crate::scene::{MaterialLibrary, SceneNode};

/// Subtree produced by a loader, with the materials its primitives use.
#[derive(Debug, Clone)]
pub struct LoadedMesh {
    pub root: SceneNode,
    pub materials: MaterialLibrary,
}

pub type MeshLoadFuture = LocalBoxFuture<'static, Result<LoadedMesh, MeshLoadError>>;

/// Asynchronous model loader
pub trait MeshLoader {
    /// Start loading `uri`. The returned future resolves at most once and
    /// has no timeout.
    fn load(&self, uri: &str) -> MeshLoadFuture;
}
