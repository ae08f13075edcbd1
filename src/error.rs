//! Error types for scene composition and mesh loading.

use thiserror::Error;

/// Failure of an asynchronous mesh load, carrying the requested URI.
#[derive(Error, Debug)]
pub enum MeshLoadError {
    /// The glTF importer rejected the file or one of its resources.
    #[error("Failed to import glTF '{uri}': {source}")]
    Import {
        uri: String,
        #[source]
        source: gltf::Error,
    },

    /// The document has no scene to take nodes from.
    #[error("glTF '{0}' contains no scene with nodes")]
    EmptyScene(String),

    /// The first child of the loaded subtree is not a drawable primitive.
    #[error("First child of '{0}' is not a mesh primitive")]
    MissingPrimitive(String),

    /// The background worker for the load could not be started.
    #[error("Failed to start loader worker for '{uri}': {source}")]
    Worker {
        uri: String,
        #[source]
        source: std::io::Error,
    },

    /// The loader went away before delivering a result.
    #[error("Mesh load for '{0}' was dropped before completing")]
    Dropped(String),
}

impl MeshLoadError {
    pub fn uri(&self) -> &str {
        match self {
            MeshLoadError::Import { uri, .. } | MeshLoadError::Worker { uri, .. } => uri,
            MeshLoadError::EmptyScene(uri)
            | MeshLoadError::MissingPrimitive(uri)
            | MeshLoadError::Dropped(uri) => uri,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColourError {
    #[error("Colour value {0:#x} is outside 0x000000..=0xffffff")]
    OutOfRange(u32),

    #[error("Cannot parse '{0}' as a #rrggbb colour")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Failed to schedule mesh load continuation: {0}")]
    Spawn(#[from] futures::task::SpawnError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_load_error_reports_uri() {
        let err = MeshLoadError::MissingPrimitive("static/skyscraper.glb".to_string());
        assert_eq!(err.uri(), "static/skyscraper.glb");
        assert!(err.to_string().contains("static/skyscraper.glb"));
    }

    #[test]
    fn test_worker_error_keeps_io_cause() {
        use std::error::Error as _;

        let err = MeshLoadError::Worker {
            uri: "tower.glb".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::OutOfMemory, "no threads left"),
        };

        assert_eq!(err.uri(), "tower.glb");
        assert!(err.to_string().contains("no threads left"));
        let cause = err.source().and_then(|s| s.downcast_ref::<std::io::Error>());
        assert_eq!(cause.map(|e| e.kind()), Some(std::io::ErrorKind::OutOfMemory));
    }
}
