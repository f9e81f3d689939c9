use murex_common::GeometryError;
use murex_scene::SceneError;
use std::path::PathBuf;

/// Errors from asset fetch and decode.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("mesh requires {extension}; no decoder available at {}", .decoder_path.display())]
    CompressedMesh {
        extension: String,
        decoder_path: PathBuf,
    },
    #[error("primitive in mesh {mesh:?} has no POSITION attribute")]
    MissingPositions { mesh: Option<String> },
    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
    #[error("load cancelled")]
    Cancelled,
    #[error("loader worker exited without a result")]
    WorkerLost,
}
