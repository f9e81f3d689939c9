use std::path::PathBuf;

use murex_common::ViewportError;
use murex_render::post::PassError;
use murex_scene::SceneError;
use thiserror::Error;

/// Errors surfaced by the viewer to its host.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("invalid viewport: {0}")]
    Viewport(#[from] ViewportError),
    #[error("reading config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config: {0}")]
    Config(#[from] serde_yaml::Error),
    #[error(transparent)]
    Pass(#[from] PassError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("presenter: {0}")]
    Present(String),
}
