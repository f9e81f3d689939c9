use std::path::{Path, PathBuf};

use murex_assets::LoaderConfig;
use murex_common::Viewport;
use murex_input::ControlsConfig;
use murex_render::post::DotScreenSettings;
use serde::{Deserialize, Serialize};

use crate::error::ViewerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Camera z position; it looks down -Z at the origin.
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            distance: 160.0,
        }
    }
}

/// Radians added to the mesh rotation per tick while nobody drags it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleRotation {
    pub x: f32,
    pub y: f32,
}

impl Default for IdleRotation {
    fn default() -> Self {
        Self { x: 0.015, y: 0.004 }
    }
}

/// Viewer configuration. Every field has a default, so a YAML file only
/// needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub asset_path: PathBuf,
    pub decoder_path: PathBuf,
    pub viewport: ViewportSize,
    pub camera: CameraConfig,
    pub idle_rotation: IdleRotation,
    pub dot_screen: DotScreenSettings,
    /// Vertical rotation and zoom are forced on and off when the mesh
    /// loads; the remaining fields apply as given.
    pub controls: ControlsConfig,
    /// sRGB hex color of the shared material.
    pub material_color: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_path: PathBuf::from("public/Murex_Romosus.gltf"),
            decoder_path: PathBuf::from("/draco/gltf/"),
            viewport: ViewportSize::default(),
            camera: CameraConfig::default(),
            idle_rotation: IdleRotation::default(),
            dot_screen: DotScreenSettings::default(),
            controls: ControlsConfig {
                vertical_rotation: true,
                zoom: false,
                ..ControlsConfig::default()
            },
            material_color: 0xffffff,
        }
    }
}

impl ViewerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ViewerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ViewerError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text)?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ViewerError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml(&self) -> Result<String, ViewerError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn viewport(&self) -> Result<Viewport, ViewerError> {
        Ok(Viewport::new(self.viewport.width, self.viewport.height)?)
    }

    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            decoder_path: self.decoder_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_scene() {
        let c = ViewerConfig::default();
        assert_eq!(c.camera.fov_degrees, 75.0);
        assert_eq!(c.camera.distance, 160.0);
        assert_eq!(c.idle_rotation, IdleRotation { x: 0.015, y: 0.004 });
        assert_eq!(c.dot_screen.spacing, 8.5);
        assert_eq!(c.dot_screen.size, 10.0);
        assert!(c.controls.vertical_rotation);
        assert!(!c.controls.zoom);
        assert_eq!(c.loader_config().decoder_path, PathBuf::from("/draco/gltf/"));
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = "viewport:\n  width: 640\ndot_screen:\n  spacing: 4.0\n";
        let c = ViewerConfig::from_yaml(yaml).unwrap();
        assert_eq!(c.viewport.width, 640);
        assert_eq!(c.viewport.height, 720);
        assert_eq!(c.dot_screen.spacing, 4.0);
        assert_eq!(c.dot_screen.size, 10.0);
        assert_eq!(c.camera, CameraConfig::default());
    }

    #[test]
    fn yaml_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.yaml");
        let mut config = ViewerConfig::default();
        config.material_color = 0xff8800;
        std::fs::write(&path, config.to_yaml().unwrap()).unwrap();
        assert_eq!(ViewerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_and_bad_yaml_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ViewerConfig::load(dir.path().join("nope.yaml")),
            Err(ViewerError::ConfigIo { .. })
        ));
        assert!(matches!(
            ViewerConfig::from_yaml("viewport: [1, 2"),
            Err(ViewerError::Config(_))
        ));
    }

    #[test]
    fn zero_viewport_is_rejected() {
        let mut c = ViewerConfig::default();
        c.viewport.height = 0;
        assert!(matches!(c.viewport(), Err(ViewerError::Viewport(_))));
    }
}
