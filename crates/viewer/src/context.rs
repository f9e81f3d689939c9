use std::sync::Arc;

use glam::Vec3;
use murex_assets::{GltfLoader, LoadError, LoadTask, LoadedAsset};
use murex_common::{Color, NodeId, PhongMaterial, Transform, Viewport};
use murex_input::{ObjectControls, PointerEvent};
use murex_render::PerspectiveCamera;
use murex_render::post::{Composer, stylization_chain};
use murex_scene::{AmbientLight, Light, NodeKind, PointLight, Scene};

use crate::config::ViewerConfig;
use crate::error::ViewerError;

const LIGHT_POSITION: Vec3 = Vec3::new(100.0, 150.0, 0.0);

/// Everything one viewer instance owns: scene, camera, post chain, the
/// shared material, the loaded mesh and its controls, and the pending load.
pub struct AppContext {
    config: ViewerConfig,
    viewport: Viewport,
    scene: Scene,
    camera: PerspectiveCamera,
    composer: Composer,
    material: Arc<PhongMaterial>,
    mesh: Option<NodeId>,
    controls: Option<ObjectControls>,
    pending: Option<LoadTask>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("viewport", &self.viewport)
            .field("nodes", &self.scene.node_count())
            .field("mesh", &self.mesh)
            .field("loading", &self.pending.is_some())
            .finish()
    }
}

fn build_scene() -> Result<Scene, ViewerError> {
    let mut scene = Scene::new();
    scene.add(
        None,
        "ambient-light",
        Transform::default(),
        NodeKind::Light(Light::Ambient(AmbientLight {
            color: Color::WHITE,
            intensity: 0.2,
        })),
    )?;
    scene.add(
        None,
        "key-light",
        Transform::from_position(LIGHT_POSITION),
        NodeKind::Light(Light::Point(PointLight {
            color: Color::WHITE,
            intensity: 3.0,
            distance: 0.0,
            decay: 0.0,
        })),
    )?;
    scene.add(
        None,
        "fill-light",
        Transform::from_position(LIGHT_POSITION),
        NodeKind::Light(Light::Point(PointLight {
            color: Color::WHITE,
            intensity: 20.0,
            distance: 0.0,
            decay: 0.8,
        })),
    )?;
    Ok(scene)
}

impl AppContext {
    pub fn new(config: ViewerConfig) -> Result<Self, ViewerError> {
        let viewport = config.viewport()?;
        let scene = build_scene()?;

        let cam = config.camera;
        let mut camera = PerspectiveCamera::new(cam.fov_degrees, viewport.aspect(), cam.near, cam.far);
        camera.position = Vec3::new(0.0, 0.0, cam.distance);

        let composer = stylization_chain(viewport, config.dot_screen)?;
        let material = Arc::new(PhongMaterial::with_color(Color::from_srgb_hex(
            config.material_color,
        )));

        tracing::info!(
            width = viewport.width(),
            height = viewport.height(),
            "viewer context ready"
        );
        Ok(Self {
            config,
            viewport,
            scene,
            camera,
            composer,
            material,
            mesh: None,
            controls: None,
            pending: None,
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn material(&self) -> &Arc<PhongMaterial> {
        &self.material
    }

    /// The attached mesh, once a load has succeeded.
    pub fn mesh(&self) -> Option<NodeId> {
        self.mesh
    }

    pub fn controls(&self) -> Option<&ObjectControls> {
        self.controls.as_ref()
    }

    /// Split borrow for presenters: the scene and camera to draw, and the
    /// composer to draw them through.
    pub fn frame_parts(&mut self) -> (&Scene, &PerspectiveCamera, &mut Composer) {
        (&self.scene, &self.camera, &mut self.composer)
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// True while the controls report an active drag. False without a mesh.
    pub fn is_interacting(&self) -> bool {
        self.controls
            .as_ref()
            .is_some_and(ObjectControls::is_user_interaction_active)
    }

    /// Start loading the configured asset in the background.
    pub fn start_load(&mut self) {
        let loader = GltfLoader::new(self.config.loader_config());
        let task = loader.load(&self.config.asset_path);
        self.track_load(task);
    }

    /// Track `task` as the pending load, cancelling any earlier one.
    pub fn track_load(&mut self, task: LoadTask) {
        if let Some(previous) = self.pending.replace(task) {
            previous.cancel();
        }
    }

    pub fn cancel_load(&mut self) {
        if let Some(task) = self.pending.take() {
            task.cancel();
        }
    }

    /// Poll the pending load and run the continuation if it resolved.
    /// Returns the continuation's outcome on the tick it resolves.
    pub fn poll_load(&mut self) -> Option<Result<NodeId, LoadError>> {
        let result = self.pending.as_mut()?.poll()?;
        self.pending = None;
        Some(self.on_asset_loaded(result))
    }

    /// Load continuation. On success the asset's first root child is
    /// attached with the shared material and wrapped in controls. On any
    /// failure the scene is left as it was.
    pub fn on_asset_loaded(
        &mut self,
        result: Result<LoadedAsset, LoadError>,
    ) -> Result<NodeId, LoadError> {
        let mut asset = result.inspect_err(|e| tracing::warn!("asset load failed: {e}"))?;
        let vertices = asset.vertex_count();
        let tree = asset
            .take_first_child()
            .inspect_err(|e| tracing::warn!(asset = %asset.id, "asset has no usable node: {e}"))?;

        let id = self.scene.attach(None, tree)?;
        self.scene.assign_material(id, Arc::clone(&self.material))?;

        let mut controls = ObjectControls::with_config(id, self.config.controls);
        controls.enable_vertical_rotation();
        controls.disable_zoom();
        self.controls = Some(controls);
        self.mesh = Some(id);

        tracing::info!(
            asset = %asset.id,
            node = %id.short(),
            nodes = self.scene.node_count(),
            vertices,
            "asset attached"
        );
        Ok(id)
    }

    /// Forward a pointer event to the controls. Ignored until a mesh loads.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<bool, ViewerError> {
        let Some(controls) = self.controls.as_mut() else {
            return Ok(false);
        };
        Ok(controls.handle(event, &mut self.scene, &mut self.camera.position)?)
    }

    /// New viewport: camera aspect and projection, then post targets.
    pub(crate) fn apply_viewport(&mut self, viewport: Viewport) -> Result<(), ViewerError> {
        self.camera.set_aspect(viewport.aspect());
        self.camera.update_projection_matrix();
        self.composer.set_size(viewport)?;
        self.viewport = viewport;
        Ok(())
    }
}
