use glam::{Vec2, Vec3};
use murex_common::NodeId;
use murex_scene::{Scene, SceneError};
use serde::{Deserialize, Serialize};

use crate::pointer::PointerEvent;

/// Tunables for [`ObjectControls`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Radians applied per pointer-move step.
    pub rotation_speed: f32,
    pub horizontal_rotation: bool,
    pub vertical_rotation: bool,
    /// Limit on |rotation.x| when vertical rotation is enabled.
    pub max_vertical_angle: Option<f32>,
    pub zoom: bool,
    /// Camera units moved per wheel step.
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            rotation_speed: 0.05,
            horizontal_rotation: true,
            vertical_rotation: false,
            max_vertical_angle: None,
            zoom: true,
            zoom_speed: 1.0,
            min_distance: 0.1,
            max_distance: 1000.0,
        }
    }
}

/// Drag-to-rotate adapter bound to one scene node.
///
/// Each pointer move during a drag steps the target's rotation by
/// `rotation_speed` in the direction of motion: horizontal motion about
/// y, vertical motion about x.
#[derive(Debug, Clone)]
pub struct ObjectControls {
    target: NodeId,
    config: ControlsConfig,
    dragging: bool,
    last_pointer: Option<Vec2>,
}

impl ObjectControls {
    pub fn new(target: NodeId) -> Self {
        Self::with_config(target, ControlsConfig::default())
    }

    pub fn with_config(target: NodeId, config: ControlsConfig) -> Self {
        Self {
            target,
            config,
            dragging: false,
            last_pointer: None,
        }
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn config(&self) -> &ControlsConfig {
        &self.config
    }

    pub fn enable_vertical_rotation(&mut self) {
        self.config.vertical_rotation = true;
    }

    pub fn disable_vertical_rotation(&mut self) {
        self.config.vertical_rotation = false;
    }

    pub fn enable_horizontal_rotation(&mut self) {
        self.config.horizontal_rotation = true;
    }

    pub fn disable_horizontal_rotation(&mut self) {
        self.config.horizontal_rotation = false;
    }

    pub fn enable_zoom(&mut self) {
        self.config.zoom = true;
    }

    pub fn disable_zoom(&mut self) {
        self.config.zoom = false;
    }

    pub fn set_rotation_speed(&mut self, speed: f32) {
        self.config.rotation_speed = speed;
    }

    pub fn set_max_vertical_rotation_angle(&mut self, angle: Option<f32>) {
        self.config.max_vertical_angle = angle;
    }

    pub fn set_distance(&mut self, min: f32, max: f32) {
        self.config.min_distance = min.min(max);
        self.config.max_distance = max.max(min);
    }

    /// True between a pointer down and the matching up/leave.
    pub fn is_user_interaction_active(&self) -> bool {
        self.dragging
    }

    /// Apply one pointer event. Returns whether the target or camera moved.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        scene: &mut Scene,
        camera_position: &mut Vec3,
    ) -> Result<bool, SceneError> {
        match event {
            PointerEvent::Down(p) => {
                self.dragging = true;
                self.last_pointer = Some(p);
                tracing::trace!(node = %self.target.short(), "drag started");
                Ok(false)
            }
            PointerEvent::Up | PointerEvent::Leave => {
                if self.dragging {
                    tracing::trace!(node = %self.target.short(), "drag ended");
                }
                self.dragging = false;
                self.last_pointer = None;
                Ok(false)
            }
            PointerEvent::Move(p) => {
                let Some(last) = self.last_pointer.filter(|_| self.dragging) else {
                    return Ok(false);
                };
                self.last_pointer = Some(p);
                self.rotate(p - last, scene)
            }
            PointerEvent::Wheel(delta) => Ok(self.zoom(delta, camera_position)),
        }
    }

    fn rotate(&self, delta: Vec2, scene: &mut Scene) -> Result<bool, SceneError> {
        let speed = self.config.rotation_speed;
        let rotation = &mut scene.transform_mut(self.target)?.rotation;
        let before = *rotation;

        if self.config.horizontal_rotation && delta.x != 0.0 {
            rotation.y += delta.x.signum() * speed;
        }
        if self.config.vertical_rotation && delta.y != 0.0 {
            rotation.x += delta.y.signum() * speed;
            if let Some(limit) = self.config.max_vertical_angle {
                rotation.x = rotation.x.clamp(-limit, limit);
            }
        }
        Ok(*rotation != before)
    }

    fn zoom(&self, delta: f32, camera_position: &mut Vec3) -> bool {
        if !self.config.zoom || delta == 0.0 {
            return false;
        }
        let before = camera_position.z;
        camera_position.z = (before + delta.signum() * self.config.zoom_speed)
            .clamp(self.config.min_distance, self.config.max_distance);
        camera_position.z != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murex_common::Transform;
    use murex_scene::NodeKind;

    fn setup() -> (Scene, NodeId, Vec3) {
        let mut scene = Scene::new();
        let id = scene
            .add(None, "shell", Transform::default(), NodeKind::Group)
            .unwrap();
        (scene, id, Vec3::new(0.0, 0.0, 160.0))
    }

    fn rotation(scene: &Scene, id: NodeId) -> Vec3 {
        scene.get(id).unwrap().transform.rotation
    }

    #[test]
    fn drag_sets_interaction_flag() {
        let (mut scene, id, mut cam) = setup();
        let mut controls = ObjectControls::new(id);
        assert!(!controls.is_user_interaction_active());

        controls
            .handle(PointerEvent::Down(Vec2::ZERO), &mut scene, &mut cam)
            .unwrap();
        assert!(controls.is_user_interaction_active());

        controls.handle(PointerEvent::Up, &mut scene, &mut cam).unwrap();
        assert!(!controls.is_user_interaction_active());

        controls
            .handle(PointerEvent::Down(Vec2::ZERO), &mut scene, &mut cam)
            .unwrap();
        controls.handle(PointerEvent::Leave, &mut scene, &mut cam).unwrap();
        assert!(!controls.is_user_interaction_active());
    }

    #[test]
    fn horizontal_drag_rotates_about_y() {
        let (mut scene, id, mut cam) = setup();
        let mut controls = ObjectControls::new(id);
        controls
            .handle(PointerEvent::Down(Vec2::new(10.0, 10.0)), &mut scene, &mut cam)
            .unwrap();
        let moved = controls
            .handle(PointerEvent::Move(Vec2::new(30.0, 40.0)), &mut scene, &mut cam)
            .unwrap();
        assert!(moved);
        let r = rotation(&scene, id);
        assert_eq!(r.y, 0.05);
        // Vertical rotation is off by default.
        assert_eq!(r.x, 0.0);
    }

    #[test]
    fn vertical_rotation_when_enabled_and_clamped() {
        let (mut scene, id, mut cam) = setup();
        let mut controls = ObjectControls::new(id);
        controls.enable_vertical_rotation();
        controls.set_max_vertical_rotation_angle(Some(0.08));
        controls
            .handle(PointerEvent::Down(Vec2::ZERO), &mut scene, &mut cam)
            .unwrap();
        for y in 1..=3 {
            controls
                .handle(PointerEvent::Move(Vec2::new(0.0, y as f32)), &mut scene, &mut cam)
                .unwrap();
        }
        let r = rotation(&scene, id);
        assert_eq!(r.x, 0.08);
        assert_eq!(r.y, 0.0);
    }

    #[test]
    fn move_without_drag_is_ignored() {
        let (mut scene, id, mut cam) = setup();
        let mut controls = ObjectControls::new(id);
        let moved = controls
            .handle(PointerEvent::Move(Vec2::new(50.0, 0.0)), &mut scene, &mut cam)
            .unwrap();
        assert!(!moved);
        assert_eq!(rotation(&scene, id), Vec3::ZERO);
    }

    #[test]
    fn zoom_disabled_ignores_wheel() {
        let (mut scene, id, mut cam) = setup();
        let mut controls = ObjectControls::new(id);
        controls.disable_zoom();
        assert!(!controls
            .handle(PointerEvent::Wheel(3.0), &mut scene, &mut cam)
            .unwrap());
        assert_eq!(cam.z, 160.0);
    }

    #[test]
    fn zoom_clamps_to_distance_range() {
        let (mut scene, id, mut cam) = setup();
        let mut controls = ObjectControls::new(id);
        controls.set_distance(100.0, 161.0);
        controls
            .handle(PointerEvent::Wheel(1.0), &mut scene, &mut cam)
            .unwrap();
        controls
            .handle(PointerEvent::Wheel(1.0), &mut scene, &mut cam)
            .unwrap();
        assert_eq!(cam.z, 161.0);
        controls
            .handle(PointerEvent::Wheel(-1.0), &mut scene, &mut cam)
            .unwrap();
        assert_eq!(cam.z, 160.0);
    }

    #[test]
    fn missing_target_is_reported() {
        let (mut scene, _, mut cam) = setup();
        let ghost = NodeId::new();
        let mut controls = ObjectControls::new(ghost);
        controls
            .handle(PointerEvent::Down(Vec2::ZERO), &mut scene, &mut cam)
            .unwrap();
        let err = controls
            .handle(PointerEvent::Move(Vec2::ONE), &mut scene, &mut cam)
            .unwrap_err();
        assert_eq!(err, SceneError::NodeNotFound(ghost));
    }
}
