use std::fmt::Write;

use murex_common::NodeId;
use murex_scene::{NodeKind, Scene};

use crate::camera::PerspectiveCamera;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads the scene and camera and writes into its target. It
/// never mutates the scene.
pub trait Renderer {
    /// What one frame is written into.
    type Target;

    /// Render one frame, overwriting the target's previous contents.
    fn render(&self, scene: &Scene, camera: &PerspectiveCamera, target: &mut Self::Target);
}

/// Human-readable dump of the scene tree.
///
/// Used by the CLI `inspect` command, logging, and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }

    fn write_node(scene: &Scene, id: NodeId, depth: usize, out: &mut String) {
        let Some(node) = scene.get(id) else {
            return;
        };
        let p = node.transform.position;
        let r = node.transform.rotation;
        let kind = match &node.kind {
            NodeKind::Group => "group".to_string(),
            NodeKind::Mesh(mesh) => format!(
                "mesh, {} verts, {} tris",
                mesh.geometry.vertex_count(),
                mesh.geometry.triangle_count()
            ),
            NodeKind::Light(_) => "light".to_string(),
        };
        let _ = writeln!(
            out,
            "{:indent$}[{}] {} ({kind}) pos=({:.2}, {:.2}, {:.2}) rot=({:.3}, {:.3}, {:.3})",
            "",
            id.short(),
            node.name,
            p.x,
            p.y,
            p.z,
            r.x,
            r.y,
            r.z,
            indent = 2 + depth * 2,
        );
        for child in node.children() {
            Self::write_node(scene, *child, depth + 1, out);
        }
    }
}

impl Renderer for DebugTextRenderer {
    type Target = String;

    fn render(&self, scene: &Scene, camera: &PerspectiveCamera, out: &mut String) {
        out.clear();
        let _ = writeln!(
            out,
            "=== Scene (nodes={}, meshes={}, lights={}) ===",
            scene.node_count(),
            scene.meshes().len(),
            scene.lights().len()
        );
        let eye = camera.position;
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.3}",
            eye.x,
            eye.y,
            eye.z,
            camera.fov_degrees(),
            camera.aspect()
        );
        if let Ok(roots) = scene.children(None) {
            for root in roots {
                Self::write_node(scene, *root, 0, out);
            }
        }
    }
}
