use glam::{Mat3, Vec2, Vec3, Vec4};
use murex_common::PhongMaterial;
use murex_scene::{MeshNode, Scene};

use crate::buffer::ColorBuffer;
use crate::camera::PerspectiveCamera;
use crate::renderer::Renderer;
use crate::shading::LightRig;

/// CPU scene render pass: per-pixel Blinn-Phong with a depth test.
///
/// Back faces are culled. Triangles with any vertex behind the camera
/// plane are dropped rather than clipped.
#[derive(Debug, Clone)]
pub struct SoftwareRenderer {
    pub clear_color: Vec4,
}

impl Default for SoftwareRenderer {
    fn default() -> Self {
        Self {
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
        }
    }
}

struct ProjectedVertex {
    screen: Vec2,
    depth: f32,
    inv_w: f32,
    world: Vec3,
    normal: Vec3,
}

struct Surface<'a> {
    material: &'a PhongMaterial,
    lights: &'a LightRig,
    eye: Vec3,
}

impl SoftwareRenderer {
    pub fn new(clear_color: Vec4) -> Self {
        Self { clear_color }
    }

    fn draw_mesh(
        &self,
        mesh: &MeshNode,
        world: glam::Mat4,
        camera: &PerspectiveCamera,
        surface: &Surface<'_>,
        target: &mut ColorBuffer,
        depth: &mut [f32],
    ) {
        let view_proj = camera.view_projection();
        let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
        let size = target.resolution();

        let geometry = &mesh.geometry;
        let projected: Vec<Option<ProjectedVertex>> = geometry
            .positions()
            .iter()
            .zip(geometry.normals())
            .map(|(p, n)| {
                let world_pos = world.transform_point3(*p);
                let clip = view_proj * world_pos.extend(1.0);
                if clip.w <= f32::EPSILON {
                    return None;
                }
                let inv_w = 1.0 / clip.w;
                let ndc = clip.truncate() * inv_w;
                Some(ProjectedVertex {
                    screen: Vec2::new((ndc.x * 0.5 + 0.5) * size.x, (ndc.y * 0.5 + 0.5) * size.y),
                    depth: ndc.z,
                    inv_w,
                    world: world_pos,
                    normal: (normal_matrix * *n).normalize_or_zero(),
                })
            })
            .collect();

        for [a, b, c] in geometry.triangles() {
            let (Some(v0), Some(v1), Some(v2)) = (&projected[a], &projected[b], &projected[c])
            else {
                continue;
            };
            self.fill_triangle([v0, v1, v2], surface, target, depth);
        }
    }

    fn fill_triangle(
        &self,
        v: [&ProjectedVertex; 3],
        surface: &Surface<'_>,
        target: &mut ColorBuffer,
        depth: &mut [f32],
    ) {
        let area = edge(v[0].screen, v[1].screen, v[2].screen);
        // Counter-clockwise on screen is front-facing.
        if area <= 0.0 {
            return;
        }

        let width = target.width();
        let height = target.height();
        let min = v[0].screen.min(v[1].screen).min(v[2].screen).floor().max(Vec2::ZERO);
        let max = v[0].screen.max(v[1].screen).max(v[2].screen).ceil();
        let x_end = (max.x as u32).min(width);
        let y_end = (max.y as u32).min(height);

        for y in min.y as u32..y_end {
            for x in min.x as u32..x_end {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(v[1].screen, v[2].screen, p);
                let w1 = edge(v[2].screen, v[0].screen, p);
                let w2 = edge(v[0].screen, v[1].screen, p);
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let b = Vec3::new(w0, w1, w2) / area;

                let z = b.x * v[0].depth + b.y * v[1].depth + b.z * v[2].depth;
                let slot = y as usize * width as usize + x as usize;
                if !(0.0..=1.0).contains(&z) || z >= depth[slot] {
                    continue;
                }

                // Perspective-correct weights for world-space attributes.
                let pw = Vec3::new(b.x * v[0].inv_w, b.y * v[1].inv_w, b.z * v[2].inv_w);
                let pw = pw / (pw.x + pw.y + pw.z);
                let position = v[0].world * pw.x + v[1].world * pw.y + v[2].world * pw.z;
                let normal =
                    (v[0].normal * pw.x + v[1].normal * pw.y + v[2].normal * pw.z).normalize_or_zero();
                let view_dir = (surface.eye - position).normalize_or_zero();

                let rgb = surface
                    .lights
                    .shade(surface.material, position, normal, view_dir);
                depth[slot] = z;
                target.set(x, y, rgb.extend(1.0));
            }
        }
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

impl Renderer for SoftwareRenderer {
    type Target = ColorBuffer;

    fn render(&self, scene: &Scene, camera: &PerspectiveCamera, target: &mut ColorBuffer) {
        target.clear(self.clear_color);
        let mut depth = vec![f32::INFINITY; target.pixels().len()];
        let lights = LightRig::from_scene(scene);

        let meshes = scene.meshes();
        for (_, mesh, world) in &meshes {
            let surface = Surface {
                material: &mesh.material,
                lights: &lights,
                eye: camera.position,
            };
            self.draw_mesh(mesh, *world, camera, &surface, target, &mut depth);
        }
        tracing::trace!(meshes = meshes.len(), "software render pass");
    }
}
