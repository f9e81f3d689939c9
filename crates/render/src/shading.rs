use std::f32::consts::FRAC_1_PI;

use glam::Vec3;
use murex_common::PhongMaterial;
use murex_scene::{Light, PointLight, Scene};

/// Lights gathered from a scene once per frame, in world space.
#[derive(Debug, Clone, Default)]
pub struct LightRig {
    ambient: Vec3,
    points: Vec<(PointLight, Vec3)>,
}

impl LightRig {
    pub fn from_scene(scene: &Scene) -> Self {
        let mut rig = Self::default();
        for (light, position) in scene.lights() {
            match light {
                Light::Ambient(a) => rig.ambient += a.color.rgb() * a.intensity,
                Light::Point(p) => rig.points.push((p, position)),
            }
        }
        rig
    }

    pub fn ambient(&self) -> Vec3 {
        self.ambient
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Outgoing linear radiance for a Blinn-Phong surface.
    ///
    /// `normal` must be unit length; `view_dir` points from the surface
    /// towards the eye.
    pub fn shade(
        &self,
        material: &PhongMaterial,
        position: Vec3,
        normal: Vec3,
        view_dir: Vec3,
    ) -> Vec3 {
        let diffuse_color = material.color.rgb();
        let lambert = diffuse_color * FRAC_1_PI;

        let mut diffuse = self.ambient * lambert;
        let mut specular = Vec3::ZERO;

        for (light, light_pos) in &self.points {
            let to_light = *light_pos - position;
            let distance = to_light.length();
            if distance <= f32::EPSILON {
                continue;
            }
            let light_dir = to_light / distance;
            let radiance = light.color.rgb() * light.intensity * light.attenuation(distance);
            let irradiance = radiance * normal.dot(light_dir).clamp(0.0, 1.0);

            diffuse += irradiance * lambert;
            specular += irradiance
                * blinn_phong(
                    light_dir,
                    view_dir,
                    normal,
                    material.specular.rgb(),
                    material.shininess,
                );
        }
        diffuse + specular
    }
}

fn blinn_phong(light_dir: Vec3, view_dir: Vec3, normal: Vec3, f0: Vec3, shininess: f32) -> Vec3 {
    let half = (light_dir + view_dir).normalize_or_zero();
    let dot_nh = normal.dot(half).clamp(0.0, 1.0);
    let dot_vh = view_dir.dot(half).clamp(0.0, 1.0);

    let fresnel = f0 + (Vec3::ONE - f0) * (1.0 - dot_vh).powi(5);
    let visibility = 0.25;
    let distribution = FRAC_1_PI * (0.5 * shininess + 1.0) * dot_nh.powf(shininess);
    fresnel * (visibility * distribution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use murex_common::{Color, Transform};
    use murex_scene::{AmbientLight, NodeKind};

    fn rig(ambient: f32, point: Option<(PointLight, Vec3)>) -> LightRig {
        let mut scene = Scene::new();
        scene
            .add(
                None,
                "ambient",
                Transform::default(),
                NodeKind::Light(Light::Ambient(AmbientLight {
                    color: Color::WHITE,
                    intensity: ambient,
                })),
            )
            .unwrap();
        if let Some((light, pos)) = point {
            scene
                .add(
                    None,
                    "point",
                    Transform::from_position(pos),
                    NodeKind::Light(Light::Point(light)),
                )
                .unwrap();
        }
        LightRig::from_scene(&scene)
    }

    #[test]
    fn ambient_only_is_uniform_lambert() {
        let rig = rig(0.2, None);
        let mat = PhongMaterial::default();
        let c = rig.shade(&mat, Vec3::ZERO, Vec3::Z, Vec3::Z);
        let expected = 0.2 * FRAC_1_PI * mat.color.rgb().x;
        assert!((c.x - expected).abs() < 1e-6);
        // Ambient-only surfaces stay under the posterize low threshold.
        assert!(c.y < 0.064);
    }

    #[test]
    fn facing_point_light_brightens_surface() {
        let light = PointLight {
            color: Color::WHITE,
            intensity: 3.0,
            distance: 0.0,
            decay: 0.0,
        };
        let rig = rig(0.2, Some((light, Vec3::new(0.0, 0.0, 10.0))));
        assert_eq!(rig.point_count(), 1);
        let mat = PhongMaterial::default();
        let lit = rig.shade(&mat, Vec3::ZERO, Vec3::Z, Vec3::Z);
        let unlit = rig.shade(&mat, Vec3::ZERO, -Vec3::Z, Vec3::Z);
        assert!(lit.y > 0.9);
        assert!((unlit.y - rig.ambient().y * FRAC_1_PI).abs() < 1e-6);
    }

    #[test]
    fn specular_peaks_on_mirror_direction() {
        let h = blinn_phong(Vec3::Z, Vec3::Z, Vec3::Z, Vec3::splat(0.04), 30.0);
        let off = blinn_phong(Vec3::X, Vec3::Z, Vec3::Z, Vec3::splat(0.04), 30.0);
        assert!(h.x > off.x);
    }
}
