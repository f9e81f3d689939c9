use glam::{Vec2, Vec4};
use murex_common::Viewport;
use serde::{Deserialize, Serialize};

use super::pass::{Fragment, FragmentProgram, ShaderPass};
use super::shaders;
use super::smoothstep;
use super::uniforms::{INPUT_UNIFORM, PassDescriptor, PassError, UniformValue, Uniforms};
use crate::buffer::ColorBuffer;

const DOT_COLOR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

/// Dot-screen tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotScreenSettings {
    /// Cell pitch in pixels.
    pub spacing: f32,
    /// Squared radius, in pixels², beyond which a pixel is painted black.
    pub size: f32,
}

impl Default for DotScreenSettings {
    fn default() -> Self {
        Self {
            spacing: 8.5,
            size: 10.0,
        }
    }
}

/// Pixelates the input into `spacing`-sized cells and masks everything
/// outside a disc around each cell center.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotScreen;

pub struct DotParams {
    spacing: f32,
    size: f32,
    resolution: Vec2,
}

impl DotScreen {
    pub fn descriptor(settings: DotScreenSettings, viewport: Viewport) -> PassDescriptor {
        PassDescriptor {
            name: "dot-screen".into(),
            uniforms: Uniforms::new()
                .with(INPUT_UNIFORM, UniformValue::Texture(None))
                .with("spacing", UniformValue::Float(settings.spacing))
                .with("size", UniformValue::Float(settings.size))
                .with("resolution", UniformValue::Vec2(resolution(viewport)))
                .with("aspectRatio", UniformValue::Float(viewport.aspect())),
            vertex_shader: shaders::FULLSCREEN_VERTEX,
            fragment_shader: shaders::DOT_SCREEN_FRAGMENT,
        }
    }

    pub fn pass(settings: DotScreenSettings, viewport: Viewport) -> ShaderPass<DotScreen> {
        ShaderPass::new(Self::descriptor(settings, viewport), DotScreen)
    }
}

fn resolution(viewport: Viewport) -> Vec2 {
    Vec2::new(viewport.width() as f32, viewport.height() as f32)
}

/// GLSL `mod`: the result takes the sign of `y`.
fn gl_mod(x: Vec2, y: f32) -> Vec2 {
    x - y * (x / y).floor()
}

impl FragmentProgram for DotScreen {
    type Params = DotParams;

    fn params(&self, uniforms: &Uniforms) -> Result<DotParams, PassError> {
        Ok(DotParams {
            spacing: uniforms.float("spacing")?,
            size: uniforms.float("size")?,
            resolution: uniforms.vec2("resolution")?,
        })
    }

    fn shade(&self, params: &DotParams, fragment: Fragment, input: &ColorBuffer) -> Option<Vec4> {
        let count = params.resolution / params.spacing;
        let cell = (fragment.uv * count).floor() / count;
        let color = input.sample_nearest(cell);

        let pos = gl_mod(fragment.coord, params.spacing) - Vec2::splat(params.spacing / 2.0);
        let t = smoothstep(params.size, params.size, pos.dot(pos));
        Some(if t >= 1.0 {
            DOT_COLOR
        } else if t <= 0.0 {
            color
        } else {
            color.lerp(DOT_COLOR, t)
        })
    }

    fn resize(&self, uniforms: &mut Uniforms, viewport: Viewport) -> Result<(), PassError> {
        uniforms.set("resolution", UniformValue::Vec2(resolution(viewport)))?;
        uniforms.set("aspectRatio", UniformValue::Float(viewport.aspect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::{Pass, TargetId};

    fn run(settings: DotScreenSettings, input: &ColorBuffer) -> ColorBuffer {
        let mut pass = DotScreen::pass(settings, input.viewport());
        pass.descriptor_mut()
            .uniforms
            .set(INPUT_UNIFORM, UniformValue::Texture(Some(TargetId(0))))
            .unwrap();
        let mut output = ColorBuffer::new(input.viewport());
        pass.render(TargetId(0), input, &mut output).unwrap();
        output
    }

    fn flat(w: u32, h: u32, c: Vec4) -> ColorBuffer {
        let mut b = ColorBuffer::new(Viewport::new(w, h).unwrap());
        b.clear(c);
        b
    }

    #[test]
    fn default_uniforms() {
        let d = DotScreen::descriptor(DotScreenSettings::default(), Viewport::new(640, 480).unwrap());
        let u = &d.uniforms;
        assert_eq!(u.float("spacing").unwrap(), 8.5);
        assert_eq!(u.float("size").unwrap(), 10.0);
        assert_eq!(u.vec2("resolution").unwrap(), Vec2::new(640.0, 480.0));
        assert!((u.float("aspectRatio").unwrap() - 4.0 / 3.0).abs() < 1e-6);
        assert_eq!(u.texture(INPUT_UNIFORM).unwrap(), None);
    }

    #[test]
    fn cell_center_keeps_color_and_far_pixels_are_black() {
        let c = Vec4::new(0.2, 0.6, 0.4, 1.0);
        let out = run(DotScreenSettings { spacing: 8.0, size: 10.0 }, &flat(16, 16, c));
        // (3.5, 3.5) mod 8 - 4 = (-0.5, -0.5): dist² 0.5
        assert_eq!(out.get(3, 3), c);
        // (0.5, 0.5) mod 8 - 4 = (-3.5, -3.5): dist² 24.5
        assert_eq!(out.get(0, 0), DOT_COLOR);
    }

    #[test]
    fn squared_distance_equal_to_size_is_not_masked() {
        // spacing 4: pixel (0, 1) gives pos (-1.5, -0.5), dist² 2.5.
        let c = Vec4::new(1.0, 1.0, 1.0, 1.0);
        let at_edge = run(DotScreenSettings { spacing: 4.0, size: 2.5 }, &flat(4, 4, c));
        assert_eq!(at_edge.get(0, 1), c);
        let inside = run(DotScreenSettings { spacing: 4.0, size: 2.49 }, &flat(4, 4, c));
        assert_eq!(inside.get(0, 1), DOT_COLOR);
    }

    #[test]
    fn exact_cell_center_survives_zero_size() {
        // spacing 3: pixel (1, 1) has coord (1.5, 1.5), the cell center.
        let c = Vec4::new(0.3, 0.7, 0.5, 1.0);
        let out = run(DotScreenSettings { spacing: 3.0, size: 0.0 }, &flat(6, 6, c));
        assert_eq!(out.get(1, 1), c);
        assert_eq!(out.get(4, 4), c);
        assert_eq!(out.get(0, 1), DOT_COLOR);
    }

    #[test]
    fn cell_samples_its_lower_left_texel() {
        let mut input = flat(8, 8, Vec4::ZERO);
        input.set(4, 4, Vec4::new(1.0, 0.0, 0.0, 1.0));
        let out = run(DotScreenSettings { spacing: 4.0, size: 100.0 }, &input);
        for y in 4..8 {
            for x in 4..8 {
                assert_eq!(out.get(x, y), Vec4::new(1.0, 0.0, 0.0, 1.0));
            }
        }
        assert_eq!(out.get(3, 3), Vec4::ZERO);
    }

    #[test]
    fn gl_mod_wraps_negative() {
        assert_eq!(gl_mod(Vec2::new(-1.0, 9.0), 4.0), Vec2::new(3.0, 1.0));
    }
}
