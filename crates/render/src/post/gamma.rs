use glam::Vec4;

use super::pass::{Fragment, FragmentProgram, ShaderPass};
use super::shaders;
use super::uniforms::{INPUT_UNIFORM, PassDescriptor, PassError, UniformValue, Uniforms};
use crate::buffer::ColorBuffer;

/// sRGB transfer function for one linear channel.
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Linear to sRGB on rgb; alpha passes through.
#[derive(Debug, Clone, Copy, Default)]
pub struct GammaCorrection;

impl GammaCorrection {
    pub fn descriptor() -> PassDescriptor {
        PassDescriptor {
            name: "gamma".into(),
            uniforms: Uniforms::new().with(INPUT_UNIFORM, UniformValue::Texture(None)),
            vertex_shader: shaders::FULLSCREEN_VERTEX,
            fragment_shader: shaders::GAMMA_FRAGMENT,
        }
    }

    pub fn pass() -> ShaderPass<GammaCorrection> {
        ShaderPass::new(Self::descriptor(), GammaCorrection)
    }
}

impl FragmentProgram for GammaCorrection {
    type Params = ();

    fn params(&self, _uniforms: &Uniforms) -> Result<(), PassError> {
        Ok(())
    }

    fn shade(&self, _: &(), fragment: Fragment, input: &ColorBuffer) -> Option<Vec4> {
        let c = input.sample_nearest(fragment.uv);
        Some(Vec4::new(
            linear_to_srgb(c.x),
            linear_to_srgb(c.y),
            linear_to_srgb(c.z),
            c.w,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_endpoints_and_midpoint() {
        assert_eq!(linear_to_srgb(0.0), 0.0);
        assert!((linear_to_srgb(1.0) - 1.0).abs() < 1e-6);
        assert!((linear_to_srgb(0.5) - 0.735_356_6).abs() < 1e-5);
        assert!((linear_to_srgb(0.002) - 0.025_84).abs() < 1e-6);
    }

    #[test]
    fn alpha_is_preserved() {
        use crate::post::{Pass, TargetId};
        use murex_common::Viewport;

        let vp = Viewport::new(1, 1).unwrap();
        let mut input = ColorBuffer::new(vp);
        input.set(0, 0, Vec4::new(0.5, 0.0, 1.0, 0.1));
        let mut output = ColorBuffer::new(vp);
        let mut pass = GammaCorrection::pass();
        pass.descriptor_mut()
            .uniforms
            .set(INPUT_UNIFORM, UniformValue::Texture(Some(TargetId(0))))
            .unwrap();
        pass.render(TargetId(0), &input, &mut output).unwrap();
        assert_eq!(output.get(0, 0).w, 0.1);
        assert_eq!(output.get(0, 0).y, 0.0);
    }
}
