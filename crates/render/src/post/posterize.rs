use glam::Vec4;

use super::pass::{Fragment, FragmentProgram, ShaderPass};
use super::shaders;
use super::uniforms::{INPUT_UNIFORM, PassDescriptor, PassError, UniformValue, Uniforms};
use crate::buffer::ColorBuffer;

/// Green-channel band a pixel falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterizeBand {
    /// `g <= 0.064`: no output is written.
    Untouched,
    Dark,
    Mid,
    Bright,
}

impl PosterizeBand {
    pub const DARK_ABOVE: f32 = 0.064;
    pub const MID_FROM: f32 = 0.4;
    pub const BRIGHT_FROM: f32 = 0.75;

    pub fn classify(green: f32) -> Self {
        if green >= Self::BRIGHT_FROM {
            Self::Bright
        } else if green >= Self::MID_FROM {
            Self::Mid
        } else if green > Self::DARK_ABOVE {
            Self::Dark
        } else {
            Self::Untouched
        }
    }

    pub fn color(self) -> Option<Vec4> {
        match self {
            Self::Untouched => None,
            Self::Dark => Some(Vec4::new(0.28, 0.08, 0.08, 0.1)),
            Self::Mid => Some(Vec4::new(0.1, 0.5, 0.1, 1.0)),
            Self::Bright => Some(Vec4::new(0.1, 0.9, 0.86, 1.0)),
        }
    }
}

/// Maps each pixel to a fixed palette keyed on its green channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Posterize;

impl Posterize {
    pub fn descriptor() -> PassDescriptor {
        PassDescriptor {
            name: "posterize".into(),
            uniforms: Uniforms::new().with(INPUT_UNIFORM, UniformValue::Texture(None)),
            vertex_shader: shaders::FULLSCREEN_VERTEX,
            fragment_shader: shaders::POSTERIZE_FRAGMENT,
        }
    }

    pub fn pass() -> ShaderPass<Posterize> {
        ShaderPass::new(Self::descriptor(), Posterize)
    }
}

impl FragmentProgram for Posterize {
    type Params = ();

    fn params(&self, _uniforms: &Uniforms) -> Result<(), PassError> {
        Ok(())
    }

    fn shade(&self, _: &(), fragment: Fragment, input: &ColorBuffer) -> Option<Vec4> {
        let base = input.sample_nearest(fragment.uv);
        PosterizeBand::classify(base.y).color()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::{Pass, TargetId};
    use murex_common::Viewport;

    #[test]
    fn band_edges() {
        assert_eq!(PosterizeBand::classify(0.064), PosterizeBand::Untouched);
        assert_eq!(PosterizeBand::classify(0.0641), PosterizeBand::Dark);
        assert_eq!(PosterizeBand::classify(0.4), PosterizeBand::Mid);
        assert_eq!(PosterizeBand::classify(0.75), PosterizeBand::Bright);
        assert_eq!(PosterizeBand::classify(1.0), PosterizeBand::Bright);
    }

    #[test]
    fn sample_points_map_to_palette() {
        let vp = Viewport::new(4, 1).unwrap();
        let mut input = ColorBuffer::new(vp);
        for (x, g) in [0.05, 0.2, 0.5, 0.9].into_iter().enumerate() {
            input.set(x as u32, 0, Vec4::new(0.0, g, 0.0, 1.0));
        }
        let sentinel = Vec4::new(0.3, 0.3, 0.3, 0.3);
        let mut output = ColorBuffer::new(vp);
        output.clear(sentinel);

        let mut pass = Posterize::pass();
        pass.descriptor_mut()
            .uniforms
            .set(INPUT_UNIFORM, UniformValue::Texture(Some(TargetId(1))))
            .unwrap();
        pass.render(TargetId(1), &input, &mut output).unwrap();

        assert_eq!(output.get(0, 0), sentinel);
        assert_eq!(output.get(1, 0), Vec4::new(0.28, 0.08, 0.08, 0.1));
        assert_eq!(output.get(2, 0), Vec4::new(0.1, 0.5, 0.1, 1.0));
        assert_eq!(output.get(3, 0), Vec4::new(0.1, 0.9, 0.86, 1.0));
    }
}
