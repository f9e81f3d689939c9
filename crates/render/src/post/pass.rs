use glam::{Vec2, Vec4};
use murex_common::Viewport;

use super::uniforms::{INPUT_UNIFORM, PassDescriptor, PassError, TargetId, Uniforms};
use crate::buffer::ColorBuffer;

/// Per-pixel inputs handed to a [`FragmentProgram`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    /// Window coordinates of the pixel center, bottom-left origin.
    pub coord: Vec2,
    /// `coord / resolution`.
    pub uv: Vec2,
}

/// CPU counterpart of a pass's fragment shader.
pub trait FragmentProgram: Send + Sync {
    /// Uniform values resolved once per frame.
    type Params;

    fn params(&self, uniforms: &Uniforms) -> Result<Self::Params, PassError>;

    /// Color for one pixel. `None` leaves the output pixel untouched.
    fn shade(&self, params: &Self::Params, fragment: Fragment, input: &ColorBuffer) -> Option<Vec4>;

    /// Refresh size-dependent uniforms.
    fn resize(&self, _uniforms: &mut Uniforms, _viewport: Viewport) -> Result<(), PassError> {
        Ok(())
    }
}

/// One stage of the composer chain.
pub trait Pass: Send {
    fn descriptor(&self) -> &PassDescriptor;

    fn descriptor_mut(&mut self) -> &mut PassDescriptor;

    /// Whether the composer swaps read and write buffers after this pass.
    fn needs_swap(&self) -> bool {
        true
    }

    fn set_size(&mut self, viewport: Viewport) -> Result<(), PassError>;

    fn render(
        &self,
        input_id: TargetId,
        input: &ColorBuffer,
        output: &mut ColorBuffer,
    ) -> Result<(), PassError>;
}

/// A full-screen pass driven by a [`FragmentProgram`].
#[derive(Debug, Clone)]
pub struct ShaderPass<P> {
    descriptor: PassDescriptor,
    program: P,
}

impl<P: FragmentProgram> ShaderPass<P> {
    pub fn new(descriptor: PassDescriptor, program: P) -> Self {
        Self {
            descriptor,
            program,
        }
    }

    pub fn program(&self) -> &P {
        &self.program
    }

    pub fn uniforms(&self) -> &Uniforms {
        &self.descriptor.uniforms
    }
}

impl<P: FragmentProgram> Pass for ShaderPass<P> {
    fn descriptor(&self) -> &PassDescriptor {
        &self.descriptor
    }

    fn descriptor_mut(&mut self) -> &mut PassDescriptor {
        &mut self.descriptor
    }

    fn set_size(&mut self, viewport: Viewport) -> Result<(), PassError> {
        self.program.resize(&mut self.descriptor.uniforms, viewport)
    }

    fn render(
        &self,
        input_id: TargetId,
        input: &ColorBuffer,
        output: &mut ColorBuffer,
    ) -> Result<(), PassError> {
        let pass = || self.descriptor.name.clone();
        if self.descriptor.uniforms.texture(INPUT_UNIFORM)? != Some(input_id) {
            return Err(PassError::UnboundInput { pass: pass() });
        }
        if input.viewport() != output.viewport() {
            return Err(PassError::SizeMismatch {
                pass: pass(),
                input: (input.width(), input.height()),
                output: (output.width(), output.height()),
            });
        }

        let params = self.program.params(&self.descriptor.uniforms)?;
        let resolution = input.resolution();
        for y in 0..output.height() {
            for x in 0..output.width() {
                let coord = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let fragment = Fragment {
                    coord,
                    uv: coord / resolution,
                };
                if let Some(color) = self.program.shade(&params, fragment, input) {
                    output.set(x, y, color);
                }
            }
        }
        Ok(())
    }
}
