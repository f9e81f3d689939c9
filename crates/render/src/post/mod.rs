//! Post-processing: an ordered chain of full-screen passes over two
//! ping-pong buffers.
//!
//! Each pass is declared by a [`PassDescriptor`] (name, ordered uniforms,
//! WGSL sources) plus a CPU [`FragmentProgram`] with the same semantics,
//! so the chain runs identically on the software path and on the GPU.

mod composer;
mod dot_screen;
mod gamma;
mod pass;
mod posterize;
pub mod shaders;
mod uniforms;

pub use composer::{Composer, RENDER_PASS};
pub use dot_screen::{DotScreen, DotScreenSettings};
pub use gamma::{GammaCorrection, linear_to_srgb};
pub use pass::{Fragment, FragmentProgram, Pass, ShaderPass};
pub use posterize::{Posterize, PosterizeBand};
pub use uniforms::{INPUT_UNIFORM, PassDescriptor, PassError, TargetId, UniformValue, Uniforms};

use murex_common::Viewport;

/// The stylization chain: scene render, dot-screen, posterize, gamma.
pub fn stylization_chain(
    viewport: Viewport,
    dots: DotScreenSettings,
) -> Result<Composer, PassError> {
    let mut composer = Composer::new(viewport);
    composer.add_pass(Box::new(DotScreen::pass(dots, viewport)))?;
    composer.add_pass(Box::new(Posterize::pass()))?;
    composer.add_pass(Box::new(GammaCorrection::pass()))?;
    Ok(composer)
}

/// GLSL `smoothstep`. Equal edges degenerate to a hard step: 0 at or
/// below the edge, 1 above it.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return if x > edge0 { 1.0 } else { 0.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
