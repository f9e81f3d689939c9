//! Rendering: camera, color buffers, the scene render pass, and the
//! post-processing chain.
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - Every post pass is a pure function of its input buffer and its
//!   declared uniforms. No pass keeps state between frames.
//! - Buffers use GL row order: row 0 is the bottom of the image.

mod buffer;
mod camera;
pub mod post;
mod raster;
mod renderer;
mod shading;

pub use buffer::ColorBuffer;
pub use camera::PerspectiveCamera;
pub use raster::SoftwareRenderer;
pub use renderer::{DebugTextRenderer, Renderer};
pub use shading::LightRig;

pub fn crate_info() -> &'static str {
    "murex-render v0.1.0"
}
