use murex_common::Viewport;
use murex_scene::Scene;

use super::pass::Pass;
use super::uniforms::{INPUT_UNIFORM, PassError, TargetId, UniformValue};
use crate::buffer::ColorBuffer;
use crate::camera::PerspectiveCamera;
use crate::renderer::Renderer;

/// Name reported for the leading scene render pass.
pub const RENDER_PASS: &str = "render";

/// Runs the scene render pass and then each post pass in insertion order.
///
/// The render pass writes the read buffer without swapping. Every shader
/// pass reads the read buffer, writes the write buffer, then the two swap.
/// A pass that declines to write a pixel leaves whatever the write buffer
/// held, which is the frame's output from two stages earlier.
pub struct Composer {
    viewport: Viewport,
    targets: [ColorBuffer; 2],
    read: usize,
    passes: Vec<Box<dyn Pass>>,
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("viewport", &self.viewport)
            .field("read", &self.read)
            .field("passes", &self.pass_names().collect::<Vec<_>>())
            .finish()
    }
}

impl Composer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            targets: [ColorBuffer::new(viewport), ColorBuffer::new(viewport)],
            read: 0,
            passes: Vec::new(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Append a pass and size it to the composer.
    pub fn add_pass(&mut self, mut pass: Box<dyn Pass>) -> Result<(), PassError> {
        pass.set_size(self.viewport)?;
        tracing::debug!(pass = %pass.descriptor().name, "pass added");
        self.passes.push(pass);
        Ok(())
    }

    pub fn passes(&self) -> &[Box<dyn Pass>] {
        &self.passes
    }

    pub fn pass_mut(&mut self, index: usize) -> Option<&mut Box<dyn Pass>> {
        self.passes.get_mut(index)
    }

    /// The render pass followed by every post pass, in execution order.
    pub fn pass_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(RENDER_PASS).chain(self.passes.iter().map(|p| p.descriptor().name.as_str()))
    }

    pub fn read_id(&self) -> TargetId {
        TargetId(self.read as u8)
    }

    /// The current read buffer; after a frame, the final output.
    pub fn output(&self) -> &ColorBuffer {
        &self.targets[self.read]
    }

    /// Reallocate both buffers and propagate the size to every pass.
    pub fn set_size(&mut self, viewport: Viewport) -> Result<(), PassError> {
        self.viewport = viewport;
        for target in &mut self.targets {
            target.resize(viewport);
        }
        for pass in &mut self.passes {
            pass.set_size(viewport)?;
        }
        tracing::debug!(
            width = viewport.width(),
            height = viewport.height(),
            "composer resized"
        );
        Ok(())
    }

    /// Render `scene` into the read buffer, then run the post chain.
    pub fn render<R>(
        &mut self,
        renderer: &R,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<&ColorBuffer, PassError>
    where
        R: Renderer<Target = ColorBuffer> + ?Sized,
    {
        renderer.render(scene, camera, &mut self.targets[self.read]);
        self.run_passes()
    }

    /// Run the post chain over an already rendered scene buffer.
    pub fn process(&mut self, scene_buffer: &ColorBuffer) -> Result<&ColorBuffer, PassError> {
        if scene_buffer.viewport() != self.viewport {
            return Err(PassError::SizeMismatch {
                pass: RENDER_PASS.to_string(),
                input: (scene_buffer.width(), scene_buffer.height()),
                output: (self.viewport.width(), self.viewport.height()),
            });
        }
        self.targets[self.read].copy_from(scene_buffer);
        self.run_passes()
    }

    fn run_passes(&mut self) -> Result<&ColorBuffer, PassError> {
        for pass in &mut self.passes {
            let read_id = TargetId(self.read as u8);
            pass.descriptor_mut()
                .uniforms
                .set(INPUT_UNIFORM, UniformValue::Texture(Some(read_id)))?;

            let [a, b] = &mut self.targets;
            let (input, output) = if self.read == 0 { (&*a, b) } else { (&*b, a) };
            pass.render(read_id, input, output)?;
            tracing::trace!(pass = %pass.descriptor().name, "pass rendered");

            if pass.needs_swap() {
                self.read = 1 - self.read;
            }
        }
        Ok(&self.targets[self.read])
    }
}
