use murex_common::Viewport;
use murex_render::{ColorBuffer, SoftwareRenderer};

use crate::context::AppContext;
use crate::error::ViewerError;

/// Where finished frames go. Hosts implement this for their surface.
pub trait FramePresenter {
    /// Render the context's scene through its post chain and show it.
    fn present(&mut self, ctx: &mut AppContext) -> Result<(), ViewerError>;

    /// The output surface changed size.
    fn resize(&mut self, viewport: Viewport) -> Result<(), ViewerError>;
}

/// Runs the whole chain on the CPU. The final frame stays in the
/// context's composer until the next present.
#[derive(Debug, Default)]
pub struct SoftwarePresenter {
    renderer: SoftwareRenderer,
    frames: u64,
}

impl SoftwarePresenter {
    pub fn new(renderer: SoftwareRenderer) -> Self {
        Self {
            renderer,
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The most recently presented frame.
    pub fn output<'a>(&self, ctx: &'a AppContext) -> &'a ColorBuffer {
        ctx.composer().output()
    }
}

impl FramePresenter for SoftwarePresenter {
    fn present(&mut self, ctx: &mut AppContext) -> Result<(), ViewerError> {
        let (scene, camera, composer) = ctx.frame_parts();
        composer.render(&self.renderer, scene, camera)?;
        self.frames += 1;
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) -> Result<(), ViewerError> {
        tracing::trace!(
            width = viewport.width(),
            height = viewport.height(),
            "software presenter resized"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::small_config;

    #[test]
    fn present_fills_final_buffer() {
        let mut ctx = AppContext::new(small_config()).unwrap();
        let mut presenter = SoftwarePresenter::default();
        presenter.present(&mut ctx).unwrap();
        assert_eq!(presenter.frames(), 1);
        let out = presenter.output(&ctx);
        assert_eq!(out.viewport(), ctx.viewport());
        // Empty scene: black clear through the chain stays black.
        assert!(out.pixels().iter().all(|p| p.truncate() == glam::Vec3::ZERO));
    }
}
