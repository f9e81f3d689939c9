//! wgpu render backend.
//!
//! The scene pass draws every mesh with Blinn-Phong lighting into an
//! offscreen linear target. The post chain then runs the composer's pass
//! descriptors over two ping-pong textures; the last pass writes the
//! presentation surface.
//!
//! # Invariants
//! - The backend never mutates the scene.
//! - Pass uniforms are owned by the CPU composer and copied each frame.
//! - Ping-pong attachments are loaded, not cleared, so a fragment that
//!   discards keeps the pixel from two stages earlier.

mod gpu;
mod post;
mod shaders;

pub use gpu::{GpuSceneRenderer, OFFSCREEN_FORMAT};
pub use post::{GpuPostChain, PostChainError};

use murex_common::Viewport;
use murex_render::PerspectiveCamera;
use murex_render::post::Composer;
use murex_scene::Scene;

/// Scene pass plus post chain, sized to one surface.
pub struct WgpuRenderer {
    scene: GpuSceneRenderer,
    post: GpuPostChain,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        composer: &Composer,
    ) -> Result<Self, PostChainError> {
        let viewport = composer.viewport();
        let post = GpuPostChain::new(device, surface_format, composer)?;
        Ok(Self {
            scene: GpuSceneRenderer::new(device, viewport),
            post,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, viewport: Viewport) {
        self.scene.resize(device, viewport);
        self.post.resize(device, viewport);
    }

    /// Render one frame into `surface_view`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_view: &wgpu::TextureView,
        scene: &Scene,
        camera: &PerspectiveCamera,
        composer: &Composer,
    ) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });
        self.scene.encode(
            device,
            queue,
            &mut encoder,
            self.post.scene_target(),
            scene,
            camera,
        );
        self.post.encode(queue, &mut encoder, surface_view, composer);
        queue.submit(std::iter::once(encoder.finish()));
    }
}
