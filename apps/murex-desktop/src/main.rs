use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use murex_common::Viewport;
use murex_input::PointerEvent;
use murex_render_wgpu::WgpuRenderer;
use murex_viewer::{
    AppContext, FrameLoop, FramePresenter, ViewerConfig, ViewerError, handle_resize,
};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "murex-desktop", about = "Murex shell viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML viewer config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Asset to display; overrides the config
    #[arg(long)]
    asset: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,
}

/// Presents frames to the window surface through the wgpu backend.
struct GpuPresenter {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
}

impl FramePresenter for GpuPresenter {
    fn present(&mut self, ctx: &mut AppContext) -> Result<(), ViewerError> {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(e) => return Err(ViewerError::Present(e.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let (scene, camera, composer) = ctx.frame_parts();
        self.renderer
            .render(&self.device, &self.queue, &view, scene, camera, composer);
        output.present();
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) -> Result<(), ViewerError> {
        self.config.width = viewport.width();
        self.config.height = viewport.height();
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(&self.device, viewport);
        Ok(())
    }
}

/// Frames are presented opaque; the chain leaves partial alpha behind.
fn select_alpha_mode(supported: &[wgpu::CompositeAlphaMode]) -> wgpu::CompositeAlphaMode {
    if supported.contains(&wgpu::CompositeAlphaMode::Opaque) {
        wgpu::CompositeAlphaMode::Opaque
    } else {
        supported
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto)
    }
}

struct GpuApp {
    ctx: AppContext,
    frame_loop: FrameLoop,
    window: Option<Arc<Window>>,
    presenter: Option<GpuPresenter>,
    cursor: Vec2,
}

impl GpuApp {
    fn new(ctx: AppContext) -> Self {
        let frame_loop = FrameLoop::new(ctx.config().idle_rotation);
        Self {
            ctx,
            frame_loop,
            window: None,
            presenter: None,
            cursor: Vec2::ZERO,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let viewport = self.ctx.viewport();
        let attrs = Window::default_attributes()
            .with_title("Murex")
            .with_inner_size(PhysicalSize::new(viewport.width(), viewport.height()));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("find adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("murex_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        // The gamma pass encodes sRGB itself, so the surface must not.
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or(caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = select_alpha_mode(&caps.alpha_modes);

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, self.ctx.composer())?;
        let mut presenter = GpuPresenter {
            surface,
            device,
            queue,
            config,
            renderer,
        };
        // The window may not have the requested size.
        handle_resize(&mut self.ctx, &mut presenter, size.width.max(1), size.height.max(1))?;

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );
        self.window = Some(window);
        self.presenter = Some(presenter);
        Ok(())
    }

    fn pointer(&mut self, event: PointerEvent) {
        if let Err(e) = self.ctx.handle_pointer(event) {
            tracing::warn!("pointer event dropped: {e}");
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            tracing::error!("initialization failed: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.frame_loop.cancel(&mut self.ctx);
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                let Some(presenter) = &mut self.presenter else {
                    return;
                };
                // Minimized windows report zero; keep the last size.
                if new_size.width == 0 || new_size.height == 0 {
                    return;
                }
                if let Err(e) =
                    handle_resize(&mut self.ctx, presenter, new_size.width, new_size.height)
                {
                    tracing::error!("resize failed: {e}");
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                self.pointer(PointerEvent::Move(self.cursor));
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                let event = match state {
                    ElementState::Pressed => PointerEvent::Down(self.cursor),
                    ElementState::Released => PointerEvent::Up,
                };
                self.pointer(event);
            }
            WindowEvent::CursorLeft { .. } => self.pointer(PointerEvent::Leave),
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32,
                };
                self.pointer(PointerEvent::Wheel(dy));
            }
            WindowEvent::RedrawRequested => {
                let Some(presenter) = &mut self.presenter else {
                    return;
                };
                match self.frame_loop.tick(&mut self.ctx, presenter) {
                    Ok(true) => {}
                    Ok(false) => event_loop.exit(),
                    Err(e) => tracing::error!("frame failed: {e}"),
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("murex-desktop starting");

    let mut config = match &cli.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(asset) = cli.asset {
        config.asset_path = asset;
    }
    if let Some(width) = cli.width {
        config.viewport.width = width;
    }
    if let Some(height) = cli.height {
        config.viewport.height = height;
    }

    let mut ctx = AppContext::new(config)?;
    ctx.start_load();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(ctx);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::CompositeAlphaMode;

    #[test]
    fn opaque_alpha_mode_is_preferred() {
        let modes = [CompositeAlphaMode::PreMultiplied, CompositeAlphaMode::Opaque];
        assert_eq!(select_alpha_mode(&modes), CompositeAlphaMode::Opaque);
    }

    #[test]
    fn alpha_mode_falls_back_to_first_supported() {
        let modes = [CompositeAlphaMode::Inherit];
        assert_eq!(select_alpha_mode(&modes), CompositeAlphaMode::Inherit);
        assert_eq!(select_alpha_mode(&[]), CompositeAlphaMode::Auto);
    }
}
