use crate::config::IdleRotation;
use crate::context::AppContext;
use crate::error::ViewerError;
use crate::presenter::FramePresenter;

/// Per-tick driver. The host calls [`FrameLoop::tick`] at its frame
/// cadence until [`FrameLoop::cancel`].
#[derive(Debug, Clone)]
pub struct FrameLoop {
    idle: IdleRotation,
    ticks: u64,
    running: bool,
}

impl FrameLoop {
    pub fn new(idle: IdleRotation) -> Self {
        Self {
            idle,
            ticks: 0,
            running: true,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop ticking and abandon any in-flight load.
    pub fn cancel(&mut self, ctx: &mut AppContext) {
        if !self.running {
            return;
        }
        self.running = false;
        ctx.cancel_load();
        tracing::info!(ticks = self.ticks, "frame loop cancelled");
    }

    /// One frame: run a resolved load's continuation, apply idle rotation,
    /// then present. Returns `false` once cancelled.
    pub fn tick<P>(&mut self, ctx: &mut AppContext, presenter: &mut P) -> Result<bool, ViewerError>
    where
        P: FramePresenter + ?Sized,
    {
        if !self.running {
            return Ok(false);
        }
        let _span = tracing::trace_span!("frame", tick = self.ticks).entered();

        // A failed load is already logged by the continuation; keep rendering.
        let _ = ctx.poll_load();
        self.step_rotation(ctx)?;
        presenter.present(ctx)?;

        self.ticks += 1;
        Ok(true)
    }

    /// Idle rotation. No-op without a mesh or during a drag.
    pub fn step_rotation(&self, ctx: &mut AppContext) -> Result<bool, ViewerError> {
        let Some(mesh) = ctx.mesh() else {
            return Ok(false);
        };
        if ctx.is_interacting() {
            return Ok(false);
        }
        let rotation = &mut ctx.scene_mut().transform_mut(mesh)?.rotation;
        rotation.x += self.idle.x;
        rotation.y += self.idle.y;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::{shell_asset, small_config};
    use crate::presenter::SoftwarePresenter;
    use glam::{Vec2, Vec3};
    use murex_assets::LoadTask;
    use murex_common::Viewport;
    use murex_input::PointerEvent;

    /// Counts presents without rendering.
    #[derive(Default)]
    struct CountingPresenter {
        frames: usize,
    }

    impl FramePresenter for CountingPresenter {
        fn present(&mut self, _ctx: &mut AppContext) -> Result<(), ViewerError> {
            self.frames += 1;
            Ok(())
        }

        fn resize(&mut self, _viewport: Viewport) -> Result<(), ViewerError> {
            Ok(())
        }
    }

    fn loaded_context() -> AppContext {
        let mut ctx = AppContext::new(small_config()).unwrap();
        ctx.on_asset_loaded(Ok(shell_asset())).unwrap();
        ctx
    }

    fn rotation(ctx: &AppContext) -> Vec3 {
        let mesh = ctx.mesh().unwrap();
        ctx.scene().get(mesh).unwrap().transform.rotation
    }

    #[test]
    fn idle_rotation_accumulates_per_tick() {
        let mut ctx = loaded_context();
        let mut frame_loop = FrameLoop::new(IdleRotation::default());
        let mut presenter = CountingPresenter::default();
        let n = 120;
        for _ in 0..n {
            assert!(frame_loop.tick(&mut ctx, &mut presenter).unwrap());
        }
        let r = rotation(&ctx);
        assert!((r.x - 0.015 * n as f32).abs() < 1e-4);
        assert!((r.y - 0.004 * n as f32).abs() < 1e-4);
        assert_eq!(presenter.frames, n);
        assert_eq!(frame_loop.ticks(), n as u64);
    }

    #[test]
    fn drag_suppresses_idle_rotation() {
        let mut ctx = loaded_context();
        let mut frame_loop = FrameLoop::new(IdleRotation::default());
        let mut presenter = CountingPresenter::default();

        ctx.handle_pointer(PointerEvent::Down(Vec2::ZERO)).unwrap();
        let before = rotation(&ctx);
        for _ in 0..10 {
            frame_loop.tick(&mut ctx, &mut presenter).unwrap();
        }
        assert_eq!(rotation(&ctx), before);
        assert_eq!(presenter.frames, 10);

        ctx.handle_pointer(PointerEvent::Up).unwrap();
        frame_loop.tick(&mut ctx, &mut presenter).unwrap();
        assert_ne!(rotation(&ctx), before);
    }

    #[test]
    fn ticks_without_mesh_still_present_frames() {
        let mut ctx = AppContext::new(small_config()).unwrap();
        let mut frame_loop = FrameLoop::new(IdleRotation::default());
        let mut presenter = SoftwarePresenter::default();
        for _ in 0..5 {
            frame_loop.tick(&mut ctx, &mut presenter).unwrap();
        }
        assert_eq!(presenter.frames(), 5);
        assert_eq!(presenter.output(&ctx).viewport(), ctx.viewport());
    }

    #[test]
    fn load_resolves_inside_tick() {
        let mut ctx = AppContext::new(small_config()).unwrap();
        ctx.track_load(LoadTask::from_result("shell.gltf", Ok(shell_asset())));
        let mut frame_loop = FrameLoop::new(IdleRotation::default());
        let mut presenter = CountingPresenter::default();

        frame_loop.tick(&mut ctx, &mut presenter).unwrap();
        assert!(ctx.mesh().is_some());
        // Continuation ran before the idle step of the same tick.
        assert_eq!(rotation(&ctx).x, 0.015);
    }

    #[test]
    fn cancel_stops_ticks_and_pending_load() {
        let mut ctx = AppContext::new(small_config()).unwrap();
        ctx.track_load(LoadTask::from_result("shell.gltf", Ok(shell_asset())));
        let mut frame_loop = FrameLoop::new(IdleRotation::default());
        let mut presenter = CountingPresenter::default();

        frame_loop.cancel(&mut ctx);
        assert!(!frame_loop.is_running());
        assert!(!ctx.is_loading());
        assert!(!frame_loop.tick(&mut ctx, &mut presenter).unwrap());
        assert_eq!(presenter.frames, 0);
        assert!(ctx.mesh().is_none());
    }
}
