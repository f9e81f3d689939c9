//! The viewer: one application context driven by a frame loop.
//!
//! Hosts build an [`AppContext`] from a [`ViewerConfig`], start the asset
//! load, then call [`FrameLoop::tick`] once per frame with their
//! [`FramePresenter`] and [`handle_resize`] on every surface resize.
//!
//! # Invariants
//! - Camera aspect always equals viewport width / height.
//! - The load continuation runs on the ticking thread, inside `tick`.
//! - Idle rotation never runs without a mesh or during a drag.

mod config;
mod context;
mod error;
mod frame_loop;
mod presenter;
mod resize;

pub use config::{CameraConfig, IdleRotation, ViewerConfig, ViewportSize};
pub use context::AppContext;
pub use error::ViewerError;
pub use frame_loop::FrameLoop;
pub use presenter::{FramePresenter, SoftwarePresenter};
pub use resize::handle_resize;

pub fn crate_info() -> &'static str {
    "murex-viewer v0.1.0"
}
