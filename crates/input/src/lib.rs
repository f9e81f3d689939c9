//! Interaction: pointer events on the output surface mapped to rotation
//! of a target node.
//!
//! # Invariants
//! - Hosts translate their native events into [`PointerEvent`]s; the
//!   adapter never sees platform types.
//! - The adapter mutates only its target's rotation and the camera
//!   position (zoom). The frame loop reads its state, never writes it.

pub mod controls;
pub mod pointer;

pub use controls::{ControlsConfig, ObjectControls};
pub use pointer::PointerEvent;
