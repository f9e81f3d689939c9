//! Shared value types used across the viewer crates.
//!
//! # Invariants
//! - Types here carry no behavior tied to a renderer or host.
//! - `Viewport` dimensions are always non-zero.

mod geometry;
mod material;
mod types;

pub use geometry::{Aabb, Geometry, GeometryError};
pub use material::{Color, PhongMaterial};
pub use types::{NodeId, Transform, Viewport, ViewportError};
