//! Scene graph: a tree of positioned, lit, renderable nodes.
//!
//! # Invariants
//! - Every node except a root has exactly one parent, and appears once in
//!   that parent's child list.
//! - Child order is insertion order; indexed access never guesses.
//! - Structural mutations (add, remove, material assignment) are logged.

mod light;
mod scene;

pub use light::{AmbientLight, Light, PointLight};
pub use scene::{MeshNode, NodeData, NodeKind, NodeTree, Scene, SceneError, SceneEvent};
