use glam::{Mat4, Vec3};
use murex_common::{Geometry, NodeId, PhongMaterial, Transform};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::light::Light;

/// Errors from scene graph operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),
    #[error("{} has no children", describe_parent(.0))]
    NoChildren(Option<NodeId>),
    #[error("child index {index} out of range ({len} children)")]
    ChildIndexOutOfRange { index: usize, len: usize },
    #[error("node already present in scene: {0:?}")]
    DuplicateNode(NodeId),
}

fn describe_parent(parent: &Option<NodeId>) -> String {
    match parent {
        Some(id) => format!("node {}", id.short()),
        None => "scene root".to_string(),
    }
}

/// A renderable surface: shared geometry plus a shared material.
#[derive(Debug, Clone)]
pub struct MeshNode {
    pub geometry: Arc<Geometry>,
    pub material: Arc<PhongMaterial>,
}

/// What a node contributes to the rendered frame.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Mesh(MeshNode),
    Light(Light),
}

/// Per-node data stored in the scene.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// An owned, detached subtree. Produced by `Scene::detach`, consumed by
/// `Scene::attach`; node ids survive the move.
#[derive(Debug, Clone)]
pub struct NodeTree {
    pub id: NodeId,
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    pub children: Vec<NodeTree>,
}

impl NodeTree {
    pub fn new(name: impl Into<String>, transform: Transform, kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            transform,
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: NodeTree) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in this subtree, root included.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(NodeTree::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Record of a structural mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    Added { id: NodeId, parent: Option<NodeId> },
    Removed { id: NodeId },
    MaterialAssigned { id: NodeId, meshes: usize },
}

/// The scene graph.
///
/// Nodes live in a `BTreeMap` keyed by id; topology is held in explicit
/// parent links and ordered child lists. Roots are the children of the
/// implicit scene root (`parent == None`).
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: BTreeMap<NodeId, NodeData>,
    roots: Vec<NodeId>,
    event_log: Vec<SceneEvent>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(&id)
    }

    pub fn transform_mut(&mut self, id: NodeId) -> Result<&mut Transform, SceneError> {
        self.nodes
            .get_mut(&id)
            .map(|n| &mut n.transform)
            .ok_or(SceneError::NodeNotFound(id))
    }

    /// Children of `parent`, or the root list when `parent` is `None`.
    pub fn children(&self, parent: Option<NodeId>) -> Result<&[NodeId], SceneError> {
        match parent {
            None => Ok(&self.roots),
            Some(id) => self
                .nodes
                .get(&id)
                .map(|n| n.children.as_slice())
                .ok_or(SceneError::NodeNotFound(id)),
        }
    }

    /// Indexed child access. An empty parent is `NoChildren`, never a panic.
    pub fn child(&self, parent: Option<NodeId>, index: usize) -> Result<NodeId, SceneError> {
        let children = self.children(parent)?;
        if children.is_empty() {
            return Err(SceneError::NoChildren(parent));
        }
        children
            .get(index)
            .copied()
            .ok_or(SceneError::ChildIndexOutOfRange {
                index,
                len: children.len(),
            })
    }

    pub fn first_child(&self, parent: Option<NodeId>) -> Result<NodeId, SceneError> {
        self.child(parent, 0)
    }

    /// Add a single node under `parent` (or at the root).
    pub fn add(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
        transform: Transform,
        kind: NodeKind,
    ) -> Result<NodeId, SceneError> {
        self.attach(parent, NodeTree::new(name, transform, kind))
    }

    /// Insert a detached subtree under `parent`. Returns the subtree root id.
    pub fn attach(&mut self, parent: Option<NodeId>, tree: NodeTree) -> Result<NodeId, SceneError> {
        if let Some(p) = parent {
            if !self.nodes.contains_key(&p) {
                return Err(SceneError::NodeNotFound(p));
            }
        }
        if let Some(dup) = self.first_duplicate(&tree) {
            return Err(SceneError::DuplicateNode(dup));
        }

        let root_id = tree.id;
        match parent {
            Some(p) => {
                if let Some(node) = self.nodes.get_mut(&p) {
                    node.children.push(root_id);
                }
            }
            None => self.roots.push(root_id),
        }
        self.insert_recursive(parent, tree);
        Ok(root_id)
    }

    fn first_duplicate(&self, tree: &NodeTree) -> Option<NodeId> {
        if self.nodes.contains_key(&tree.id) {
            return Some(tree.id);
        }
        tree.children.iter().find_map(|c| self.first_duplicate(c))
    }

    fn insert_recursive(&mut self, parent: Option<NodeId>, tree: NodeTree) {
        let NodeTree {
            id,
            name,
            transform,
            kind,
            children,
        } = tree;
        let child_ids = children.iter().map(|c| c.id).collect();
        self.nodes.insert(
            id,
            NodeData {
                name,
                transform,
                kind,
                parent,
                children: child_ids,
            },
        );
        self.event_log.push(SceneEvent::Added { id, parent });
        for child in children {
            self.insert_recursive(Some(id), child);
        }
    }

    /// Remove a node and its descendants, returning them as a detached tree.
    pub fn detach(&mut self, id: NodeId) -> Result<NodeTree, SceneError> {
        let parent = self
            .nodes
            .get(&id)
            .ok_or(SceneError::NodeNotFound(id))?
            .parent;
        match parent {
            Some(p) => {
                if let Some(node) = self.nodes.get_mut(&p) {
                    node.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|c| *c != id),
        }
        let tree = self.remove_recursive(id)?;
        self.event_log.push(SceneEvent::Removed { id });
        Ok(tree)
    }

    fn remove_recursive(&mut self, id: NodeId) -> Result<NodeTree, SceneError> {
        let data = self.nodes.remove(&id).ok_or(SceneError::NodeNotFound(id))?;
        let children = data
            .children
            .iter()
            .map(|c| self.remove_recursive(*c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NodeTree {
            id,
            name: data.name,
            transform: data.transform,
            kind: data.kind,
            children,
        })
    }

    /// `id` followed by all its descendants, depth-first in child order.
    pub fn subtree(&self, id: NodeId) -> Result<Vec<NodeId>, SceneError> {
        if !self.nodes.contains_key(&id) {
            return Err(SceneError::NodeNotFound(id));
        }
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(node) = self.nodes.get(&next) {
                stack.extend(node.children.iter().rev());
            }
        }
        Ok(out)
    }

    /// Every node in the scene, depth-first from the roots in child order.
    pub fn traverse(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            if let Ok(ids) = self.subtree(*root) {
                out.extend(ids);
            }
        }
        out
    }

    /// Override the material of every mesh in the subtree rooted at `id`.
    /// Returns the number of meshes updated.
    pub fn assign_material(
        &mut self,
        id: NodeId,
        material: Arc<PhongMaterial>,
    ) -> Result<usize, SceneError> {
        let mut meshes = 0;
        for node_id in self.subtree(id)? {
            if let Some(NodeData {
                kind: NodeKind::Mesh(mesh),
                ..
            }) = self.nodes.get_mut(&node_id)
            {
                mesh.material = Arc::clone(&material);
                meshes += 1;
            }
        }
        self.event_log
            .push(SceneEvent::MaterialAssigned { id, meshes });
        tracing::debug!(node = %id.short(), meshes, "material assigned");
        Ok(meshes)
    }

    /// Product of local matrices from the root down to `id`.
    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        let mut matrix = Mat4::IDENTITY;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self
                .nodes
                .get(&current)
                .ok_or(SceneError::NodeNotFound(current))?;
            matrix = node.transform.matrix() * matrix;
            cursor = node.parent;
        }
        Ok(matrix)
    }

    /// Mesh nodes with their world matrices, in traversal order.
    pub fn meshes(&self) -> Vec<(NodeId, &MeshNode, Mat4)> {
        self.traverse()
            .into_iter()
            .filter_map(|id| match &self.nodes.get(&id)?.kind {
                NodeKind::Mesh(mesh) => Some((id, mesh, self.world_matrix(id).ok()?)),
                _ => None,
            })
            .collect()
    }

    /// Lights with their world positions, in traversal order.
    pub fn lights(&self) -> Vec<(Light, Vec3)> {
        self.traverse()
            .into_iter()
            .filter_map(|id| match self.nodes.get(&id)?.kind {
                NodeKind::Light(light) => {
                    let position = self.world_matrix(id).ok()?.transform_point3(Vec3::ZERO);
                    Some((light, position))
                }
                _ => None,
            })
            .collect()
    }
}
