//! Scene graph.
//!
//! The [`SceneGraph`] is the single owner of every node, mesh and material in
//! a viewer scene. Nodes reference resources through pool handles; cloned
//! subtrees share them and bump reference counts, so releasing a subtree
//! frees exactly what nothing else still uses.

mod asset;
mod bounds;
mod node;

pub use asset::*;
pub use bounds::*;
pub use node::*;

use std::collections::HashMap;

use glam::Mat4;

use crate::light::Light;
use crate::resources::{Material, MaterialHandle, MaterialManager, MeshData, MeshHandle, MeshManager};

/// Scene graph error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("Unknown scene node: {0}")]
    UnknownNode(NodeHandle),
    #[error("Attaching {child} under {parent} would create a cycle")]
    Cycle { child: NodeHandle, parent: NodeHandle },
    #[error("The root node cannot be moved")]
    RootNode,
    #[error("Scene has been disposed")]
    Disposed,
}

/// Live resource counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneStats {
    pub nodes: usize,
    pub meshes: usize,
    pub materials: usize,
}

/// Node tree plus the resources it draws with.
pub struct SceneGraph {
    nodes: HashMap<NodeHandle, SceneNode>,
    root: NodeHandle,
    next_node: u64,
    meshes: MeshManager,
    materials: MaterialManager,
    lights: Vec<Light>,
    background: [f32; 4],
    dirty: bool,
    disposed: bool,
}

impl SceneGraph {
    /// Creates a scene holding only its root node.
    pub fn new() -> Self {
        let root = NodeHandle::new(0);
        let mut nodes = HashMap::new();
        nodes.insert(root, SceneNode::new("root", Transform::IDENTITY));
        Self {
            nodes,
            root,
            next_node: 1,
            meshes: MeshManager::new(),
            materials: MaterialManager::new(),
            lights: Vec::new(),
            background: [0.0, 0.0, 0.0, 1.0],
            dirty: true,
            disposed: false,
        }
    }

    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Returns true if the scene changed since the last [`SceneGraph::mark_clean`].
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(&handle)
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&SceneNode> {
        self.nodes.get(&handle)
    }

    pub fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut SceneNode> {
        let node = self.nodes.get_mut(&handle)?;
        self.dirty = true;
        Some(node)
    }

    pub fn children(&self, handle: NodeHandle) -> &[NodeHandle] {
        self.nodes
            .get(&handle)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&MeshData> {
        self.meshes.get(handle)
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle)
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
        self.dirty = true;
    }

    pub fn background(&self) -> [f32; 4] {
        self.background
    }

    pub fn set_background(&mut self, color: [f32; 4]) {
        self.background = color;
        self.dirty = true;
    }

    pub fn stats(&self) -> SceneStats {
        SceneStats {
            nodes: self.nodes.len(),
            meshes: self.meshes.len(),
            materials: self.materials.len(),
        }
    }

    /// Creates a detached group node.
    pub fn create_node(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
    ) -> Result<NodeHandle, SceneError> {
        self.ensure_live()?;
        let handle = NodeHandle::new(self.next_node);
        self.next_node += 1;
        self.nodes.insert(handle, SceneNode::new(name, transform));
        self.dirty = true;
        Ok(handle)
    }

    /// Creates a group node under `parent`.
    pub fn add_node(
        &mut self,
        parent: NodeHandle,
        name: impl Into<String>,
        transform: Transform,
    ) -> Result<NodeHandle, SceneError> {
        self.ensure_node(parent)?;
        let handle = self.create_node(name, transform)?;
        self.link(handle, parent);
        Ok(handle)
    }

    /// Creates a mesh node under `parent`, taking ownership of the mesh and material.
    pub fn add_mesh_node(
        &mut self,
        parent: NodeHandle,
        name: impl Into<String>,
        mesh: MeshData,
        material: Material,
        transform: Transform,
    ) -> Result<NodeHandle, SceneError> {
        let handle = self.add_node(parent, name, transform)?;
        let mesh = self.meshes.insert(mesh);
        let material = self.materials.insert(material);
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.mesh = Some(mesh);
            node.material = Some(material);
        }
        Ok(handle)
    }

    /// Moves `child` (and its subtree) under `parent`.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) -> Result<(), SceneError> {
        self.ensure_live()?;
        if child == self.root {
            return Err(SceneError::RootNode);
        }
        self.ensure_node(child)?;
        self.ensure_node(parent)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::Cycle { child, parent });
        }

        self.unlink(child);
        self.link(child, parent);
        Ok(())
    }

    /// Detaches a node from its parent. The node stays alive but is no longer drawn.
    pub fn detach(&mut self, handle: NodeHandle) -> Result<(), SceneError> {
        if handle == self.root {
            return Err(SceneError::RootNode);
        }
        self.ensure_node(handle)?;
        self.unlink(handle);
        self.dirty = true;
        Ok(())
    }

    pub fn set_transform(&mut self, handle: NodeHandle, transform: Transform) -> Result<(), SceneError> {
        let node = self.node_mut(handle).ok_or(SceneError::UnknownNode(handle))?;
        node.transform = transform;
        Ok(())
    }

    pub fn set_visible(&mut self, handle: NodeHandle, visible: bool) -> Result<(), SceneError> {
        let node = self.node_mut(handle).ok_or(SceneError::UnknownNode(handle))?;
        node.visible = visible;
        Ok(())
    }

    /// Removes a node and all its descendants, releasing their meshes and materials.
    ///
    /// Releasing the root clears its children but keeps the root itself.
    /// Unknown handles release nothing. Returns the number of nodes removed.
    pub fn release_subtree(&mut self, handle: NodeHandle) -> usize {
        if handle == self.root {
            return self.clear_children(handle);
        }
        if !self.nodes.contains_key(&handle) {
            return 0;
        }

        self.unlink(handle);
        let doomed = self.descendants(handle);
        for h in &doomed {
            if let Some(node) = self.nodes.remove(h) {
                if let Some(mesh) = node.mesh {
                    self.meshes.release(mesh);
                }
                if let Some(material) = node.material {
                    self.materials.release(material);
                }
            }
        }
        self.dirty = true;
        doomed.len()
    }

    /// Releases every child subtree of a node.
    pub fn clear_children(&mut self, handle: NodeHandle) -> usize {
        let children = self.children(handle).to_vec();
        children.into_iter().map(|c| self.release_subtree(c)).sum()
    }

    /// Copies a subtree under `parent`. Meshes and materials are shared, not duplicated.
    pub fn clone_subtree(&mut self, source: NodeHandle, parent: NodeHandle) -> Result<NodeHandle, SceneError> {
        self.ensure_live()?;
        self.ensure_node(parent)?;
        let node = self.nodes.get(&source).cloned().ok_or(SceneError::UnknownNode(source))?;

        let handle = self.create_node(node.name, node.transform)?;
        if let Some(copy) = self.nodes.get_mut(&handle) {
            copy.visible = node.visible;
            copy.mesh = node.mesh;
            copy.material = node.material;
        }
        if let Some(mesh) = node.mesh {
            self.meshes.retain(mesh);
        }
        if let Some(material) = node.material {
            self.materials.retain(material);
        }
        self.link(handle, parent);

        for child in node.children {
            self.clone_subtree(child, handle)?;
        }
        Ok(handle)
    }

    /// Builds nodes for a decoded asset under `parent`, uploading its meshes.
    pub fn instantiate(&mut self, asset: &AssetNode, parent: NodeHandle) -> Result<NodeHandle, SceneError> {
        let handle = match &asset.mesh {
            Some(mesh) => self.add_mesh_node(
                parent,
                asset.name.clone(),
                mesh.clone(),
                asset.material.clone().unwrap_or_default(),
                asset.transform,
            )?,
            None => self.add_node(parent, asset.name.clone(), asset.transform)?,
        };

        for child in &asset.children {
            self.instantiate(child, handle)?;
        }
        Ok(handle)
    }

    /// Depth-first search for a node by name, starting at (and including) `from`.
    pub fn find_by_name(&self, from: NodeHandle, name: &str) -> Option<NodeHandle> {
        self.descendants(from)
            .into_iter()
            .find(|h| self.nodes.get(h).is_some_and(|n| n.name == name))
    }

    /// `handle` and all nodes below it, parents before children.
    pub fn descendants(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![handle];
        while let Some(h) = stack.pop() {
            let Some(node) = self.nodes.get(&h) else {
                continue;
            };
            out.push(h);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Model matrix of a node, composed from the root down.
    pub fn world_matrix(&self, handle: NodeHandle) -> Option<Mat4> {
        let mut node = self.nodes.get(&handle)?;
        let mut matrix = node.transform.to_mat4();
        while let Some(parent) = node.parent {
            node = self.nodes.get(&parent)?;
            matrix = node.transform.to_mat4() * matrix;
        }
        Some(matrix)
    }

    /// World-space bounds of every mesh in a subtree. Empty for unknown handles.
    pub fn world_bounds(&self, handle: NodeHandle) -> BoundingBox {
        self.descendants(handle)
            .into_iter()
            .filter_map(|h| {
                let mesh = self.nodes.get(&h)?.mesh?;
                let bounds = self.meshes.get(mesh)?.bounds;
                Some(bounds.transform(&self.world_matrix(h)?))
            })
            .fold(BoundingBox::empty(), |acc, b| acc.union(&b))
    }

    /// True if the node and all its ancestors are visible and it hangs off the root.
    pub fn is_visible_in_world(&self, handle: NodeHandle) -> bool {
        let mut current = Some(handle);
        while let Some(h) = current {
            let Some(node) = self.nodes.get(&h) else {
                return false;
            };
            if !node.visible {
                return false;
            }
            if h == self.root {
                return true;
            }
            current = node.parent;
        }
        false
    }

    /// Releases every node, mesh, material and light. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let removed = self.clear_children(self.root);
        self.meshes.clear();
        self.materials.clear();
        self.lights.clear();
        self.disposed = true;
        tracing::debug!(nodes = removed, "Disposed scene graph");
    }

    fn ensure_live(&self) -> Result<(), SceneError> {
        if self.disposed {
            Err(SceneError::Disposed)
        } else {
            Ok(())
        }
    }

    fn ensure_node(&self, handle: NodeHandle) -> Result<(), SceneError> {
        if self.nodes.contains_key(&handle) {
            Ok(())
        } else {
            Err(SceneError::UnknownNode(handle))
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeHandle, mut handle: NodeHandle) -> bool {
        loop {
            if handle == ancestor {
                return true;
            }
            match self.nodes.get(&handle).and_then(|n| n.parent) {
                Some(parent) => handle = parent,
                None => return false,
            }
        }
    }

    fn link(&mut self, child: NodeHandle, parent: NodeHandle) {
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
        self.dirty = true;
    }

    fn unlink(&mut self, child: NodeHandle) {
        let parent = self.nodes.get_mut(&child).and_then(|n| n.parent.take());
        if let Some(parent) = parent
            && let Some(node) = self.nodes.get_mut(&parent)
        {
            node.children.retain(|c| *c != child);
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
