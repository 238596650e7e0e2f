//! Decoded asset hierarchies.
//!
//! Hosts decode model files (glTF, USDZ) into an [`AssetNode`] tree. The tree
//! owns plain CPU data and can be instantiated any number of times into a
//! [`super::SceneGraph`].

use glam::Mat4;

use super::{BoundingBox, Transform};
use crate::resources::{Material, MeshData};

/// One node of a decoded asset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssetNode {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<MeshData>,
    /// Used with `mesh`; the default material applies when missing.
    pub material: Option<Material>,
    pub children: Vec<AssetNode>,
}

impl AssetNode {
    /// Empty group node.
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Node carrying a single mesh.
    pub fn mesh(name: impl Into<String>, mesh: MeshData, material: Material) -> Self {
        Self {
            name: name.into(),
            mesh: Some(mesh),
            material: Some(material),
            ..Default::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: AssetNode) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in this tree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(AssetNode::node_count).sum::<usize>()
    }

    /// Bounds of every mesh in the tree, with the root's own transform applied.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds_under(Mat4::IDENTITY)
    }

    fn bounds_under(&self, parent: Mat4) -> BoundingBox {
        let world = parent * self.transform.to_mat4();
        let own = self
            .mesh
            .as_ref()
            .map(|m| m.bounds.transform(&world))
            .unwrap_or_else(BoundingBox::empty);

        self.children
            .iter()
            .fold(own, |acc, child| acc.union(&child.bounds_under(world)))
    }
}
