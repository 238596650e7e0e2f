//! Scene nodes and their local transforms.

use glam::{Mat4, Quat, Vec3};

use crate::resources::{MaterialHandle, MeshHandle, PoolHandle};

/// Handle to a node of a [`super::SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(u64);

impl NodeHandle {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Local transform: translation, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Turn about the vertical axis only so that local +Z faces `target`
    /// horizontally. Leaves the rotation untouched when the target is straight
    /// above or below.
    pub fn face_horizontally(&mut self, target: Vec3) {
        let dx = target.x - self.translation.x;
        let dz = target.z - self.translation.z;
        if dx.abs() < f32::EPSILON && dz.abs() < f32::EPSILON {
            return;
        }
        self.rotation = Quat::from_rotation_y(dx.atan2(dz));
    }
}

/// A node of the scene tree.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    /// Hidden nodes hide their whole subtree.
    pub visible: bool,
    pub(crate) mesh: Option<MeshHandle>,
    pub(crate) material: Option<MaterialHandle>,
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,
}

impl SceneNode {
    pub(crate) fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            visible: true,
            mesh: None,
            material: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(&self) -> Option<MeshHandle> {
        self.mesh
    }

    pub fn material(&self) -> Option<MaterialHandle> {
        self.material
    }

    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    pub fn is_group(&self) -> bool {
        self.mesh.is_none()
    }
}

impl std::fmt::Display for SceneNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.mesh {
            Some(mesh) => write!(f, "{} (mesh {})", self.name, mesh.raw()),
            None => write!(f, "{} ({} children)", self.name, self.children.len()),
        }
    }
}
