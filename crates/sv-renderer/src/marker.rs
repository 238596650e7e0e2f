//! Camera marker rig.
//!
//! A marker is a pole with a head on top. The root turns about Y (yaw) and
//! the head pivot tilts about its X axis (pitch); the head, lens and a
//! translucent view cone all point along the pivot's local +Z.

use glam::{Quat, Vec3};

use crate::constants::marker::*;
use crate::geometry;
use crate::resources::Material;
use crate::scene::{AssetNode, NodeHandle, SceneError, SceneGraph, Transform};

pub const ROOT_NAME: &str = "camera-marker";
pub const HEAD_PIVOT_NAME: &str = "head-pivot";

/// Builds the marker hierarchy. Pure: every call yields fresh geometry.
pub fn camera_marker_asset() -> AssetNode {
    let quarter_turn_x = Quat::from_rotation_x(std::f32::consts::FRAC_PI_2);

    let pole = AssetNode::mesh(
        "pole",
        geometry::cylinder(POLE_RADIUS, POLE_RADIUS, POLE_HEIGHT, 12, false),
        Material::standard(POLE_COLOR, 0.6, 0.3),
    )
    .with_transform(Transform::from_translation(Vec3::new(0.0, POLE_HEIGHT / 2.0, 0.0)));

    let [w, h, d] = HEAD_SIZE;
    let head = AssetNode::mesh(
        "head",
        geometry::cuboid(w, h, d),
        Material::standard(HEAD_COLOR, 0.25, 0.45),
    )
    .with_transform(Transform::from_translation(Vec3::new(0.0, 0.0, HEAD_OFFSET)));

    let lens = AssetNode::mesh(
        "lens",
        geometry::cylinder(LENS_RADIUS, LENS_RADIUS, LENS_LENGTH, 16, false),
        Material::standard(LENS_COLOR, 0.5, 0.2),
    )
    .with_transform(Transform::from_translation(Vec3::new(0.0, 0.0, LENS_OFFSET)).with_rotation(quarter_turn_x));

    let cone = AssetNode::mesh(
        "view-cone",
        geometry::cone(CONE_RADIUS, CONE_LENGTH, 20, true),
        Material::basic(CONE_COLOR)
            .with_opacity(CONE_OPACITY)
            .with_double_sided(true)
            .with_depth_write(false),
    )
    .with_transform(Transform::from_translation(Vec3::new(0.0, 0.0, CONE_OFFSET)).with_rotation(quarter_turn_x));

    let pivot = AssetNode::group(HEAD_PIVOT_NAME)
        .with_transform(Transform::from_translation(Vec3::new(0.0, HEAD_PIVOT_HEIGHT, 0.0)))
        .with_child(head)
        .with_child(lens)
        .with_child(cone);

    AssetNode::group(ROOT_NAME).with_child(pole).with_child(pivot)
}

/// A camera marker living in a scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraMarker {
    pub root: NodeHandle,
    pub head_pivot: NodeHandle,
}

impl CameraMarker {
    /// Instantiates a new marker under `parent`.
    pub fn spawn(scene: &mut SceneGraph, parent: NodeHandle) -> Result<Self, SceneError> {
        let root = scene.instantiate(&camera_marker_asset(), parent)?;
        let head_pivot = scene
            .find_by_name(root, HEAD_PIVOT_NAME)
            .ok_or(SceneError::UnknownNode(root))?;
        Ok(Self { root, head_pivot })
    }

    /// Places the marker base at `position`, turned by `yaw_deg` about Y with
    /// the head tilted by `pitch_deg` about its X axis.
    pub fn set_pose(
        &self,
        scene: &mut SceneGraph,
        position: Vec3,
        yaw_deg: f32,
        pitch_deg: f32,
    ) -> Result<(), SceneError> {
        let root = scene.node_mut(self.root).ok_or(SceneError::UnknownNode(self.root))?;
        root.transform.translation = position;
        root.transform.rotation = Quat::from_rotation_y(yaw_deg.to_radians());

        let pivot = scene
            .node_mut(self.head_pivot)
            .ok_or(SceneError::UnknownNode(self.head_pivot))?;
        pivot.transform.rotation = Quat::from_rotation_x(pitch_deg.to_radians());
        Ok(())
    }

    /// World-space direction the lens points in.
    pub fn forward(&self, scene: &SceneGraph) -> Option<Vec3> {
        let matrix = scene.world_matrix(self.head_pivot)?;
        Some(matrix.transform_vector3(Vec3::Z).normalize_or_zero())
    }

    /// Frees the marker's nodes and geometry.
    pub fn release(self, scene: &mut SceneGraph) -> usize {
        scene.release_subtree(self.root)
    }
}
