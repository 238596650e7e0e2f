//! Ray picking against scene hierarchies

use glam::Vec3;

use crate::ray::Ray;
use crate::scene::{NodeHandle, SceneGraph};

/// Closest ray intersection with a mesh node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The mesh node that was hit
    pub node: NodeHandle,
    pub distance: f32,
    pub point: Vec3,
}

/// Cast a ray against every visible mesh in the subtree under `root`.
///
/// Back faces are skipped unless the node's material is double sided.
/// Returns the nearest hit, if any.
pub fn raycast(scene: &SceneGraph, root: NodeHandle, ray: &Ray) -> Option<RayHit> {
    let mut closest: Option<RayHit> = None;

    for handle in scene.descendants(root) {
        let Some(node) = scene.node(handle) else {
            continue;
        };
        let Some(mesh) = node.mesh().and_then(|m| scene.mesh(m)) else {
            continue;
        };
        if !scene.is_visible_in_world(handle) {
            continue;
        }
        let Some(transform) = scene.world_matrix(handle) else {
            continue;
        };

        // First check AABB for early rejection
        if ray.intersect_aabb(&mesh.bounds.transform(&transform)).is_none() {
            continue;
        }

        let double_sided = node
            .material()
            .and_then(|m| scene.material(m))
            .is_some_and(|m| m.double_sided);

        for [v0, v1, v2] in mesh.triangles() {
            let v0 = transform.transform_point3(v0);
            let v1 = transform.transform_point3(v1);
            let v2 = transform.transform_point3(v2);

            if let Some(t) = ray.intersect_triangle(v0, v1, v2, !double_sided)
                && closest.is_none_or(|c| t < c.distance)
            {
                closest = Some(RayHit {
                    node: handle,
                    distance: t,
                    point: ray.at(t),
                });
            }
        }
    }

    closest
}
