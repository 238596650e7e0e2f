//! Per-frame scene updates

use crate::scene_manager::ViewerScene;

/// Turns every committed and draft fire about Y to face the viewer horizontally.
pub fn billboard_fires(scene: &mut ViewerScene) {
    let eye = scene.camera.position;
    let fires: Vec<_> = scene
        .graph
        .children(scene.fire_group)
        .iter()
        .copied()
        .chain(scene.draft_fire)
        .collect();

    for handle in fires {
        if let Some(node) = scene.graph.node_mut(handle) {
            node.transform.face_horizontally(eye);
        }
    }
}

/// Advances orbit damping and billboarding. Returns true if the camera moved.
pub fn advance(scene: &mut ViewerScene) -> bool {
    let moved = scene.orbit.update(&mut scene.camera);
    billboard_fires(scene);
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::markers::render_fires;
    use approx::assert_relative_eq;
    use chrono::Utc;
    use glam::Vec3;
    use sv_core::FireRecord;
    use sv_renderer::{AssetNode, Material, geometry};
    use uuid::Uuid;

    #[test]
    fn test_fires_face_viewer_without_tilting() {
        let mut scene = ViewerScene::build(&ViewerConfig::new(), 1, "site.glb").unwrap();
        scene
            .install_fire_template(&AssetNode::mesh("flame", geometry::cuboid(1.0, 1.0, 1.0), Material::default()))
            .unwrap();
        let fire = FireRecord {
            id: Uuid::new_v4(),
            name: "F".into(),
            x: 1.0,
            y: 0.0,
            z: 1.0,
            scale: 1.0,
            created_at: Utc::now(),
        };
        render_fires(&mut scene, &[fire], 0.5).unwrap();

        scene.camera.position = Vec3::new(1.0, 10.0, 6.0);
        billboard_fires(&mut scene);

        let instance = scene.graph.children(scene.fire_group)[0];
        let facing = scene.graph.node(instance).unwrap().transform.rotation * Vec3::Z;
        assert_relative_eq!(facing.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(facing.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(facing.z, 1.0, epsilon = 1e-6);

        let draft = scene.draft_fire.unwrap();
        let facing = scene.graph.node(draft).unwrap().transform.rotation * Vec3::Z;
        assert_relative_eq!(facing.y, 0.0, epsilon = 1e-6);
    }
}
