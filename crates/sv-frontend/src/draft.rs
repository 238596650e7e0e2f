//! Draft marker mirroring.
//!
//! The draft fire and draft camera are always present in the scene; they are
//! shown and placed from the host's draft records, or hidden when there is none.

use sv_core::{CameraDraft, FireDraft};
use sv_renderer::SceneError;

use crate::markers::{camera_position, fire_transform};
use crate::scene_manager::ViewerScene;

/// Places (or hides) the draft fire. Does nothing until the template has loaded.
pub fn sync_draft_fire(scene: &mut ViewerScene, draft: Option<&FireDraft>, base_scale: f64) -> Result<(), SceneError> {
    let (Some(node), Some(template)) = (scene.draft_fire, scene.fire_template) else {
        return Ok(());
    };

    match draft {
        Some(draft) => {
            let placed = fire_transform(draft.pose(), template.min_y, base_scale);
            let node = scene.graph.node_mut(node).ok_or(SceneError::UnknownNode(node))?;
            // Billboarding owns the rotation
            node.transform.translation = placed.translation;
            node.transform.scale = placed.scale;
            node.visible = true;
        }
        None => scene.graph.set_visible(node, false)?,
    }
    Ok(())
}

/// Places (or hides) the draft camera rig.
pub fn sync_draft_camera(scene: &mut ViewerScene, draft: Option<&CameraDraft>) -> Result<(), SceneError> {
    let marker = scene.draft_camera;
    match draft {
        Some(draft) => {
            let pose = draft.pose();
            marker.set_pose(&mut scene.graph, camera_position(&pose), pose.yaw as f32, pose.pitch as f32)?;
            scene.graph.set_visible(marker.root, true)
        }
        None => scene.graph.set_visible(marker.root, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use approx::assert_relative_eq;
    use glam::Vec3;
    use sv_renderer::{AssetNode, Material, geometry};

    fn scene() -> ViewerScene {
        let mut scene = ViewerScene::build(&ViewerConfig::new(), 1, "site.glb").unwrap();
        let asset = AssetNode::mesh("flame", geometry::cuboid(1.0, 2.0, 1.0), Material::default());
        scene.install_fire_template(&asset).unwrap();
        scene
    }

    #[test]
    fn test_draft_fire_visibility_and_placement() {
        let mut scene = scene();
        let node = scene.draft_fire.unwrap();

        let draft = FireDraft {
            x: 1.0,
            y: 0.5,
            z: -2.0,
            scale: 2.0,
            ..FireDraft::default()
        };
        sync_draft_fire(&mut scene, Some(&draft), 0.5).unwrap();
        assert!(scene.graph.is_visible_in_world(node));
        let t = scene.graph.node(node).unwrap().transform;
        // min y = -1, scale = 1
        assert_eq!(t.translation, Vec3::new(1.0, 1.5, -2.0));

        sync_draft_fire(&mut scene, None, 0.5).unwrap();
        assert!(!scene.graph.is_visible_in_world(node));
    }

    #[test]
    fn test_draft_camera_round_trip() {
        let mut scene = scene();
        let draft = CameraDraft {
            x: 1.25,
            y: 3.0,
            z: -4.5,
            yaw: 37.5,
            pitch: -22.125,
            ..CameraDraft::default()
        };
        sync_draft_camera(&mut scene, Some(&draft)).unwrap();

        let marker = scene.draft_camera;
        assert!(scene.graph.is_visible_in_world(marker.root));

        let root = scene.graph.node(marker.root).unwrap().transform;
        assert_eq!(root.translation, Vec3::new(1.25, 3.0, -4.5));
        let (yaw, _, _) = root.rotation.to_euler(glam::EulerRot::YXZ);
        assert_relative_eq!(yaw.to_degrees() as f64, draft.yaw, epsilon = 1e-3);

        let pivot = scene.graph.node(marker.head_pivot).unwrap().transform;
        let (_, pitch, _) = pivot.rotation.to_euler(glam::EulerRot::YXZ);
        assert_relative_eq!(pitch.to_degrees() as f64, draft.pitch, epsilon = 1e-3);

        sync_draft_camera(&mut scene, None).unwrap();
        assert!(!scene.graph.is_visible_in_world(marker.root));
    }
}
