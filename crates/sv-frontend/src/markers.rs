//! Committed marker rendering.
//!
//! Both groups are rebuilt from scratch on every list change: the previous
//! instances are released first, so rebuilding with the same list twice
//! yields the same scene.

use glam::Vec3;
use sv_core::{CameraPose, CameraRecord, FirePose, FireRecord};
use sv_renderer::{CameraMarker, SceneError, Transform};

use crate::scene_manager::ViewerScene;

/// Placement of a fire instance: scaled by `scale * base_scale` and lifted so
/// that a height of zero rests the template's lowest point on the ground.
pub fn fire_transform(pose: FirePose, template_min_y: f32, base_scale: f64) -> Transform {
    let scale = (pose.scale * base_scale) as f32;
    let y_offset = -template_min_y * scale;
    Transform::from_translation(Vec3::new(pose.x as f32, pose.y as f32 + y_offset, pose.z as f32))
        .with_scale(Vec3::splat(scale))
}

/// Base position of a camera marker.
pub fn camera_position(pose: &CameraPose) -> Vec3 {
    Vec3::new(pose.x as f32, pose.y as f32, pose.z as f32)
}

/// Rebuilds the fire group. Does nothing until the fire template has loaded.
///
/// Returns the number of instances created.
pub fn render_fires(scene: &mut ViewerScene, fires: &[FireRecord], base_scale: f64) -> Result<usize, SceneError> {
    let Some(template) = scene.fire_template else {
        return Ok(0);
    };

    scene.graph.clear_children(scene.fire_group);
    for fire in fires {
        let instance = scene.graph.clone_subtree(template.node, scene.fire_group)?;
        scene
            .graph
            .set_transform(instance, fire_transform(fire.pose(), template.min_y, base_scale))?;
    }

    tracing::debug!(count = fires.len(), "Rendered fires");
    Ok(fires.len())
}

/// Rebuilds the camera group with a fresh rig per record.
pub fn render_cameras(scene: &mut ViewerScene, cameras: &[CameraRecord]) -> Result<usize, SceneError> {
    scene.graph.clear_children(scene.camera_group);
    for camera in cameras {
        let marker = CameraMarker::spawn(&mut scene.graph, scene.camera_group)?;
        let pose = camera.pose();
        marker.set_pose(&mut scene.graph, camera_position(&pose), pose.yaw as f32, pose.pitch as f32)?;
    }

    tracing::debug!(count = cameras.len(), "Rendered cameras");
    Ok(cameras.len())
}
