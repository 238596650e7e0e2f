//! Looking through a committed camera marker

use glam::{EulerRot, Quat, Vec3};
use sv_core::CameraPose;

use crate::config::FocusConfig;
use crate::markers::camera_position;
use crate::props::ViewerProps;
use crate::scene_manager::ViewerScene;

/// Viewing camera placement that looks through a marker's lens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusView {
    pub eye: Vec3,
    pub target: Vec3,
    pub forward: Vec3,
}

/// Direction a marker with the given yaw and pitch (degrees) looks in.
pub fn marker_forward(yaw_deg: f64, pitch_deg: f64) -> Vec3 {
    let orientation = Quat::from_euler(
        EulerRot::YXZ,
        (yaw_deg as f32).to_radians(),
        (pitch_deg as f32).to_radians(),
        0.0,
    );
    (orientation * Vec3::Z).normalize()
}

/// Eye slightly up and forward of the marker base, target further along the view.
pub fn focus_view(pose: &CameraPose, config: &FocusConfig) -> FocusView {
    let forward = marker_forward(pose.yaw, pose.pitch);
    let eye = camera_position(pose) + Vec3::new(0.0, config.eye_height, 0.0) + forward * config.lens_offset;
    FocusView {
        eye,
        target: eye + forward * config.look_distance,
        forward,
    }
}

/// Jumps the viewing camera to the active committed camera, if it resolves.
///
/// Returns true if the view moved.
pub fn focus_active_camera(scene: &mut ViewerScene, props: &ViewerProps, config: &FocusConfig) -> bool {
    let Some(id) = props.active_camera_id else {
        return false;
    };
    let Some(record) = props.cameras.iter().find(|c| c.id == id) else {
        tracing::debug!(%id, "Active camera is not among the committed cameras");
        return false;
    };

    let view = focus_view(&record.pose(), config);
    scene.camera.position = view.eye;
    scene.orbit.target = view.target;
    scene.orbit.update(&mut scene.camera);
    tracing::debug!(%id, tick = props.focus_tick, "Focused camera");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_forward_convention() {
        let f = marker_forward(0.0, 0.0);
        assert_relative_eq!(f.z, 1.0);

        let f = marker_forward(90.0, 0.0);
        assert_relative_eq!(f.x, 1.0, epsilon = 1e-6);

        // Positive pitch tips +Z toward -Y
        let f = marker_forward(0.0, 30.0);
        assert!(f.y < 0.0);
        assert_relative_eq!(f.y, -(30f32.to_radians().sin()), epsilon = 1e-6);
    }

    #[test]
    fn test_focus_scenario() {
        let pose = CameraPose::new(0.0, 2.0, 0.0, 0.0, -20.0);
        let view = focus_view(&pose, &FocusConfig::default());

        let pitch = (-20f32).to_radians();
        let forward = Vec3::new(0.0, -pitch.sin(), pitch.cos());
        let eye = Vec3::new(0.0, 2.0, 0.0) + Vec3::new(0.0, 0.26, 0.0) + forward * 0.42;
        let target = eye + forward * 3.0;

        assert_relative_eq!(view.eye.x, eye.x, epsilon = 1e-6);
        assert_relative_eq!(view.eye.y, eye.y, epsilon = 1e-6);
        assert_relative_eq!(view.eye.z, eye.z, epsilon = 1e-6);
        assert_relative_eq!(view.target.y, target.y, epsilon = 1e-5);
        assert_relative_eq!(view.target.z, target.z, epsilon = 1e-5);
        assert_relative_eq!(view.target.distance(view.eye), 3.0, epsilon = 1e-5);
    }
}
