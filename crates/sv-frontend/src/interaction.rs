//! Pointer interaction state machine.
//!
//! A press that hits the visible draft camera (tested first) or the visible
//! draft fire starts a drag session. Sessions are tagged by what they drag:
//!
//! - `DraggingFire` and `DraggingCameraTranslate` project the pointer ray onto
//!   a horizontal plane at the marker's height and emit `{x, z}`.
//! - `DraggingCameraRotate` maps pointer displacement to yaw and pitch.
//!
//! A session becomes a drag once the pointer has moved at least the click
//! threshold from where it was pressed, and only then emits deltas. A camera
//! session released before that is a click and flips the drag mode.

use glam::{Vec2, Vec3};
use sv_core::{CameraPatch, DragMode, FireMove, FirePose, round3};
use sv_renderer::{NodeHandle, Ray, SceneError, Viewport, raycast};

use crate::config::ViewerConfig;
use crate::events::{EventOutbox, ViewerEvent};
use crate::input::PointerInput;
use crate::markers::fire_transform;
use crate::props::ViewerProps;
use crate::scene_manager::ViewerScene;

/// Session of a drag across a horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneDrag {
    pub start: Vec2,
    pub moved: bool,
    /// Marker position minus the plane point under the pointer at press time
    pub grab_offset: Vec3,
}

/// Session of a camera rotation drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateDrag {
    pub start: Vec2,
    pub moved: bool,
    pub start_yaw: f64,
    pub start_pitch: f64,
}

/// Current drag session.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    DraggingFire(PlaneDrag),
    DraggingCameraTranslate(PlaneDrag),
    DraggingCameraRotate(RotateDrag),
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        !matches!(self, DragState::Idle)
    }
}

/// Sticky: once a session has moved past the threshold it stays a drag.
fn track(start: Vec2, moved: &mut bool, position: Vec2, threshold: f32) {
    let delta = (position - start).abs();
    if delta.x >= threshold || delta.y >= threshold {
        *moved = true;
    }
}

/// Yaw and pitch after dragging by `delta` pixels from the starting orientation.
pub fn rotate_by(start_yaw: f64, start_pitch: f64, delta: Vec2, sensitivity: f64, pitch_limit: f64) -> (f64, f64) {
    let yaw = start_yaw + delta.x as f64 * sensitivity;
    let pitch = (start_pitch - delta.y as f64 * sensitivity).clamp(-pitch_limit, pitch_limit);
    (yaw, pitch)
}

/// Offset from the plane point under the ray to the marker. Zero when the
/// ray misses the plane.
fn grab_offset(ray: &Ray, height: f32, position: Vec3) -> Vec3 {
    ray.intersect_horizontal_plane(height)
        .map(|hit| position - hit)
        .unwrap_or(Vec3::ZERO)
}

/// Where a plane drag puts the marker: the plane point under the ray shifted
/// by the grab offset, kept on the plane.
fn drag_target(ray: &Ray, height: f32, grab_offset: Vec3) -> Option<Vec3> {
    ray.intersect_horizontal_plane(height)
        .map(|hit| Vec3::new(hit.x + grab_offset.x, height, hit.z + grab_offset.z))
}

fn fire_move(position: Vec3) -> FireMove {
    FireMove {
        x: round3(position.x as f64),
        z: round3(position.z as f64),
    }
}

/// Drives draft dragging from pointer events.
#[derive(Debug, Default)]
pub struct InteractionController {
    state: DragState,
    mode: DragMode,
}

impl InteractionController {
    pub fn new(mode: DragMode) -> Self {
        Self {
            state: DragState::Idle,
            mode,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn mode(&self) -> DragMode {
        self.mode
    }

    /// Drops any session in progress. The drag mode is kept.
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }

    /// Hit-tests the drafts and starts a session. Returns true if one started.
    pub fn pointer_down(
        &mut self,
        scene: &ViewerScene,
        props: &ViewerProps,
        config: &ViewerConfig,
        viewport: &Viewport,
        input: &PointerInput,
    ) -> bool {
        let Some(ndc) = viewport.to_ndc(input.x, input.y) else {
            return false;
        };
        let ray = scene.camera.ray_from_ndc(ndc);
        let start = input.position();

        if let Some(draft) = props.draft_camera.as_ref()
            && hits(scene, scene.draft_camera.root, &ray)
        {
            let pose = draft.pose();
            self.state = match self.mode {
                DragMode::Translate => {
                    let position = node_position(scene, scene.draft_camera.root);
                    DragState::DraggingCameraTranslate(PlaneDrag {
                        start,
                        moved: false,
                        grab_offset: grab_offset(&ray, pose.y as f32, position),
                    })
                }
                DragMode::Rotate => DragState::DraggingCameraRotate(RotateDrag {
                    start,
                    moved: false,
                    start_yaw: pose.yaw,
                    start_pitch: pose.pitch,
                }),
            };
            tracing::debug!(mode = self.mode.name(), "Started camera drag");
            return true;
        }

        if let (Some(draft), Some(node)) = (props.draft_fire.as_ref(), scene.draft_fire)
            && hits(scene, node, &ray)
        {
            let height = fire_plane_height(scene, draft.pose(), config);
            self.state = DragState::DraggingFire(PlaneDrag {
                start,
                moved: false,
                grab_offset: grab_offset(&ray, height, node_position(scene, node)),
            });
            tracing::debug!("Started fire drag");
            return true;
        }

        false
    }

    /// Continues the session. Returns true if a session consumed the move.
    ///
    /// Moves whose ray misses the drag plane are skipped; the session stays active.
    pub fn pointer_move(
        &mut self,
        scene: &mut ViewerScene,
        props: &ViewerProps,
        config: &ViewerConfig,
        viewport: &Viewport,
        input: &PointerInput,
        events: &mut EventOutbox,
    ) -> Result<bool, SceneError> {
        let threshold = config.interaction.click_threshold;
        let position = input.position();
        let ray = viewport.to_ndc(input.x, input.y).map(|ndc| scene.camera.ray_from_ndc(ndc));

        match &mut self.state {
            DragState::Idle => Ok(false),

            DragState::DraggingFire(drag) => {
                track(drag.start, &mut drag.moved, position, threshold);
                let (true, Some(ray), Some(node)) = (drag.moved, ray, scene.draft_fire) else {
                    return Ok(true);
                };
                let pose = props
                    .draft_fire
                    .as_ref()
                    .map(|d| d.pose())
                    .unwrap_or_else(|| FirePose::new(0.0, 0.0, 0.0, 1.0));
                let height = fire_plane_height(scene, pose, config);
                let Some(placed) = drag_target(&ray, height, drag.grab_offset) else {
                    return Ok(true);
                };

                set_translation(scene, node, placed)?;
                events.push(ViewerEvent::DraftFireMoved(fire_move(placed)));
                Ok(true)
            }

            DragState::DraggingCameraTranslate(drag) => {
                track(drag.start, &mut drag.moved, position, threshold);
                let (true, Some(ray)) = (drag.moved, ray) else {
                    return Ok(true);
                };
                let height = props.draft_camera.as_ref().map(|d| d.pose().y as f32).unwrap_or(0.0);
                let Some(placed) = drag_target(&ray, height, drag.grab_offset) else {
                    return Ok(true);
                };

                let root = scene.draft_camera.root;
                set_translation(scene, root, placed)?;
                events.push(ViewerEvent::DraftCameraChanged(CameraPatch::position(
                    round3(placed.x as f64),
                    round3(placed.z as f64),
                )));
                Ok(true)
            }

            DragState::DraggingCameraRotate(drag) => {
                track(drag.start, &mut drag.moved, position, threshold);
                if !drag.moved {
                    return Ok(true);
                }

                let interaction = &config.interaction;
                let (yaw, pitch) = rotate_by(
                    drag.start_yaw,
                    drag.start_pitch,
                    position - drag.start,
                    interaction.rotate_sensitivity,
                    interaction.pitch_limit,
                );
                let marker = scene.draft_camera;
                let root = scene
                    .graph
                    .node(marker.root)
                    .map(|n| n.transform.translation)
                    .ok_or(SceneError::UnknownNode(marker.root))?;
                marker.set_pose(&mut scene.graph, root, yaw as f32, pitch as f32)?;

                events.push(ViewerEvent::DraftCameraChanged(CameraPatch::orientation(
                    round3(yaw),
                    round3(pitch),
                )));
                Ok(true)
            }
        }
    }

    /// Ends the session. A camera session that never became a drag flips the
    /// drag mode. Returns true if a session was active.
    pub fn pointer_up(&mut self, events: &mut EventOutbox) -> bool {
        let state = std::mem::take(&mut self.state);
        let camera_click = match state {
            DragState::DraggingCameraTranslate(drag) => !drag.moved,
            DragState::DraggingCameraRotate(drag) => !drag.moved,
            DragState::DraggingFire(_) | DragState::Idle => false,
        };

        if camera_click {
            self.mode = self.mode.toggled();
            tracing::debug!(mode = self.mode.name(), "Toggled camera drag mode");
            events.push(ViewerEvent::DragModeChanged { mode: self.mode });
        }
        state.is_dragging()
    }
}

fn hits(scene: &ViewerScene, node: NodeHandle, ray: &Ray) -> bool {
    raycast(&scene.graph, node, ray).is_some()
}

fn node_position(scene: &ViewerScene, node: NodeHandle) -> Vec3 {
    scene
        .graph
        .node(node)
        .map(|n| n.transform.translation)
        .unwrap_or(Vec3::ZERO)
}

fn set_translation(scene: &mut ViewerScene, node: NodeHandle, translation: Vec3) -> Result<(), SceneError> {
    let node = scene.graph.node_mut(node).ok_or(SceneError::UnknownNode(node))?;
    node.transform.translation = translation;
    Ok(())
}

/// Height of the fire drag plane: the draft's effective rendered height.
fn fire_plane_height(scene: &ViewerScene, pose: FirePose, config: &ViewerConfig) -> f32 {
    let min_y = scene.fire_template.map(|t| t.min_y).unwrap_or(0.0);
    fire_transform(pose, min_y, config.markers.fire_base_scale).translation.y
}
