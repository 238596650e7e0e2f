//! Scene editing state owned by the viewer's host.
//!
//! The viewer never mutates markers itself; it proposes deltas. The editor is
//! the canonical state those deltas are merged into, and the source of the
//! props the viewer renders.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::scene::SceneDocument;
use crate::types::{
    CameraDraft, CameraPatch, CameraRecord, DragMode, FireDraft, FireMove, FireRecord, round3,
};

/// Editable field of the fire draft.
#[derive(Debug, Clone, PartialEq)]
pub enum FireField {
    Name(String),
    X(f64),
    Y(f64),
    Z(f64),
    Scale(f64),
}

/// Editable field of the camera draft.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraField {
    Name(String),
    X(f64),
    Y(f64),
    Z(f64),
    Yaw(f64),
    Pitch(f64),
}

/// Camera position axis, for step nudges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Canonical marker state of one open project.
#[derive(Debug, Clone, Default)]
pub struct SceneEditor {
    fires: Vec<FireRecord>,
    cameras: Vec<CameraRecord>,
    draft_fire: Option<FireDraft>,
    draft_camera: Option<CameraDraft>,
    /// Committed camera currently loaded into the camera draft.
    editing_camera_id: Option<Uuid>,
    drag_mode: DragMode,
    active_camera_id: Option<Uuid>,
    focus_tick: u64,
}

impl SceneEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(scene: SceneDocument) -> Self {
        Self {
            fires: scene.fires,
            cameras: scene.cameras,
            ..Self::default()
        }
    }

    /// Committed markers, as they should be saved.
    pub fn document(&self) -> SceneDocument {
        SceneDocument::new(self.fires.clone(), self.cameras.clone())
    }

    /// Replace the committed markers (e.g. after an import).
    pub fn replace_document(&mut self, scene: SceneDocument) {
        self.fires = scene.fires;
        self.cameras = scene.cameras;
        if let Some(id) = self.editing_camera_id
            && !self.cameras.iter().any(|c| c.id == id)
        {
            self.editing_camera_id = None;
        }
    }

    pub fn fires(&self) -> &[FireRecord] {
        &self.fires
    }

    pub fn cameras(&self) -> &[CameraRecord] {
        &self.cameras
    }

    /// Committed cameras to render; the one being edited is shown as the draft instead.
    pub fn visible_cameras(&self) -> Vec<CameraRecord> {
        self.cameras
            .iter()
            .filter(|c| Some(c.id) != self.editing_camera_id)
            .cloned()
            .collect()
    }

    pub fn draft_fire(&self) -> Option<&FireDraft> {
        self.draft_fire.as_ref()
    }

    pub fn draft_camera(&self) -> Option<&CameraDraft> {
        self.draft_camera.as_ref()
    }

    pub fn editing_camera_id(&self) -> Option<Uuid> {
        self.editing_camera_id
    }

    pub fn drag_mode(&self) -> DragMode {
        self.drag_mode
    }

    pub fn active_camera_id(&self) -> Option<Uuid> {
        self.active_camera_id
    }

    pub fn focus_tick(&self) -> u64 {
        self.focus_tick
    }

    // ========== Fire drafts ==========

    /// Show a fresh fire draft at the origin.
    pub fn start_fire(&mut self) {
        self.draft_fire = Some(FireDraft::default());
    }

    pub fn discard_fire(&mut self) {
        self.draft_fire = None;
    }

    /// Edit one field of the fire draft, creating the draft if needed.
    pub fn update_fire(&mut self, field: FireField) {
        let draft = self.draft_fire.get_or_insert_with(FireDraft::default);
        match field {
            FireField::Name(name) => draft.name = name,
            FireField::X(x) => draft.x = x,
            FireField::Y(y) => draft.y = y.max(0.0),
            FireField::Z(z) => draft.z = z,
            FireField::Scale(scale) => draft.scale = scale,
        }
    }

    /// Merge a drag delta proposed by the viewer. Ignored without a draft.
    pub fn apply_fire_move(&mut self, delta: FireMove) {
        if let Some(draft) = self.draft_fire.as_mut() {
            draft.apply_move(delta);
        }
    }

    /// Commit the fire draft to the list. Returns the new record.
    pub fn commit_fire(&mut self, now: DateTime<Utc>) -> Option<&FireRecord> {
        let draft = self.draft_fire.take()?;
        let name = draft.name.trim();
        let fire = FireRecord {
            id: Uuid::new_v4(),
            name: if name.is_empty() {
                format!("Fire {}", self.fires.len() + 1)
            } else {
                name.to_string()
            },
            x: round3(draft.x),
            y: round3(draft.y.max(0.0)),
            z: round3(draft.z),
            scale: round3(draft.scale),
            created_at: now,
        };
        tracing::debug!(id = %fire.id, name = %fire.name, "Committed fire");
        self.fires.push(fire);
        self.fires.last()
    }

    /// Load a committed fire into the draft for repositioning.
    pub fn edit_fire(&mut self, id: Uuid) -> bool {
        match self.fires.iter().find(|f| f.id == id) {
            Some(fire) => {
                self.draft_fire = Some(FireDraft::from_record(fire));
                true
            }
            None => false,
        }
    }

    pub fn remove_fire(&mut self, id: Uuid) -> bool {
        let before = self.fires.len();
        self.fires.retain(|f| f.id != id);
        self.fires.len() != before
    }

    // ========== Camera drafts ==========

    /// Show a fresh camera draft; any camera being edited is released.
    pub fn start_camera(&mut self) {
        self.draft_camera = Some(CameraDraft::default());
        self.editing_camera_id = None;
    }

    pub fn discard_camera(&mut self) {
        self.draft_camera = None;
        self.editing_camera_id = None;
    }

    /// Edit one field of the camera draft. Ignored without a draft.
    pub fn update_camera(&mut self, field: CameraField) {
        let Some(draft) = self.draft_camera.as_mut() else {
            return;
        };
        match field {
            CameraField::Name(name) => draft.name = name,
            CameraField::X(x) => draft.x = x,
            CameraField::Y(y) => draft.y = y.max(0.0),
            CameraField::Z(z) => draft.z = z,
            CameraField::Yaw(yaw) => draft.yaw = yaw,
            CameraField::Pitch(pitch) => draft.pitch = pitch,
        }
    }

    /// Step the camera draft along one axis; height never goes below the ground.
    pub fn nudge_camera(&mut self, axis: Axis, delta: f64) {
        let Some(draft) = self.draft_camera.as_mut() else {
            return;
        };
        match axis {
            Axis::X => draft.x = round3(draft.x + delta),
            Axis::Y => draft.y = round3((draft.y + delta).max(0.0)),
            Axis::Z => draft.z = round3(draft.z + delta),
        }
    }

    /// Merge a partial patch proposed by the viewer. Ignored without a draft.
    pub fn apply_camera_patch(&mut self, patch: &CameraPatch) {
        if let Some(draft) = self.draft_camera.as_mut() {
            draft.apply(patch);
        }
    }

    /// Commit the camera draft, replacing the edited camera if there is one.
    pub fn commit_camera(&mut self, now: DateTime<Utc>) -> Option<&CameraRecord> {
        let draft = self.draft_camera.take()?;
        let editing = self.editing_camera_id.take();
        let name = draft.name.trim();
        let camera = CameraRecord {
            id: editing.unwrap_or_else(Uuid::new_v4),
            name: if name.is_empty() {
                format!("Camera {}", self.cameras.len() + 1)
            } else {
                name.to_string()
            },
            x: round3(draft.x),
            y: round3(draft.y.max(0.0)),
            z: round3(draft.z),
            yaw: round3(draft.yaw),
            pitch: round3(draft.pitch),
            created_at: now,
        };

        let id = camera.id;
        match editing.and_then(|id| self.cameras.iter().position(|c| c.id == id)) {
            Some(index) => {
                tracing::debug!(id = %id, "Updated camera");
                self.cameras[index] = camera;
            }
            None => {
                tracing::debug!(id = %id, "Committed camera");
                self.cameras.push(camera);
            }
        }
        self.cameras.iter().find(|c| c.id == id)
    }

    /// Load a committed camera into the draft; it is hidden from the committed list meanwhile.
    pub fn edit_camera(&mut self, id: Uuid) -> bool {
        match self.cameras.iter().find(|c| c.id == id) {
            Some(camera) => {
                self.draft_camera = Some(CameraDraft::from_record(camera));
                self.editing_camera_id = Some(id);
                true
            }
            None => false,
        }
    }

    pub fn remove_camera(&mut self, id: Uuid) -> bool {
        let before = self.cameras.len();
        self.cameras.retain(|c| c.id != id);
        if self.editing_camera_id == Some(id) {
            self.editing_camera_id = None;
            self.draft_camera = None;
        }
        if self.active_camera_id == Some(id) {
            self.active_camera_id = None;
        }
        self.cameras.len() != before
    }

    // ========== Viewer feedback ==========

    pub fn set_drag_mode(&mut self, mode: DragMode) {
        self.drag_mode = mode;
    }

    /// Look through a committed camera. Repeated calls re-trigger the jump.
    pub fn focus_camera(&mut self, id: Uuid) {
        self.active_camera_id = Some(id);
        self.focus_tick = self.focus_tick.wrapping_add(1);
    }
}
