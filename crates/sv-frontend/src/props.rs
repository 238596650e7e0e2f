//! Host state snapshot fed to the viewer

use serde::{Deserialize, Serialize};
use sv_core::{CameraDraft, CameraRecord, FireDraft, FireRecord, SceneEditor};
use uuid::Uuid;

/// Everything the viewer renders, as owned by the host.
///
/// The viewer keeps the latest snapshot and reads it from its input handlers;
/// it never holds on to host state otherwise.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerProps {
    /// Handle of the site model; no scene is built without one.
    pub model: Option<String>,
    pub fires: Vec<FireRecord>,
    pub cameras: Vec<CameraRecord>,
    pub draft_fire: Option<FireDraft>,
    pub draft_camera: Option<CameraDraft>,
    pub active_camera_id: Option<Uuid>,
    /// Bumped to re-focus even when the active camera is unchanged.
    pub focus_tick: u64,
}

impl ViewerProps {
    /// Snapshot of an editor's state. The camera being edited is shown as the
    /// draft only, not among the committed cameras.
    pub fn from_editor(editor: &SceneEditor, model: Option<String>) -> Self {
        Self {
            model,
            fires: editor.fires().to_vec(),
            cameras: editor.visible_cameras(),
            draft_fire: editor.draft_fire().cloned(),
            draft_camera: editor.draft_camera().cloned(),
            active_camera_id: editor.active_camera_id(),
            focus_tick: editor.focus_tick(),
        }
    }

    /// Model handle to load. Blank handles count as no model.
    pub fn model_handle(&self) -> Option<&str> {
        self.model.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }

    /// True if the active camera, the focus tick or the committed cameras differ.
    pub(crate) fn focus_changed(&self, previous: &ViewerProps) -> bool {
        self.active_camera_id != previous.active_camera_id
            || self.focus_tick != previous.focus_tick
            || self.cameras != previous.cameras
    }
}
