//! Events the viewer publishes to its host

use std::collections::VecDeque;

use serde::Serialize;
use sv_core::{CameraPatch, DragMode, FireMove, SceneEditor};

use crate::host::AssetKind;

/// Something the host may want to act on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ViewerEvent {
    /// The draft fire was dragged to a new horizontal position.
    DraftFireMoved(FireMove),
    /// Partial update for the draft camera (position or orientation).
    DraftCameraChanged(CameraPatch),
    /// The camera drag mode is now `mode`.
    DragModeChanged { mode: DragMode },
    /// A model or marker template could not be loaded.
    AssetLoadFailed {
        kind: AssetKind,
        handle: String,
        reason: String,
    },
}

impl ViewerEvent {
    /// Folds a drag result back into the editor that owns the markers.
    ///
    /// Load failures carry nothing to merge; hosts report them their own way.
    pub fn apply_to(&self, editor: &mut SceneEditor) {
        match self {
            ViewerEvent::DraftFireMoved(delta) => editor.apply_fire_move(*delta),
            ViewerEvent::DraftCameraChanged(patch) => editor.apply_camera_patch(patch),
            ViewerEvent::DragModeChanged { mode } => editor.set_drag_mode(*mode),
            ViewerEvent::AssetLoadFailed { .. } => {}
        }
    }
}

/// FIFO of events waiting for the host.
#[derive(Debug, Default)]
pub struct EventOutbox {
    queue: VecDeque<ViewerEvent>,
}

impl EventOutbox {
    pub fn push(&mut self, event: ViewerEvent) {
        tracing::trace!(?event, "Viewer event");
        self.queue.push_back(event);
    }

    /// Takes every pending event in emission order.
    pub fn drain(&mut self) -> Vec<ViewerEvent> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
