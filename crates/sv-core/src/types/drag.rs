//! Camera drag mode

use serde::{Deserialize, Serialize};

/// What dragging the camera draft does.
///
/// The mode persists across interactions; a click on the camera draft flips it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragMode {
    /// Drag moves the camera across a horizontal plane.
    #[default]
    Translate,
    /// Drag turns the camera (yaw and pitch).
    Rotate,
}

impl DragMode {
    pub fn toggled(self) -> Self {
        match self {
            DragMode::Translate => DragMode::Rotate,
            DragMode::Rotate => DragMode::Translate,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DragMode::Translate => "translate",
            DragMode::Rotate => "rotate",
        }
    }
}
