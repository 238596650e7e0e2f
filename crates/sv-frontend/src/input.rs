//! Pointer input delivered by the host

use glam::Vec2;
use serde::{Deserialize, Serialize};
use sv_renderer::OrbitAction;

/// Mouse button (or equivalent) of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

impl PointerButton {
    /// Orbit gesture started by this button when no draft is hit.
    pub fn orbit_action(self) -> OrbitAction {
        match self {
            PointerButton::Primary => OrbitAction::Rotate,
            PointerButton::Middle => OrbitAction::Dolly,
            PointerButton::Secondary => OrbitAction::Pan,
        }
    }
}

/// A pointer event in client (CSS pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerInput {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub button: PointerButton,
}

impl PointerInput {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            button: PointerButton::Primary,
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}
