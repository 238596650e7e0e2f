//! Capabilities the viewer consumes from its environment.
//!
//! The viewer never touches windows, files or the network. Everything that
//! needs them goes through [`ViewerHost`]: asset loading, the cursor, input
//! listener registration, display-refresh callbacks, the viewport rectangle
//! and the frame renderer backend.

use serde::{Deserialize, Serialize};
use sv_renderer::{FrameRenderer, Viewport};

/// Which asset a load request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetKind {
    /// The site model
    Model,
    /// The fire marker template
    MarkerTemplate,
}

/// Identifies one asset request. Completions must hand the ticket back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetTicket {
    /// Scene build the request belongs to
    pub generation: u64,
    pub kind: AssetKind,
}

/// Asynchronous "load 3D asset from handle" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub ticket: AssetTicket,
    pub handle: String,
}

/// Host-reported asset load failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssetLoadError {
    #[error("Asset not found: {0}")]
    NotFound(String),
    #[error("Failed to decode asset: {0}")]
    Decode(String),
    #[error("Unsupported asset format: {0}")]
    Unsupported(String),
}

/// Cursor affordance over the viewer surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorIcon {
    /// Idle and ready to drag
    #[default]
    Grab,
    /// Dragging a draft marker
    Grabbing,
}

/// Handle to a requested display-refresh callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Environment of a [`crate::ModelSceneViewer`].
pub trait ViewerHost {
    /// Start loading an asset; answer later through
    /// [`crate::ModelSceneViewer::complete_asset`].
    fn request_asset(&mut self, request: AssetRequest);

    fn set_cursor(&mut self, cursor: CursorIcon);

    /// Start delivering pointer, wheel and resize input.
    fn attach_input(&mut self);

    /// Stop delivering input.
    fn detach_input(&mut self);

    /// Ask for one display-refresh callback; deliver it through
    /// [`crate::ModelSceneViewer::on_animation_frame`].
    fn request_frame(&mut self) -> FrameToken;

    fn cancel_frame(&mut self, token: FrameToken);

    /// Current on-screen rectangle and device pixel ratio.
    fn viewport(&self) -> Viewport;

    /// A fresh render backend for a new scene. The viewer disposes it on teardown.
    fn create_renderer(&mut self) -> Box<dyn FrameRenderer>;
}
