//! Site Viewer Frontend
//!
//! Interactive 3D scene viewer for placing fire and camera markers on a site
//! model.
//!
//! # Architecture
//!
//! - [`ModelSceneViewer`] - The viewer component driven by its host
//! - [`host::ViewerHost`] - Capabilities the viewer consumes (assets, cursor, frames)
//! - [`props::ViewerProps`] - Snapshot of host state rendered by the viewer
//! - [`events::ViewerEvent`] - Drag results and notifications sent back to the host
//! - [`scene_manager::ViewerScene`] - Scene graph, camera and orbit controls of one model
//! - [`interaction::InteractionController`] - Draft dragging state machine
//! - [`app::SiteViewerApp`] - eframe window hosting the viewer on wgpu
//!
//! # Example
//!
//! ```ignore
//! use sv_frontend::{ModelSceneViewer, ViewerConfig, ViewerProps};
//!
//! let mut viewer = ModelSceneViewer::new(host, ViewerConfig::new());
//! viewer.set_props(ViewerProps::from_editor(&editor, Some(model_url)));
//!
//! // Forward drag results to the editor
//! for event in viewer.drain_events() {
//!     handle(event);
//! }
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod draft;
pub mod events;
pub mod focus;
pub mod host;
pub mod input;
pub mod interaction;
pub mod markers;
pub mod props;
pub mod render_loop;
pub mod replay;
pub mod scene_manager;
pub mod viewer;

pub use config::{ConfigError, ConfigManager, SharedConfig, ViewerConfig, create_shared_config};
pub use events::{EventOutbox, ViewerEvent};
pub use host::{AssetKind, AssetLoadError, AssetRequest, AssetTicket, CursorIcon, FrameToken, ViewerHost};
pub use input::{PointerButton, PointerInput};
pub use interaction::{DragState, InteractionController};
pub use props::ViewerProps;
pub use scene_manager::{FireTemplate, ViewerScene};
pub use viewer::ModelSceneViewer;
