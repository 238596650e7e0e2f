//! Site Viewer Core Data Structures
//!
//! This crate contains the host-side data for the site viewer:
//! - Fire and camera marker records, their drafts and drag patches
//! - Lenient numeric coercion shared by the renderer
//! - Projects, scene documents and the project store interface
//! - The scene editor that owns canonical marker state

pub mod editor;
pub mod project;
pub mod scene;
pub mod store;
pub mod types;

pub use editor::*;
pub use project::*;
pub use scene::*;
pub use store::*;
pub use types::*;
