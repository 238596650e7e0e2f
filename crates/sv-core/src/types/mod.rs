//! Marker record types

mod camera;
mod drag;
mod fire;
pub mod numeric;

pub use camera::{CameraDraft, CameraPatch, CameraPose, CameraRecord};
pub use drag::DragMode;
pub use fire::{FireDraft, FireMove, FirePose, FireRecord};
pub use numeric::round3;
