//! Site Viewer Renderer
//!
//! Backend-agnostic 3D scene for the site viewer.
//!
//! # Architecture
//!
//! - [`scene::SceneGraph`] - Node tree that exclusively owns every mesh and material
//! - [`resources`] - Ref-counted mesh/material pools behind copyable handles
//! - [`geometry`] - Procedural primitives (cylinder, cone, box, plane, grid)
//! - [`camera::PerspectiveCamera`] and [`orbit::OrbitControls`] - Viewing camera and navigation
//! - [`picking`] - Ray casts against node hierarchies
//! - [`marker`] - Camera marker geometry factory
//! - [`frame::FrameRenderer`] - Seam to the backend that draws a frame
//! - [`renderer::WgpuRenderer`] - wgpu backend drawing into an offscreen texture
//!
//! # Example
//!
//! ```ignore
//! use sv_renderer::{SceneGraph, PerspectiveCamera, HeadlessRenderer, FrameRenderer};
//!
//! let mut scene = SceneGraph::new();
//! let root = scene.root();
//! let marker = sv_renderer::CameraMarker::spawn(&mut scene, root)?;
//! marker.set_pose(&mut scene, glam::Vec3::new(0.0, 2.0, 0.0), 45.0, -20.0)?;
//!
//! let camera = PerspectiveCamera::default();
//! HeadlessRenderer::new().render(&scene, &camera);
//! ```

pub mod camera;
pub mod constants;
pub mod frame;
pub mod geometry;
pub mod light;
pub mod marker;
pub mod orbit;
pub mod picking;
pub mod ray;
pub mod renderer;
pub mod resources;
pub mod scene;

// Re-exports for convenience
pub use camera::{PerspectiveCamera, Viewport};
pub use marker::CameraMarker;
pub use frame::{DrawItem, FrameRecord, FrameRenderer, HeadlessRenderer, PassType, collect_draw_list};
pub use light::{DirectionalLight, HemisphereLight, Light, LightUniform};
pub use orbit::{OrbitAction, OrbitControls};
pub use picking::{RayHit, raycast};
pub use ray::Ray;
pub use renderer::{RenderTarget, SharedTarget, WgpuRenderer};
pub use resources::{Material, MaterialHandle, MeshData, MeshHandle, MeshVertex, Topology};
pub use scene::{
    AssetNode, BoundingBox, NodeHandle, SceneError, SceneGraph, SceneNode, SceneStats, Transform,
};
