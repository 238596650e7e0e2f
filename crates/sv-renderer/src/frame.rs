//! Frame rendering seam.
//!
//! The viewer only decides *what* is on screen. Backends implement
//! [`FrameRenderer`] to draw the list returned by [`collect_draw_list`];
//! [`HeadlessRenderer`] records frames instead of drawing them.

use glam::Mat4;

use crate::camera::PerspectiveCamera;
use crate::light::LightUniform;
use crate::resources::{MaterialHandle, MeshHandle};
use crate::scene::{NodeHandle, SceneGraph};

/// Type of render pass a draw belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassType {
    /// Depth tested and written, no blending
    Opaque,
    /// Back-to-front sorted, alpha blended
    Transparent,
}

impl PassType {
    /// Returns true if this pass should write to the depth buffer.
    pub fn writes_depth(&self) -> bool {
        matches!(self, PassType::Opaque)
    }
}

/// One mesh to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub node: NodeHandle,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub model: Mat4,
    pub pass: PassType,
}

/// Visible meshes in draw order: opaque in tree order, then transparent
/// from farthest to nearest.
pub fn collect_draw_list(scene: &SceneGraph, camera: &PerspectiveCamera) -> Vec<DrawItem> {
    let view = camera.view_matrix();
    let mut opaque = Vec::new();
    let mut transparent = Vec::new();

    for handle in scene.descendants(scene.root()) {
        let Some(node) = scene.node(handle) else {
            continue;
        };
        let (Some(mesh), Some(material)) = (node.mesh(), node.material()) else {
            continue;
        };
        if !scene.is_visible_in_world(handle) {
            continue;
        }
        let Some(model) = scene.world_matrix(handle) else {
            continue;
        };

        let is_transparent = scene.material(material).is_some_and(|m| m.transparent);
        let item = DrawItem {
            node: handle,
            mesh,
            material,
            model,
            pass: if is_transparent {
                PassType::Transparent
            } else {
                PassType::Opaque
            },
        };
        if is_transparent {
            // View space looks down -Z, so more negative is farther
            let depth = view.transform_point3(model.w_axis.truncate()).z;
            transparent.push((depth, item));
        } else {
            opaque.push(item);
        }
    }

    transparent.sort_by(|a, b| a.0.total_cmp(&b.0));
    opaque.extend(transparent.into_iter().map(|(_, item)| item));
    opaque
}

/// Backend that draws frames.
pub trait FrameRenderer {
    /// Draws one frame of `scene` as seen from `camera`.
    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera);

    /// Resizes the drawing surface. Sizes are in physical pixels.
    fn resize(&mut self, width: u32, height: u32);

    /// Releases backend resources. Later calls must be no-ops.
    fn dispose(&mut self);
}

/// What a [`HeadlessRenderer`] saw in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub draws: Vec<DrawItem>,
    pub background: [f32; 4],
    pub lights: LightUniform,
    pub view_projection: Mat4,
    /// The scene changed since the previous frame.
    pub scene_changed: bool,
}

/// Renderer that records frames without drawing them.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: Vec<FrameRecord>,
    size: (u32, u32),
    disposed: bool,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&FrameRecord> {
        self.frames.last()
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl FrameRenderer for HeadlessRenderer {
    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) {
        if self.disposed {
            return;
        }
        self.frames.push(FrameRecord {
            draws: collect_draw_list(scene, camera),
            background: scene.background(),
            lights: LightUniform::from_lights(scene.lights()),
            view_projection: camera.view_projection(),
            scene_changed: scene.is_dirty(),
        });
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.frames.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry;
    use crate::resources::Material;
    use crate::scene::Transform;
    use glam::Vec3;

    #[test]
    fn test_draw_order_puts_transparent_last_far_to_near() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let glass = |z: f32| {
            (
                geometry::plane(1.0, 1.0),
                Material::basic(0xffffff).with_opacity(0.5),
                Transform::from_translation(Vec3::new(0.0, 0.0, z)),
            )
        };

        let (mesh, material, t) = glass(1.0);
        let near = scene.add_mesh_node(root, "near", mesh, material, t).unwrap();
        let (mesh, material, t) = glass(-5.0);
        let far = scene.add_mesh_node(root, "far", mesh, material, t).unwrap();
        let solid = scene
            .add_mesh_node(root, "solid", geometry::cuboid(1.0, 1.0, 1.0), Material::default(), Transform::IDENTITY)
            .unwrap();

        let mut camera = PerspectiveCamera::default();
        camera.position = Vec3::new(0.0, 0.0, 10.0);
        camera.look_at(Vec3::ZERO);

        let order: Vec<NodeHandle> = collect_draw_list(&scene, &camera).iter().map(|d| d.node).collect();
        assert_eq!(order, vec![solid, far, near]);
    }

    #[test]
    fn test_hidden_nodes_are_not_drawn() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let group = scene.add_node(root, "group", Transform::IDENTITY).unwrap();
        scene
            .add_mesh_node(group, "box", geometry::cuboid(1.0, 1.0, 1.0), Material::default(), Transform::IDENTITY)
            .unwrap();
        scene.set_visible(group, false).unwrap();

        assert!(collect_draw_list(&scene, &PerspectiveCamera::default()).is_empty());
    }

    #[test]
    fn test_headless_records_until_disposed() {
        let scene = SceneGraph::new();
        let camera = PerspectiveCamera::default();
        let mut renderer = HeadlessRenderer::new();

        renderer.resize(800, 600);
        renderer.render(&scene, &camera);
        assert_eq!(renderer.frames().len(), 1);
        assert_eq!(renderer.size(), (800, 600));

        renderer.dispose();
        renderer.dispose();
        renderer.render(&scene, &camera);
        assert!(renderer.frames().is_empty());
        assert!(renderer.is_disposed());
    }
}
