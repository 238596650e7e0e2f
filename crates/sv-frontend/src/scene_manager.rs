//! Scene construction and teardown.
//!
//! One [`ViewerScene`] exists per model handle. It exclusively owns the scene
//! graph (and through it every mesh and material), the viewing camera and the
//! orbit controls. Everything else holds plain node handles into it.

use glam::{Quat, Vec3};
use sv_renderer::geometry;
use sv_renderer::resources::hex_color;
use sv_renderer::{
    AssetNode, CameraMarker, DirectionalLight, HemisphereLight, Material, NodeHandle, OrbitControls,
    PerspectiveCamera, SceneError, SceneGraph, Transform,
};

use crate::config::ViewerConfig;

/// Loaded fire marker template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireTemplate {
    /// Detached subtree cloned for every fire
    pub node: NodeHandle,
    /// Lowest point of the template in its own space
    pub min_y: f32,
}

/// Scene of one model.
pub struct ViewerScene {
    /// Build counter; asset completions from other builds are ignored.
    pub generation: u64,
    pub model_handle: String,
    pub graph: SceneGraph,
    pub camera: PerspectiveCamera,
    pub orbit: OrbitControls,
    pub fire_group: NodeHandle,
    pub camera_group: NodeHandle,
    /// Parent of the loaded model, rotated into the Y-up frame.
    pub model_mount: NodeHandle,
    pub draft_camera: CameraMarker,
    pub fire_template: Option<FireTemplate>,
    /// Present once the fire template has loaded.
    pub draft_fire: Option<NodeHandle>,
}

impl ViewerScene {
    /// Lighting, ground, grid, marker groups and the hidden draft camera.
    pub fn build(config: &ViewerConfig, generation: u64, model_handle: &str) -> Result<Self, SceneError> {
        let scene_cfg = &config.scene;
        let mut graph = SceneGraph::new();
        let root = graph.root();

        graph.set_background(hex_color(scene_cfg.background, 1.0));
        graph.add_light(
            HemisphereLight::new(
                scene_cfg.hemisphere_sky,
                scene_cfg.hemisphere_ground,
                scene_cfg.hemisphere_intensity,
            )
            .into(),
        );
        graph.add_light(
            DirectionalLight::new(
                scene_cfg.directional_color,
                scene_cfg.directional_intensity,
                Vec3::from(scene_cfg.directional_position),
            )
            .into(),
        );

        let grid = geometry::grid(scene_cfg.grid_size, scene_cfg.grid_divisions);
        let grid_node = graph.add_node(root, "grid", Transform::IDENTITY)?;
        graph.add_mesh_node(
            grid_node,
            "grid-center",
            grid.center,
            line_material(sv_renderer::constants::grid::CENTER_COLOR),
            Transform::IDENTITY,
        )?;
        graph.add_mesh_node(
            grid_node,
            "grid-lines",
            grid.lines,
            line_material(sv_renderer::constants::grid::LINE_COLOR),
            Transform::IDENTITY,
        )?;

        graph.add_mesh_node(
            root,
            "ground",
            geometry::plane(scene_cfg.ground_size, scene_cfg.ground_size),
            Material::standard(scene_cfg.ground_color, 0.05, 0.95),
            Transform::from_translation(Vec3::new(0.0, scene_cfg.ground_height, 0.0))
                .with_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2)),
        )?;

        let model_mount = graph.add_node(
            root,
            "model",
            Transform::from_rotation(Quat::from_rotation_x(scene_cfg.model_rotation_x.to_radians())),
        )?;
        let fire_group = graph.add_node(root, "fires", Transform::IDENTITY)?;
        let camera_group = graph.add_node(root, "cameras", Transform::IDENTITY)?;

        let draft_camera = CameraMarker::spawn(&mut graph, root)?;
        graph.set_visible(draft_camera.root, false)?;

        let mut camera = PerspectiveCamera::default();
        camera.position = Vec3::from(scene_cfg.camera_position);

        let orbit_cfg = &config.orbit;
        let mut orbit = OrbitControls::new(Vec3::from(orbit_cfg.target));
        orbit.enable_damping = orbit_cfg.enable_damping;
        orbit.damping_factor = orbit_cfg.damping_factor;
        orbit.rotate_speed = orbit_cfg.rotate_speed;
        orbit.pan_speed = orbit_cfg.pan_speed;
        orbit.zoom_speed = orbit_cfg.zoom_speed;
        camera.look_at(orbit.target);

        tracing::info!(generation, model = model_handle, "Built viewer scene");

        Ok(Self {
            generation,
            model_handle: model_handle.to_string(),
            graph,
            camera,
            orbit,
            fire_group,
            camera_group,
            model_mount,
            draft_camera,
            fire_template: None,
            draft_fire: None,
        })
    }

    /// Mounts a loaded model, replacing any previous one.
    pub fn mount_model(&mut self, asset: &AssetNode) -> Result<NodeHandle, SceneError> {
        self.graph.clear_children(self.model_mount);
        let node = self.graph.instantiate(asset, self.model_mount)?;
        tracing::debug!(nodes = asset.node_count(), "Mounted model");
        Ok(node)
    }

    /// Stores the fire template and creates the (hidden) draft fire from it.
    pub fn install_fire_template(&mut self, asset: &AssetNode) -> Result<FireTemplate, SceneError> {
        if let Some(old) = self.fire_template.take() {
            self.graph.release_subtree(old.node);
        }
        if let Some(old) = self.draft_fire.take() {
            self.graph.release_subtree(old);
        }

        let bounds = asset.bounds();
        let min_y = if bounds.is_empty() { 0.0 } else { bounds.min.y };

        let holder = self.graph.create_node("fire-template", Transform::IDENTITY)?;
        self.graph.instantiate(asset, holder)?;
        let template = FireTemplate { node: holder, min_y };

        let root = self.graph.root();
        let draft = self.graph.clone_subtree(holder, root)?;
        self.graph.set_visible(draft, false)?;

        self.fire_template = Some(template);
        self.draft_fire = Some(draft);
        tracing::debug!(min_y, "Installed fire template");
        Ok(template)
    }

    /// Releases the whole scene. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.graph.is_disposed() {
            return;
        }
        if let Some(template) = self.fire_template.take() {
            self.graph.release_subtree(template.node);
        }
        self.draft_fire = None;
        self.graph.dispose();
        tracing::info!(generation = self.generation, "Tore down viewer scene");
    }
}

fn line_material(color: [f32; 4]) -> Material {
    Material {
        color,
        unlit: true,
        ..Material::default()
    }
}
