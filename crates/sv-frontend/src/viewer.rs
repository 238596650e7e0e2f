//! The interactive model scene viewer.
//!
//! [`ModelSceneViewer`] ties everything together: it builds one
//! [`ViewerScene`] per model handle, mirrors the host's [`ViewerProps`] into
//! it, routes pointer input to draft dragging or the orbit controls and runs
//! the frame loop through the host's display-refresh callbacks.

use std::mem;

use sv_core::DragMode;
use sv_renderer::{AssetNode, FrameRenderer, SceneError};

use crate::config::ViewerConfig;
use crate::draft::{sync_draft_camera, sync_draft_fire};
use crate::events::{EventOutbox, ViewerEvent};
use crate::focus::focus_active_camera;
use crate::host::{AssetKind, AssetLoadError, AssetRequest, AssetTicket, CursorIcon, FrameToken, ViewerHost};
use crate::input::PointerInput;
use crate::interaction::{DragState, InteractionController};
use crate::markers::{render_cameras, render_fires};
use crate::props::ViewerProps;
use crate::render_loop::advance;
use crate::scene_manager::ViewerScene;

/// Scene of the current model together with its render backend.
struct Session {
    scene: ViewerScene,
    renderer: Box<dyn FrameRenderer>,
    pending_frame: Option<FrameToken>,
}

/// Embeddable 3D viewer for one project's site model and markers.
pub struct ModelSceneViewer<H: ViewerHost> {
    host: H,
    config: ViewerConfig,
    props: ViewerProps,
    session: Option<Session>,
    generation: u64,
    interaction: InteractionController,
    outbox: EventOutbox,
    torn_down: bool,
}

impl<H: ViewerHost> ModelSceneViewer<H> {
    pub fn new(host: H, config: ViewerConfig) -> Self {
        Self {
            host,
            config,
            props: ViewerProps::default(),
            session: None,
            generation: 0,
            interaction: InteractionController::new(DragMode::default()),
            outbox: EventOutbox::default(),
            torn_down: false,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn props(&self) -> &ViewerProps {
        &self.props
    }

    /// Scene of the current model, if one is built.
    pub fn scene(&self) -> Option<&ViewerScene> {
        self.session.as_ref().map(|s| &s.scene)
    }

    pub fn drag_mode(&self) -> DragMode {
        self.interaction.mode()
    }

    pub fn drag_state(&self) -> DragState {
        self.interaction.state()
    }

    /// Frame callback the viewer is waiting for.
    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.session.as_ref().and_then(|s| s.pending_frame)
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Takes every event published since the last call.
    pub fn drain_events(&mut self) -> Vec<ViewerEvent> {
        self.outbox.drain()
    }

    /// Applies a new host snapshot.
    ///
    /// A different model handle rebuilds the scene from scratch. Otherwise
    /// only the parts whose inputs changed are refreshed.
    pub fn set_props(&mut self, props: ViewerProps) {
        if self.torn_down {
            tracing::warn!("Ignoring props for a torn down viewer");
            return;
        }

        let previous = mem::replace(&mut self.props, props);
        let model = self.props.model_handle().map(str::to_owned);
        let model_changed =
            previous.model_handle() != model.as_deref() || self.session.is_none() != model.is_none();

        if model_changed {
            self.teardown_session();
            if let Some(model) = model {
                self.build_session(&model);
            }
            return;
        }

        let Some(session) = self.session.as_mut() else {
            return;
        };
        let scene = &mut session.scene;
        let base_scale = self.config.markers.fire_base_scale;

        if previous.fires != self.props.fires {
            log_scene_error(render_fires(scene, &self.props.fires, base_scale), "render fires");
        }
        if previous.cameras != self.props.cameras {
            log_scene_error(render_cameras(scene, &self.props.cameras), "render cameras");
        }
        if previous.draft_fire != self.props.draft_fire {
            log_scene_error(
                sync_draft_fire(scene, self.props.draft_fire.as_ref(), base_scale),
                "sync draft fire",
            );
        }
        if previous.draft_camera != self.props.draft_camera {
            log_scene_error(
                sync_draft_camera(scene, self.props.draft_camera.as_ref()),
                "sync draft camera",
            );
        }
        if self.props.focus_changed(&previous) {
            focus_active_camera(scene, &self.props, &self.config.focus);
        }
    }

    fn build_session(&mut self, model: &str) {
        self.generation += 1;
        let generation = self.generation;

        let mut scene = match ViewerScene::build(&self.config, generation, model) {
            Ok(scene) => scene,
            Err(err) => {
                tracing::error!(%err, model, "Failed to build viewer scene");
                return;
            }
        };
        let renderer = self.host.create_renderer();

        self.outbox.push(ViewerEvent::DragModeChanged {
            mode: self.interaction.mode(),
        });
        self.host.request_asset(AssetRequest {
            ticket: AssetTicket {
                generation,
                kind: AssetKind::Model,
            },
            handle: model.to_string(),
        });
        self.host.request_asset(AssetRequest {
            ticket: AssetTicket {
                generation,
                kind: AssetKind::MarkerTemplate,
            },
            handle: self.config.markers.fire_template.clone(),
        });
        self.host.attach_input();
        self.host.set_cursor(CursorIcon::Grab);

        log_scene_error(render_cameras(&mut scene, &self.props.cameras), "render cameras");
        log_scene_error(
            sync_draft_camera(&mut scene, self.props.draft_camera.as_ref()),
            "sync draft camera",
        );

        self.session = Some(Session {
            scene,
            renderer,
            pending_frame: None,
        });
        self.resize();
        self.tick();
    }

    fn teardown_session(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        if let Some(token) = session.pending_frame.take() {
            self.host.cancel_frame(token);
        }
        self.host.detach_input();
        session.renderer.dispose();
        session.scene.teardown();
        self.interaction.reset();
    }

    /// Renders one frame now and schedules the next.
    fn tick(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        advance(&mut session.scene);
        session.renderer.render(&session.scene.graph, &session.scene.camera);
        session.scene.graph.mark_clean();
        session.pending_frame = Some(self.host.request_frame());
    }

    /// Display-refresh callback. Tokens other than the one last requested are
    /// ignored. Returns true if a frame was drawn.
    pub fn on_animation_frame(&mut self, token: FrameToken) -> bool {
        if self.torn_down {
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.pending_frame != Some(token) {
            tracing::trace!(token = token.0, "Ignoring stale frame callback");
            return false;
        }
        session.pending_frame = None;
        self.tick();
        true
    }

    /// Re-reads the viewport from the host. Empty viewports are ignored.
    pub fn resize(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let viewport = self.host.viewport();
        let Some(aspect) = viewport.aspect() else {
            return;
        };
        session.scene.camera.set_aspect(aspect);
        let (width, height) = viewport.buffer_size(self.config.scene.max_pixel_ratio);
        session.renderer.resize(width, height);
    }

    /// Delivers a finished asset load.
    ///
    /// Completions for an earlier scene are discarded. Returns true if the
    /// asset was added to the scene.
    pub fn complete_asset(&mut self, ticket: AssetTicket, result: Result<AssetNode, AssetLoadError>) -> bool {
        if self.torn_down {
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let scene = &mut session.scene;
        if ticket.generation != scene.generation {
            tracing::warn!(
                kind = ?ticket.kind,
                stale = ticket.generation,
                current = scene.generation,
                "Discarding stale asset"
            );
            return false;
        }

        let asset = match result {
            Ok(asset) => asset,
            Err(err) => {
                let handle = match ticket.kind {
                    AssetKind::Model => scene.model_handle.clone(),
                    AssetKind::MarkerTemplate => self.config.markers.fire_template.clone(),
                };
                tracing::warn!(kind = ?ticket.kind, %handle, %err, "Asset failed to load");
                self.outbox.push(ViewerEvent::AssetLoadFailed {
                    kind: ticket.kind,
                    handle,
                    reason: err.to_string(),
                });
                return false;
            }
        };

        let base_scale = self.config.markers.fire_base_scale;
        let result = match ticket.kind {
            AssetKind::Model => scene.mount_model(&asset).map(|_| ()),
            AssetKind::MarkerTemplate => scene.install_fire_template(&asset).and_then(|_| {
                render_fires(scene, &self.props.fires, base_scale)?;
                sync_draft_fire(scene, self.props.draft_fire.as_ref(), base_scale)
            }),
        };
        match result {
            Ok(()) => {
                tracing::info!(kind = ?ticket.kind, generation = ticket.generation, "Asset loaded");
                true
            }
            Err(err) => {
                tracing::error!(kind = ?ticket.kind, %err, "Failed to add asset to scene");
                false
            }
        }
    }

    /// Pointer pressed. Returns true if a draft marker was grabbed; otherwise
    /// the press starts an orbit gesture.
    pub fn pointer_down(&mut self, input: PointerInput) -> bool {
        if self.torn_down {
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let viewport = self.host.viewport();
        let scene = &mut session.scene;

        if self
            .interaction
            .pointer_down(scene, &self.props, &self.config, &viewport, &input)
        {
            scene.orbit.end();
            scene.orbit.enabled = false;
            self.host.set_cursor(CursorIcon::Grabbing);
            return true;
        }

        scene.orbit.begin(input.button.orbit_action(), input.position());
        false
    }

    /// Pointer moved. Returns true if a drag session consumed it.
    pub fn pointer_move(&mut self, input: PointerInput) -> bool {
        if self.torn_down {
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let viewport = self.host.viewport();
        let scene = &mut session.scene;

        match self.interaction.pointer_move(
            scene,
            &self.props,
            &self.config,
            &viewport,
            &input,
            &mut self.outbox,
        ) {
            Ok(true) => return true,
            Ok(false) => {}
            Err(err) => {
                tracing::error!(%err, "Draft drag failed");
                return true;
            }
        }

        if scene.orbit.active_action().is_some() {
            scene.orbit.drag(input.position(), &scene.camera, viewport.height);
        }
        false
    }

    /// Pointer released. Ends any drag session and re-enables orbiting.
    pub fn pointer_up(&mut self, _input: PointerInput) -> bool {
        if self.torn_down {
            return false;
        }
        let was_dragging = self.interaction.pointer_up(&mut self.outbox);
        if let Some(session) = self.session.as_mut() {
            session.scene.orbit.enabled = true;
            session.scene.orbit.end();
        }
        if was_dragging {
            self.host.set_cursor(CursorIcon::Grab);
        }
        was_dragging
    }

    /// Mouse wheel: zooms the orbit camera.
    pub fn wheel(&mut self, delta_y: f32) {
        if self.torn_down {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.scene.orbit.wheel(delta_y);
        }
    }

    /// Releases the scene, the renderer and the host registrations.
    ///
    /// Safe to call more than once; later input and props are ignored.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.teardown_session();
        tracing::info!("Viewer torn down");
    }
}

impl<H: ViewerHost> Drop for ModelSceneViewer<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn log_scene_error(result: Result<impl Sized, SceneError>, action: &str) {
    if let Err(err) = result {
        tracing::error!(%err, action, "Scene update failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use approx::assert_relative_eq;
    use chrono::Utc;
    use glam::Vec3;
    use sv_core::{CameraDraft, CameraPatch, CameraRecord, FireDraft, FireMove};
    use sv_renderer::{
        HeadlessRenderer, Material, PerspectiveCamera, SceneGraph, Transform, Viewport, geometry,
    };
    use uuid::Uuid;

    use crate::input::PointerButton;

    /// Render backend the test can still inspect after handing it out.
    struct SharedRenderer(Rc<RefCell<HeadlessRenderer>>);

    impl FrameRenderer for SharedRenderer {
        fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) {
            self.0.borrow_mut().render(scene, camera);
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.0.borrow_mut().resize(width, height);
        }

        fn dispose(&mut self) {
            self.0.borrow_mut().dispose();
        }
    }

    struct FakeHost {
        requests: Vec<AssetRequest>,
        cursor: CursorIcon,
        attached: usize,
        detached: usize,
        next_frame: u64,
        cancelled: Vec<FrameToken>,
        viewport: Viewport,
        renderers: Vec<Rc<RefCell<HeadlessRenderer>>>,
    }

    impl Default for FakeHost {
        fn default() -> Self {
            Self {
                requests: Vec::new(),
                cursor: CursorIcon::Grab,
                attached: 0,
                detached: 0,
                next_frame: 0,
                cancelled: Vec::new(),
                viewport: Viewport::new(800.0, 600.0),
                renderers: Vec::new(),
            }
        }
    }

    impl ViewerHost for FakeHost {
        fn request_asset(&mut self, request: AssetRequest) {
            self.requests.push(request);
        }

        fn set_cursor(&mut self, cursor: CursorIcon) {
            self.cursor = cursor;
        }

        fn attach_input(&mut self) {
            self.attached += 1;
        }

        fn detach_input(&mut self) {
            self.detached += 1;
        }

        fn request_frame(&mut self) -> FrameToken {
            self.next_frame += 1;
            FrameToken(self.next_frame)
        }

        fn cancel_frame(&mut self, token: FrameToken) {
            self.cancelled.push(token);
        }

        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn create_renderer(&mut self) -> Box<dyn FrameRenderer> {
            let renderer = Rc::new(RefCell::new(HeadlessRenderer::new()));
            self.renderers.push(renderer.clone());
            Box::new(SharedRenderer(renderer))
        }
    }

    fn viewer_with(props: ViewerProps) -> ModelSceneViewer<FakeHost> {
        let mut viewer = ModelSceneViewer::new(FakeHost::default(), ViewerConfig::new());
        viewer.set_props(props);
        viewer
    }

    fn site_props() -> ViewerProps {
        ViewerProps {
            model: Some("site.glb".into()),
            ..Default::default()
        }
    }

    /// Unit box resting on y = 0.
    fn ground_resting_template() -> AssetNode {
        AssetNode::mesh("flame", geometry::cuboid(1.0, 1.0, 1.0), Material::basic(0xff5500))
            .with_transform(Transform::from_translation(Vec3::new(0.0, 0.5, 0.0)))
    }

    fn load_template(viewer: &mut ModelSceneViewer<FakeHost>) {
        let generation = viewer.scene().unwrap().generation;
        let ticket = AssetTicket {
            generation,
            kind: AssetKind::MarkerTemplate,
        };
        assert!(viewer.complete_asset(ticket, Ok(ground_resting_template())));
    }

    /// Client coordinates of a world point as seen by the viewing camera.
    fn client_point(viewer: &ModelSceneViewer<FakeHost>, world: Vec3) -> PointerInput {
        let camera = &viewer.scene().unwrap().camera;
        let ndc = camera.view_projection().project_point3(world);
        let viewport = viewer.host().viewport;
        PointerInput::new(
            (ndc.x + 1.0) / 2.0 * viewport.width,
            (1.0 - ndc.y) / 2.0 * viewport.height,
        )
    }

    fn camera_draft(yaw: f64, pitch: f64) -> CameraDraft {
        CameraDraft {
            name: "Draft".into(),
            x: 0.0,
            y: 0.0,
            z: 0.0,
            yaw,
            pitch,
        }
    }

    /// Center of the draft camera head for a marker at the origin with yaw and pitch 0.
    fn head_center() -> Vec3 {
        Vec3::new(0.0, 0.26, 0.17)
    }

    #[test]
    fn test_build_requests_assets_and_draws() {
        let mut viewer = viewer_with(site_props());

        let kinds: Vec<AssetKind> = viewer.host().requests.iter().map(|r| r.ticket.kind).collect();
        assert_eq!(kinds, vec![AssetKind::Model, AssetKind::MarkerTemplate]);
        assert_eq!(viewer.host().requests[0].handle, "site.glb");
        assert_eq!(viewer.host().requests[1].handle, "/fire.glb");
        assert_eq!(viewer.host().attached, 1);

        let renderer = viewer.host().renderers[0].clone();
        assert_eq!(renderer.borrow().frames().len(), 1);
        assert_eq!(renderer.borrow().size(), (800, 600));

        assert_eq!(
            viewer.drain_events(),
            vec![ViewerEvent::DragModeChanged {
                mode: DragMode::Translate
            }]
        );
    }

    #[test]
    fn test_no_scene_without_model() {
        let mut viewer = viewer_with(ViewerProps::default());
        assert!(viewer.scene().is_none());
        assert!(viewer.host().requests.is_empty());
        assert!(!viewer.pointer_down(PointerInput::new(10.0, 10.0)));
        assert!(viewer.drain_events().is_empty());
    }

    #[test]
    fn test_blank_model_handle_builds_no_scene() {
        let mut viewer = viewer_with(ViewerProps {
            model: Some(String::new()),
            ..Default::default()
        });
        assert!(viewer.scene().is_none());
        assert!(viewer.host().requests.is_empty());
        assert_eq!(viewer.host().attached, 0);

        viewer.set_props(ViewerProps {
            model: Some("   ".into()),
            ..Default::default()
        });
        assert!(viewer.scene().is_none());
        assert!(viewer.host().renderers.is_empty());

        // Clearing the handle of a live scene tears it down
        viewer.set_props(site_props());
        assert!(viewer.scene().is_some());
        viewer.set_props(ViewerProps {
            model: Some(" ".into()),
            ..Default::default()
        });
        assert!(viewer.scene().is_none());
        assert_eq!(viewer.host().detached, 1);
        assert_eq!(viewer.host().requests.len(), 2);
    }

    #[test]
    fn test_frame_loop_ignores_stale_tokens() {
        let mut viewer = viewer_with(site_props());
        let renderer = viewer.host().renderers[0].clone();
        let token = viewer.pending_frame().unwrap();

        assert!(!viewer.on_animation_frame(FrameToken(token.0 + 100)));
        assert_eq!(renderer.borrow().frames().len(), 1);

        assert!(viewer.on_animation_frame(token));
        assert_eq!(renderer.borrow().frames().len(), 2);
        // Nothing moved between the first two frames
        assert!(renderer.borrow().frames()[0].scene_changed);
        assert!(!renderer.borrow().frames()[1].scene_changed);
        // Delivering the same callback twice draws once
        assert!(!viewer.on_animation_frame(token));
        assert_ne!(viewer.pending_frame(), Some(token));
    }

    #[test]
    fn test_model_change_rebuilds_scene() {
        let mut viewer = viewer_with(site_props());
        let first = viewer.pending_frame().unwrap();

        viewer.set_props(ViewerProps {
            model: Some("other.glb".into()),
            ..Default::default()
        });

        assert_eq!(viewer.scene().unwrap().generation, 2);
        assert_eq!(viewer.host().cancelled, vec![first]);
        assert_eq!(viewer.host().detached, 1);
        assert!(viewer.host().renderers[0].borrow().is_disposed());
        assert!(!viewer.host().renderers[1].borrow().is_disposed());
        assert_eq!(viewer.host().requests.len(), 4);
    }

    #[test]
    fn test_stale_asset_is_discarded() {
        let mut viewer = viewer_with(site_props());
        let stale = viewer.host().requests[1].ticket;
        viewer.set_props(ViewerProps {
            model: Some("other.glb".into()),
            ..Default::default()
        });

        assert!(!viewer.complete_asset(stale, Ok(ground_resting_template())));
        assert!(viewer.scene().unwrap().fire_template.is_none());
        assert!(viewer.drain_events().iter().all(|e| !matches!(e, ViewerEvent::AssetLoadFailed { .. })));
    }

    #[test]
    fn test_failed_asset_is_reported() {
        let mut viewer = viewer_with(site_props());
        viewer.drain_events();
        let ticket = viewer.host().requests[0].ticket;

        assert!(!viewer.complete_asset(ticket, Err(AssetLoadError::NotFound("site.glb".into()))));
        assert_eq!(
            viewer.drain_events(),
            vec![ViewerEvent::AssetLoadFailed {
                kind: AssetKind::Model,
                handle: "site.glb".into(),
                reason: "Asset not found: site.glb".into(),
            }]
        );
    }

    #[test]
    fn test_template_renders_committed_fires_and_draft() {
        let fire = sv_core::FireRecord {
            id: Uuid::new_v4(),
            name: "F".into(),
            x: 1.0,
            y: 0.0,
            z: 2.0,
            scale: 1.0,
            created_at: Utc::now(),
        };
        let mut viewer = viewer_with(ViewerProps {
            fires: vec![fire],
            draft_fire: Some(FireDraft::default()),
            ..site_props()
        });
        load_template(&mut viewer);

        let scene = viewer.scene().unwrap();
        assert_eq!(scene.graph.children(scene.fire_group).len(), 1);
        assert!(scene.graph.is_visible_in_world(scene.draft_fire.unwrap()));
    }

    #[test]
    fn test_click_on_draft_camera_toggles_mode() {
        let mut viewer = viewer_with(ViewerProps {
            draft_camera: Some(camera_draft(0.0, 0.0)),
            ..site_props()
        });
        viewer.drain_events();

        let press = client_point(&viewer, head_center());
        assert!(viewer.pointer_down(press));
        assert_eq!(viewer.host().cursor, CursorIcon::Grabbing);
        assert!(!viewer.scene().unwrap().orbit.enabled);

        // Wobble below the threshold
        assert!(viewer.pointer_move(PointerInput::new(press.x + 1.0, press.y - 1.0)));
        assert!(viewer.pointer_up(press));

        assert_eq!(viewer.drag_mode(), DragMode::Rotate);
        assert_eq!(
            viewer.drain_events(),
            vec![ViewerEvent::DragModeChanged { mode: DragMode::Rotate }]
        );
        assert_eq!(viewer.host().cursor, CursorIcon::Grab);
        assert!(viewer.scene().unwrap().orbit.enabled);
    }

    #[test]
    fn test_camera_translate_drag_does_not_toggle() {
        let mut viewer = viewer_with(ViewerProps {
            draft_camera: Some(camera_draft(0.0, 0.0)),
            ..site_props()
        });
        viewer.drain_events();

        let press = client_point(&viewer, head_center());
        assert!(viewer.pointer_down(press));
        assert!(viewer.pointer_move(PointerInput::new(press.x + 40.0, press.y)));
        assert!(viewer.pointer_up(PointerInput::new(press.x + 40.0, press.y)));

        let events = viewer.drain_events();
        assert_eq!(events.len(), 1);
        let ViewerEvent::DraftCameraChanged(patch) = &events[0] else {
            panic!("unexpected event {:?}", events[0]);
        };
        assert!(patch.x.is_some() && patch.z.is_some());
        assert!(patch.yaw.is_none() && patch.pitch.is_none());
        assert_eq!(viewer.drag_mode(), DragMode::Translate);
    }

    #[test]
    fn test_draft_camera_wins_over_overlapping_fire() {
        let mut viewer = viewer_with(ViewerProps {
            draft_fire: Some(FireDraft {
                z: 0.17,
                ..Default::default()
            }),
            draft_camera: Some(camera_draft(0.0, 0.0)),
            ..site_props()
        });
        load_template(&mut viewer);
        viewer.drain_events();

        assert!(viewer.pointer_down(client_point(&viewer, head_center())));
        assert!(matches!(viewer.drag_state(), DragState::DraggingCameraTranslate(_)));
    }

    #[test]
    fn test_move_missing_drag_plane_keeps_session() {
        let mut viewer = viewer_with(ViewerProps {
            draft_camera: Some(camera_draft(0.0, 0.0)),
            ..site_props()
        });
        viewer.drain_events();

        let press = client_point(&viewer, head_center());
        assert!(viewer.pointer_down(press));
        // Far above the horizon the pointer ray never meets the plane
        assert!(viewer.pointer_move(PointerInput::new(press.x, -5000.0)));
        assert!(viewer.drain_events().is_empty());
        assert!(viewer.drag_state().is_dragging());

        assert!(viewer.pointer_move(PointerInput::new(press.x + 30.0, press.y + 10.0)));
        let events = viewer.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ViewerEvent::DraftCameraChanged(patch) if patch.x.is_some() && patch.z.is_some()));

        assert!(viewer.pointer_up(PointerInput::new(press.x + 30.0, press.y + 10.0)));
        assert_eq!(viewer.drag_state(), DragState::Idle);
        assert_eq!(viewer.drag_mode(), DragMode::Translate);
    }

    #[test]
    fn test_camera_rotate_drag_clamps_pitch() {
        let mut viewer = viewer_with(ViewerProps {
            draft_camera: Some(camera_draft(10.0, 0.0)),
            ..site_props()
        });
        // Marker turned by yaw 10: aim at the head pivot instead of the head center
        let press = client_point(&viewer, Vec3::new(0.0, 0.26, 0.1));
        assert!(viewer.pointer_down(press));
        viewer.pointer_up(press);
        assert_eq!(viewer.drag_mode(), DragMode::Rotate);
        viewer.drain_events();

        assert!(viewer.pointer_down(press));
        assert!(viewer.pointer_move(PointerInput::new(press.x + 20.0, press.y - 1000.0)));
        assert!(viewer.pointer_up(PointerInput::new(press.x + 20.0, press.y - 1000.0)));

        assert_eq!(
            viewer.drain_events(),
            vec![ViewerEvent::DraftCameraChanged(CameraPatch::orientation(15.0, 85.0))]
        );
        assert_eq!(viewer.drag_mode(), DragMode::Rotate);
    }

    #[test]
    fn test_fire_drag_reports_plane_position() {
        let mut viewer = viewer_with(ViewerProps {
            draft_fire: Some(FireDraft::default()),
            ..site_props()
        });
        load_template(&mut viewer);
        viewer.drain_events();

        assert!(viewer.pointer_down(client_point(&viewer, Vec3::ZERO)));
        let target = client_point(&viewer, Vec3::new(-1.234, 0.0, 0.567));
        assert!(viewer.pointer_move(target));
        assert!(viewer.pointer_up(target));

        assert_eq!(
            viewer.drain_events(),
            vec![ViewerEvent::DraftFireMoved(FireMove { x: -1.234, z: 0.567 })]
        );
        let scene = viewer.scene().unwrap();
        let moved = scene.graph.node(scene.draft_fire.unwrap()).unwrap().transform.translation;
        assert_relative_eq!(moved.x, -1.234, epsilon = 1e-3);
        assert_relative_eq!(moved.y, 0.0);
        // Fire clicks never flip the camera mode
        assert_eq!(viewer.drag_mode(), DragMode::Translate);
    }

    #[test]
    fn test_miss_starts_orbit() {
        let mut viewer = viewer_with(site_props());
        let before = viewer.scene().unwrap().camera.position;

        assert!(!viewer.pointer_down(PointerInput::new(10.0, 10.0).with_button(PointerButton::Primary)));
        assert!(!viewer.pointer_move(PointerInput::new(110.0, 10.0)));
        viewer.pointer_up(PointerInput::new(110.0, 10.0));
        let token = viewer.pending_frame().unwrap();
        viewer.on_animation_frame(token);

        assert_ne!(viewer.scene().unwrap().camera.position, before);
        assert!(viewer.drain_events().iter().all(|e| matches!(e, ViewerEvent::DragModeChanged { .. })));
    }

    #[test]
    fn test_focus_moves_view_to_active_camera() {
        let camera = CameraRecord {
            id: Uuid::new_v4(),
            name: "Gate".into(),
            x: 0.0,
            y: 2.0,
            z: 0.0,
            yaw: 0.0,
            pitch: -20.0,
            created_at: Utc::now(),
        };
        let mut viewer = viewer_with(ViewerProps {
            cameras: vec![camera.clone()],
            ..site_props()
        });
        let before = viewer.scene().unwrap().camera.position;

        let mut props = viewer.props().clone();
        props.active_camera_id = Some(camera.id);
        props.focus_tick = 1;
        viewer.set_props(props);

        let scene = viewer.scene().unwrap();
        assert_ne!(scene.camera.position, before);
        assert_relative_eq!(scene.camera.position.y, 2.26 + 0.42 * 20f32.to_radians().sin(), epsilon = 1e-4);
        assert_eq!(scene.graph.children(scene.camera_group).len(), 1);
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut viewer = viewer_with(site_props());
        let generation = viewer.scene().unwrap().generation;

        viewer.teardown();
        viewer.teardown();

        assert!(viewer.is_torn_down());
        assert!(viewer.scene().is_none());
        assert_eq!(viewer.host().detached, 1);
        assert_eq!(viewer.host().cancelled.len(), 1);
        assert!(viewer.host().renderers[0].borrow().is_disposed());

        // Everything afterwards is ignored
        let requests = viewer.host().requests.len();
        viewer.set_props(ViewerProps {
            model: Some("again.glb".into()),
            ..Default::default()
        });
        assert_eq!(viewer.host().requests.len(), requests);
        let ticket = AssetTicket {
            generation,
            kind: AssetKind::Model,
        };
        assert!(!viewer.complete_asset(ticket, Ok(ground_resting_template())));
        assert!(!viewer.on_animation_frame(FrameToken(1)));
        assert!(!viewer.pointer_down(PointerInput::new(1.0, 1.0)));
    }
}
