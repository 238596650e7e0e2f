//! Headless script replay.
//!
//! Drives a [`ModelSceneViewer`] and a [`SceneEditor`] from a RON script the
//! way an embedding application would: editor actions become props, viewer
//! events are merged back into the editor, and asset requests are answered
//! with procedural placeholder geometry. Every viewer event is recorded.

use std::collections::VecDeque;
use std::path::Path;

use chrono::Utc;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use sv_core::{SceneDocument, SceneEditor};
use sv_renderer::{AssetNode, FrameRenderer, HeadlessRenderer, Material, Transform, Viewport, geometry};

use crate::config::ViewerConfig;
use crate::events::ViewerEvent;
use crate::host::{AssetKind, AssetLoadError, AssetRequest, CursorIcon, FrameToken, ViewerHost};
use crate::input::PointerInput;
use crate::props::ViewerProps;
use crate::viewer::ModelSceneViewer;

/// Replay error types
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse script: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplayStep {
    /// Point the viewer at a model handle.
    LoadModel(String),
    UnloadModel,
    StartFire,
    DiscardFire,
    CommitFire,
    StartCamera,
    DiscardCamera,
    CommitCamera,
    /// Load the committed camera at this index into the draft.
    EditCamera(usize),
    /// Look through the committed camera at this index.
    FocusCamera(usize),
    Resize { width: f32, height: f32 },
    PointerDown(PointerInput),
    PointerMove(PointerInput),
    PointerUp(PointerInput),
    Wheel(f32),
    /// Deliver this many display-refresh callbacks.
    Frames(u32),
    /// The next asset request fails.
    FailNextAsset,
}

/// A replay script: the starting scene plus the actions to perform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub scene: SceneDocument,
    #[serde(default)]
    pub steps: Vec<ReplayStep>,
}

impl ReplayScript {
    pub fn from_ron(source: &str) -> Result<Self, ReplayError> {
        Ok(ron::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_ron(&source)
    }
}

/// A recorded viewer event and the step that caused it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayLine {
    pub step: usize,
    #[serde(flatten)]
    pub event: ViewerEvent,
}

impl ReplayLine {
    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Host that answers requests synchronously from memory.
pub struct ReplayHost {
    viewport: Viewport,
    requests: VecDeque<AssetRequest>,
    fail_next: bool,
    next_frame: u64,
    cursor: CursorIcon,
    input_attached: bool,
}

impl ReplayHost {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            requests: VecDeque::new(),
            fail_next: false,
            next_frame: 0,
            cursor: CursorIcon::default(),
            input_attached: false,
        }
    }

    pub fn cursor(&self) -> CursorIcon {
        self.cursor
    }

    pub fn is_input_attached(&self) -> bool {
        self.input_attached
    }

    fn next_request(&mut self) -> Option<(AssetRequest, Result<AssetNode, AssetLoadError>)> {
        let request = self.requests.pop_front()?;
        let result = if std::mem::take(&mut self.fail_next) {
            Err(AssetLoadError::NotFound(request.handle.clone()))
        } else {
            Ok(placeholder_asset(request.ticket.kind))
        };
        Some((request, result))
    }
}

impl ViewerHost for ReplayHost {
    fn request_asset(&mut self, request: AssetRequest) {
        tracing::debug!(kind = ?request.ticket.kind, handle = %request.handle, "Asset requested");
        self.requests.push_back(request);
    }

    fn set_cursor(&mut self, cursor: CursorIcon) {
        self.cursor = cursor;
    }

    fn attach_input(&mut self) {
        self.input_attached = true;
    }

    fn detach_input(&mut self) {
        self.input_attached = false;
    }

    fn request_frame(&mut self) -> FrameToken {
        self.next_frame += 1;
        FrameToken(self.next_frame)
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        tracing::trace!(token = token.0, "Frame cancelled");
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn create_renderer(&mut self) -> Box<dyn FrameRenderer> {
        Box::new(HeadlessRenderer::new())
    }
}

/// Stand-in geometry for loaded assets.
///
/// The model is a slab with a block on it, authored Z-up like a scanned site.
/// The fire template is a flame cone resting on y = 0.
pub fn placeholder_asset(kind: AssetKind) -> AssetNode {
    match kind {
        AssetKind::Model => AssetNode::group("site")
            .with_child(AssetNode::mesh(
                "slab",
                geometry::cuboid(20.0, 20.0, 0.2),
                Material::standard(0xcbd5e1, 0.0, 0.9),
            ))
            .with_child(
                AssetNode::mesh("block", geometry::cuboid(4.0, 3.0, 2.5), Material::standard(0x94a3b8, 0.1, 0.8))
                    .with_transform(Transform::from_translation(Vec3::new(3.0, 2.0, 1.35))),
            ),
        AssetKind::MarkerTemplate => AssetNode::group("fire").with_child(
            AssetNode::mesh("flame", geometry::cone(0.4, 1.2, 16, false), Material::basic(0xf97316))
                .with_transform(Transform::from_translation(Vec3::new(0.0, 0.6, 0.0))),
        ),
    }
}

/// Viewer plus editor, wired together like an embedding application.
pub struct Replay {
    viewer: ModelSceneViewer<ReplayHost>,
    editor: SceneEditor,
    model: Option<String>,
    frames: usize,
}

impl Replay {
    pub fn new(config: ViewerConfig, scene: SceneDocument) -> Self {
        Self {
            viewer: ModelSceneViewer::new(ReplayHost::new(Viewport::new(1280.0, 720.0)), config),
            editor: SceneEditor::from_document(scene),
            model: None,
            frames: 0,
        }
    }

    pub fn viewer(&self) -> &ModelSceneViewer<ReplayHost> {
        &self.viewer
    }

    pub fn editor(&self) -> &SceneEditor {
        &self.editor
    }

    /// Number of frames drawn by display-refresh callbacks.
    pub fn frames_drawn(&self) -> usize {
        self.frames
    }

    /// Runs every step and returns the recorded events.
    pub fn run(&mut self, script: &ReplayScript) -> Vec<ReplayLine> {
        let mut lines = Vec::new();
        for (index, step) in script.steps.iter().enumerate() {
            tracing::debug!(index, ?step, "Replaying step");
            self.apply(step);
            self.sync_props();
            self.settle(index, &mut lines);
        }
        self.viewer.teardown();
        tracing::info!(steps = script.steps.len(), events = lines.len(), "Replay finished");
        lines
    }

    fn apply(&mut self, step: &ReplayStep) {
        let editor = &mut self.editor;
        match step {
            ReplayStep::LoadModel(handle) => self.model = Some(handle.clone()),
            ReplayStep::UnloadModel => self.model = None,
            ReplayStep::StartFire => editor.start_fire(),
            ReplayStep::DiscardFire => editor.discard_fire(),
            ReplayStep::CommitFire => {
                editor.commit_fire(Utc::now());
            }
            ReplayStep::StartCamera => editor.start_camera(),
            ReplayStep::DiscardCamera => editor.discard_camera(),
            ReplayStep::CommitCamera => {
                editor.commit_camera(Utc::now());
            }
            ReplayStep::EditCamera(index) => match editor.cameras().get(*index).map(|c| c.id) {
                Some(id) => {
                    editor.edit_camera(id);
                }
                None => tracing::warn!(index, "No committed camera at index"),
            },
            ReplayStep::FocusCamera(index) => match editor.cameras().get(*index).map(|c| c.id) {
                Some(id) => editor.focus_camera(id),
                None => tracing::warn!(index, "No committed camera at index"),
            },
            ReplayStep::Resize { width, height } => {
                self.viewer.host_mut().viewport = Viewport::new(*width, *height);
                self.viewer.resize();
            }
            ReplayStep::PointerDown(input) => {
                self.viewer.pointer_down(*input);
            }
            ReplayStep::PointerMove(input) => {
                self.viewer.pointer_move(*input);
            }
            ReplayStep::PointerUp(input) => {
                self.viewer.pointer_up(*input);
            }
            ReplayStep::Wheel(delta_y) => self.viewer.wheel(*delta_y),
            ReplayStep::Frames(count) => {
                for _ in 0..*count {
                    if let Some(token) = self.viewer.pending_frame()
                        && self.viewer.on_animation_frame(token)
                    {
                        self.frames += 1;
                    }
                }
            }
            ReplayStep::FailNextAsset => self.viewer.host_mut().fail_next = true,
        }
    }

    fn sync_props(&mut self) {
        self.viewer
            .set_props(ViewerProps::from_editor(&self.editor, self.model.clone()));
    }

    /// Answers asset requests and merges events until the viewer is quiet.
    fn settle(&mut self, step: usize, lines: &mut Vec<ReplayLine>) {
        loop {
            while let Some((request, result)) = self.viewer.host_mut().next_request() {
                self.viewer.complete_asset(request.ticket, result);
            }

            let events = self.viewer.drain_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                self.merge(&event);
                lines.push(ReplayLine { step, event });
            }
            self.sync_props();
        }
    }

    fn merge(&mut self, event: &ViewerEvent) {
        if let ViewerEvent::AssetLoadFailed { kind, handle, reason } = event {
            tracing::warn!(?kind, %handle, %reason, "Replay asset failed");
        }
        event.apply_to(&mut self.editor);
    }
}

/// Loads and runs a script file, returning its events as JSON lines.
pub fn run_script(path: &Path, config: ViewerConfig) -> Result<Vec<String>, ReplayError> {
    let script = ReplayScript::load(path)?;
    let mut replay = Replay::new(config, script.scene.clone());
    replay
        .run(&script)
        .iter()
        .map(ReplayLine::to_json)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sv_core::DragMode;

    #[test]
    fn test_parse_script() {
        let script = ReplayScript::from_ron(
            r#"(
                steps: [
                    LoadModel("site.glb"),
                    StartCamera,
                    PointerDown((x: 10.0, y: 20.0)),
                    PointerUp((x: 10.0, y: 20.0, button: Secondary)),
                    Resize(width: 640.0, height: 480.0),
                    Frames(3),
                ],
            )"#,
        )
        .unwrap();

        assert!(script.scene.is_empty());
        assert_eq!(script.steps.len(), 6);
        assert_eq!(script.steps[0], ReplayStep::LoadModel("site.glb".into()));
        assert_eq!(
            script.steps[3],
            ReplayStep::PointerUp(PointerInput::new(10.0, 20.0).with_button(crate::input::PointerButton::Secondary))
        );
    }

    #[test]
    fn test_placeholder_template_rests_on_ground() {
        let bounds = placeholder_asset(AssetKind::MarkerTemplate).bounds();
        assert!(bounds.min.y.abs() < 1e-6);
    }

    #[test]
    fn test_replay_loads_assets_and_draws() {
        let script = ReplayScript {
            scene: SceneDocument::default(),
            steps: vec![
                ReplayStep::LoadModel("site.glb".into()),
                ReplayStep::StartFire,
                ReplayStep::Frames(4),
            ],
        };
        let mut replay = Replay::new(ViewerConfig::new(), script.scene.clone());
        let lines = replay.run(&script);

        assert_eq!(
            lines,
            vec![ReplayLine {
                step: 0,
                event: ViewerEvent::DragModeChanged {
                    mode: DragMode::Translate
                },
            }]
        );
        assert_eq!(replay.frames_drawn(), 4);
        assert!(replay.viewer().is_torn_down());
        assert!(!replay.viewer().host().is_input_attached());
    }

    #[test]
    fn test_failed_asset_is_recorded() {
        let script = ReplayScript {
            scene: SceneDocument::default(),
            steps: vec![ReplayStep::FailNextAsset, ReplayStep::LoadModel("missing.glb".into())],
        };
        let mut replay = Replay::new(ViewerConfig::new(), script.scene.clone());
        let lines = replay.run(&script);

        let json: Vec<String> = lines.iter().map(|l| l.to_json().unwrap()).collect();
        assert_eq!(json.len(), 2);
        assert_eq!(json[0], r#"{"step":1,"event":"dragModeChanged","mode":"translate"}"#);
        assert!(json[1].contains(r#""event":"assetLoadFailed""#));
        assert!(json[1].contains(r#""handle":"missing.glb""#));
    }

    #[test]
    fn test_events_flow_back_into_editor() {
        let mut replay = Replay::new(ViewerConfig::new(), SceneDocument::default());
        replay.merge(&ViewerEvent::DragModeChanged { mode: DragMode::Rotate });
        assert_eq!(replay.editor().drag_mode(), DragMode::Rotate);

        replay.editor.start_fire();
        replay.merge(&ViewerEvent::DraftFireMoved(sv_core::FireMove { x: 1.5, z: -2.0 }));
        let draft = replay.editor().draft_fire().unwrap();
        assert_eq!((draft.x, draft.z), (1.5, -2.0));
    }
}
