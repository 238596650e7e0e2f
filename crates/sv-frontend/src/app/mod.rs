//! Site viewer desktop application.
//!
//! An eframe window embedding [`ModelSceneViewer`] the way a host
//! application does: a [`SceneEditor`] owns the markers, its state is fed to
//! the viewer as props, and viewer events are merged back into it. Asset
//! requests are answered with procedural placeholder geometry.

mod host;
mod viewport;

pub use host::{EguiHost, egui_cursor};
pub use viewport::{PointerRouter, RoutedInput, ViewportPanel, pointer_button, viewport_from_rect};

use chrono::Utc;
use sv_core::{DragMode, SceneDocument, SceneEditor};

use crate::config::ViewerConfig;
use crate::events::ViewerEvent;
use crate::props::ViewerProps;
use crate::replay::placeholder_asset;
use crate::viewer::ModelSceneViewer;

/// Application startup errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("wgpu render state unavailable; the window must use the wgpu backend")]
    NoRenderState,
}

/// Marker editing window around the 3D viewer.
pub struct SiteViewerApp {
    viewer: ModelSceneViewer<EguiHost>,
    editor: SceneEditor,
    model: Option<String>,
    model_input: String,
    render_state: egui_wgpu::RenderState,
    viewport: ViewportPanel,
    last_error: Option<String>,
}

impl SiteViewerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: ViewerConfig,
        scene: SceneDocument,
        model: String,
    ) -> Result<Self, AppError> {
        let render_state = cc.wgpu_render_state.clone().ok_or(AppError::NoRenderState)?;
        let host = EguiHost::new(cc.egui_ctx.clone(), Some(render_state.clone()));

        let mut app = Self {
            viewer: ModelSceneViewer::new(host, config),
            editor: SceneEditor::from_document(scene),
            model: Some(model.clone()),
            model_input: model,
            render_state,
            viewport: ViewportPanel::new(),
            last_error: None,
        };
        app.sync_props();
        Ok(app)
    }

    fn sync_props(&mut self) {
        self.viewer
            .set_props(ViewerProps::from_editor(&self.editor, self.model.clone()));
    }

    /// Answers queued asset requests with placeholders.
    fn answer_assets(&mut self) {
        while let Some(request) = self.viewer.host_mut().take_asset_request() {
            tracing::info!(handle = %request.handle, kind = ?request.ticket.kind, "Loading placeholder asset");
            self.viewer
                .complete_asset(request.ticket, Ok(placeholder_asset(request.ticket.kind)));
        }
    }

    /// Merges viewer events into the editor and refreshes the props.
    fn merge_events(&mut self) {
        let events = self.viewer.drain_events();
        if events.is_empty() {
            return;
        }
        for event in &events {
            if let ViewerEvent::AssetLoadFailed { handle, reason, .. } = event {
                self.last_error = Some(format!("{handle}: {reason}"));
            }
            event.apply_to(&mut self.editor);
        }
        self.sync_props();
    }

    fn marker_panel(&mut self, ui: &mut egui::Ui) {
        let mut changed = false;

        ui.heading("Site");
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.model_input);
            if ui.button("Load").clicked() {
                self.model = Some(self.model_input.clone());
                changed = true;
            }
        });
        if ui.add_enabled(self.model.is_some(), egui::Button::new("Unload")).clicked() {
            self.model = None;
            changed = true;
        }
        if let Some(error) = &self.last_error {
            ui.colored_label(ui.visuals().error_fg_color, error);
        }

        ui.separator();
        ui.heading("Fires");
        ui.label(format!("{} placed", self.editor.fires().len()));
        ui.horizontal(|ui| {
            let drafting = self.editor.draft_fire().is_some();
            if ui.add_enabled(!drafting, egui::Button::new("New")).clicked() {
                self.editor.start_fire();
                changed = true;
            }
            if ui.add_enabled(drafting, egui::Button::new("Commit")).clicked() {
                self.editor.commit_fire(Utc::now());
                changed = true;
            }
            if ui.add_enabled(drafting, egui::Button::new("Discard")).clicked() {
                self.editor.discard_fire();
                changed = true;
            }
        });
        if let Some(draft) = self.editor.draft_fire() {
            ui.label(format!("Draft at x {:.2}, z {:.2}", draft.x, draft.z));
        }

        ui.separator();
        ui.heading("Cameras");
        ui.horizontal(|ui| {
            let drafting = self.editor.draft_camera().is_some();
            if ui.add_enabled(!drafting, egui::Button::new("New")).clicked() {
                self.editor.start_camera();
                changed = true;
            }
            if ui.add_enabled(drafting, egui::Button::new("Commit")).clicked() {
                self.editor.commit_camera(Utc::now());
                changed = true;
            }
            if ui.add_enabled(drafting, egui::Button::new("Discard")).clicked() {
                self.editor.discard_camera();
                changed = true;
            }
        });
        if let Some(draft) = self.editor.draft_camera() {
            let mode = match self.editor.drag_mode() {
                DragMode::Translate => "move",
                DragMode::Rotate => "aim",
            };
            ui.label(format!(
                "Draft yaw {:.0}, pitch {:.0} (drag to {mode}, click to toggle)",
                draft.yaw, draft.pitch
            ));
        }

        let cameras: Vec<_> = self.editor.cameras().iter().map(|c| (c.id, c.name.clone())).collect();
        egui::ScrollArea::vertical().show(ui, |ui| {
            for (id, name) in cameras {
                ui.horizontal(|ui| {
                    ui.label(name);
                    if ui.small_button("Focus").clicked() {
                        self.editor.focus_camera(id);
                        changed = true;
                    }
                    if ui.small_button("Edit").clicked() {
                        self.editor.edit_camera(id);
                        changed = true;
                    }
                });
            }
        });

        if changed {
            self.sync_props();
        }
    }
}

impl eframe::App for SiteViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.answer_assets();
        self.merge_events();

        egui::SidePanel::left("markers")
            .default_width(240.0)
            .show(ctx, |ui| self.marker_panel(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                self.viewport.show(ui, &mut self.viewer, Some(&self.render_state));
            });

        self.merge_events();
    }
}
