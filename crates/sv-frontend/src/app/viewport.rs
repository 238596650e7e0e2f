//! Viewport panel: shows the rendered frame and routes pointer input

use std::sync::Arc;

use sv_renderer::Viewport;

use super::host::{EguiHost, egui_cursor};
use crate::input::{PointerButton, PointerInput};
use crate::viewer::ModelSceneViewer;

/// Pointer input bound for the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoutedInput {
    Down(PointerInput),
    Move(PointerInput),
    Up(PointerInput),
}

/// Viewer button for an egui button. Extra buttons are not used.
pub fn pointer_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        egui::PointerButton::Extra1 | egui::PointerButton::Extra2 => None,
    }
}

/// Viewport of a panel rectangle. Positions stay in egui points, which play
/// the role of CSS pixels.
pub fn viewport_from_rect(rect: egui::Rect, pixels_per_point: f32) -> Viewport {
    Viewport {
        left: rect.min.x,
        top: rect.min.y,
        width: rect.width(),
        height: rect.height(),
        device_pixel_ratio: pixels_per_point,
    }
}

/// Tracks which button pressed inside the panel so moves and the release
/// keep reaching the viewer after the pointer leaves it.
#[derive(Debug, Default)]
pub struct PointerRouter {
    captured: Option<PointerButton>,
}

impl PointerRouter {
    pub fn is_captured(&self) -> bool {
        self.captured.is_some()
    }

    pub fn route(&mut self, event: &egui::Event, rect: egui::Rect) -> Option<RoutedInput> {
        match event {
            egui::Event::PointerButton {
                pos,
                button,
                pressed: true,
                ..
            } if self.captured.is_none() && rect.contains(*pos) => {
                let button = pointer_button(*button)?;
                self.captured = Some(button);
                Some(RoutedInput::Down(PointerInput::new(pos.x, pos.y).with_button(button)))
            }
            egui::Event::PointerButton {
                pos,
                button,
                pressed: false,
                ..
            } => {
                let button = pointer_button(*button)?;
                if self.captured != Some(button) {
                    return None;
                }
                self.captured = None;
                Some(RoutedInput::Up(PointerInput::new(pos.x, pos.y).with_button(button)))
            }
            egui::Event::PointerMoved(pos) => match self.captured {
                Some(button) => Some(RoutedInput::Move(PointerInput::new(pos.x, pos.y).with_button(button))),
                None if rect.contains(*pos) => Some(RoutedInput::Move(PointerInput::new(pos.x, pos.y))),
                None => None,
            },
            _ => None,
        }
    }

    /// Forgets the captured button without a release.
    pub fn reset(&mut self) {
        self.captured = None;
    }
}

/// egui texture showing the renderer's target.
struct RegisteredTexture {
    id: egui::TextureId,
    view: Arc<wgpu::TextureView>,
}

/// Central panel hosting the 3D view.
#[derive(Default)]
pub struct ViewportPanel {
    router: PointerRouter,
    texture: Option<RegisteredTexture>,
}

impl ViewportPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        viewer: &mut ModelSceneViewer<EguiHost>,
        render_state: Option<&egui_wgpu::RenderState>,
    ) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        let viewport = viewport_from_rect(rect, ui.ctx().pixels_per_point());
        if viewer.host_mut().set_viewport(viewport) {
            viewer.resize();
        }

        self.route_input(ui, rect, response.hovered(), viewer);

        if let Some(token) = viewer.host_mut().take_frame() {
            viewer.on_animation_frame(token);
        }

        let painter = ui.painter_at(rect);
        match self.sync_texture(viewer.host(), render_state) {
            Some(id) if viewer.scene().is_some() => {
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                painter.image(id, rect, uv, egui::Color32::WHITE);
            }
            _ => {
                painter.rect_filled(rect, 0.0, ui.visuals().extreme_bg_color);
                let message = if viewer.props().model_handle().is_none() {
                    "No site model"
                } else {
                    "Preparing viewer"
                };
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    message,
                    egui::FontId::proportional(16.0),
                    ui.visuals().weak_text_color(),
                );
            }
        }

        if response.hovered() && viewer.host().is_input_attached() {
            ui.ctx().set_cursor_icon(egui_cursor(viewer.host().cursor()));
        }
    }

    fn route_input(
        &mut self,
        ui: &egui::Ui,
        rect: egui::Rect,
        hovered: bool,
        viewer: &mut ModelSceneViewer<EguiHost>,
    ) {
        if !viewer.host().is_input_attached() {
            self.router.reset();
            return;
        }

        let (events, scroll) = ui.input(|i| (i.events.clone(), i.raw_scroll_delta));
        for event in &events {
            match self.router.route(event, rect) {
                Some(RoutedInput::Down(input)) => {
                    viewer.pointer_down(input);
                }
                Some(RoutedInput::Move(input)) => {
                    viewer.pointer_move(input);
                }
                Some(RoutedInput::Up(input)) => {
                    viewer.pointer_up(input);
                }
                None => {}
            }
        }

        // egui scrolls up with positive y; the viewer zooms out on positive deltas
        if hovered && scroll.y != 0.0 {
            viewer.wheel(-scroll.y);
        }
    }

    /// Registers the renderer's current texture with egui, replacing a
    /// stale registration.
    fn sync_texture(
        &mut self,
        host: &EguiHost,
        render_state: Option<&egui_wgpu::RenderState>,
    ) -> Option<egui::TextureId> {
        let render_state = render_state?;
        let slot = host.target()?.lock();
        let Some(target) = slot.as_ref() else {
            if let Some(old) = self.texture.take() {
                render_state.renderer.write().free_texture(&old.id);
            }
            return None;
        };

        let current = self.texture.as_ref().is_some_and(|t| Arc::ptr_eq(&t.view, &target.view));
        if !current {
            let mut egui_renderer = render_state.renderer.write();
            if let Some(old) = self.texture.take() {
                egui_renderer.free_texture(&old.id);
            }
            let id = egui_renderer.register_native_texture(&render_state.device, &target.view, wgpu::FilterMode::Linear);
            self.texture = Some(RegisteredTexture {
                id,
                view: target.view.clone(),
            });
        }
        self.texture.as_ref().map(|t| t.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(100.0, 50.0), egui::vec2(400.0, 300.0))
    }

    fn press(x: f32, y: f32, button: egui::PointerButton, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos: egui::pos2(x, y),
            button,
            pressed,
            modifiers: egui::Modifiers::default(),
        }
    }

    #[test]
    fn test_press_outside_panel_is_ignored() {
        let mut router = PointerRouter::default();
        assert_eq!(router.route(&press(10.0, 10.0, egui::PointerButton::Primary, true), rect()), None);
        assert!(!router.is_captured());
        assert_eq!(router.route(&egui::Event::PointerMoved(egui::pos2(20.0, 20.0)), rect()), None);
    }

    #[test]
    fn test_drag_keeps_routing_after_leaving_panel() {
        let mut router = PointerRouter::default();
        let down = router.route(&press(150.0, 60.0, egui::PointerButton::Secondary, true), rect());
        assert_eq!(
            down,
            Some(RoutedInput::Down(
                PointerInput::new(150.0, 60.0).with_button(PointerButton::Secondary)
            ))
        );

        let moved = router.route(&egui::Event::PointerMoved(egui::pos2(20.0, -40.0)), rect());
        assert!(matches!(moved, Some(RoutedInput::Move(input)) if input.button == PointerButton::Secondary));

        // Releasing another button does not end the drag
        assert_eq!(router.route(&press(20.0, -40.0, egui::PointerButton::Primary, false), rect()), None);
        let up = router.route(&press(20.0, -40.0, egui::PointerButton::Secondary, false), rect());
        assert!(matches!(up, Some(RoutedInput::Up(_))));
        assert!(!router.is_captured());
    }

    #[test]
    fn test_extra_buttons_are_not_routed() {
        let mut router = PointerRouter::default();
        assert_eq!(router.route(&press(150.0, 60.0, egui::PointerButton::Extra1, true), rect()), None);
        assert!(!router.is_captured());
    }

    #[test]
    fn test_viewport_from_rect_maps_client_points() {
        let viewport = viewport_from_rect(rect(), 2.0);
        assert_eq!(viewport.to_ndc(100.0, 50.0), Some(glam::Vec2::new(-1.0, 1.0)));
        assert_eq!(viewport.to_ndc(500.0, 350.0), Some(glam::Vec2::new(1.0, -1.0)));
        assert_eq!(viewport.buffer_size(2.0), (800, 600));
    }
}
