//! [`ViewerHost`] backed by an egui window

use std::collections::VecDeque;

use sv_renderer::{FrameRenderer, HeadlessRenderer, SharedTarget, Viewport, WgpuRenderer};

use crate::host::{AssetRequest, CursorIcon, FrameToken, ViewerHost};

/// Host services of the site viewer window.
///
/// Frame requests become egui repaints; the app delivers the pending token
/// on its next update. Asset requests queue up until the app answers them.
pub struct EguiHost {
    ctx: egui::Context,
    render_state: Option<egui_wgpu::RenderState>,
    assets: VecDeque<AssetRequest>,
    cursor: CursorIcon,
    input_attached: bool,
    next_frame: u64,
    pending_frame: Option<FrameToken>,
    viewport: Viewport,
    target: Option<SharedTarget>,
}

impl EguiHost {
    /// Without a wgpu render state frames are only recorded, not drawn.
    pub fn new(ctx: egui::Context, render_state: Option<egui_wgpu::RenderState>) -> Self {
        Self {
            ctx,
            render_state,
            assets: VecDeque::new(),
            cursor: CursorIcon::default(),
            input_attached: false,
            next_frame: 0,
            pending_frame: None,
            viewport: Viewport::default(),
            target: None,
        }
    }

    pub fn take_asset_request(&mut self) -> Option<AssetRequest> {
        self.assets.pop_front()
    }

    /// Takes the frame callback due on this update, if any.
    pub fn take_frame(&mut self) -> Option<FrameToken> {
        self.pending_frame.take()
    }

    pub fn cursor(&self) -> CursorIcon {
        self.cursor
    }

    pub fn is_input_attached(&self) -> bool {
        self.input_attached
    }

    /// Stores the panel rectangle. Returns true if it changed.
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        if self.viewport == viewport {
            return false;
        }
        self.viewport = viewport;
        true
    }

    /// Output slot of the current GPU renderer.
    pub fn target(&self) -> Option<&SharedTarget> {
        self.target.as_ref()
    }
}

impl ViewerHost for EguiHost {
    fn request_asset(&mut self, request: AssetRequest) {
        tracing::debug!(handle = %request.handle, kind = ?request.ticket.kind, "Asset requested");
        self.assets.push_back(request);
        self.ctx.request_repaint();
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
        let token = FrameToken(self.next_frame);
        self.pending_frame = Some(token);
        self.ctx.request_repaint();
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if self.pending_frame == Some(token) {
            self.pending_frame = None;
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn create_renderer(&mut self) -> Box<dyn FrameRenderer> {
        match &self.render_state {
            Some(state) => {
                let renderer = WgpuRenderer::new(state.device.clone(), state.queue.clone(), state.target_format);
                self.target = Some(renderer.target());
                Box::new(renderer)
            }
            None => {
                tracing::warn!("No wgpu render state; frames will not be drawn");
                self.target = None;
                Box::new(HeadlessRenderer::new())
            }
        }
    }
}

/// egui cursor for a viewer cursor affordance.
pub fn egui_cursor(cursor: CursorIcon) -> egui::CursorIcon {
    match cursor {
        CursorIcon::Grab => egui::CursorIcon::Grab,
        CursorIcon::Grabbing => egui::CursorIcon::Grabbing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::host::AssetKind;
    use crate::props::ViewerProps;
    use crate::viewer::ModelSceneViewer;

    fn host() -> EguiHost {
        let mut host = EguiHost::new(egui::Context::default(), None);
        host.set_viewport(Viewport::new(640.0, 480.0));
        host
    }

    #[test]
    fn test_frame_requests_are_delivered_once() {
        let mut host = host();
        let first = host.request_frame();
        let second = host.request_frame();
        assert_ne!(first, second);

        assert_eq!(host.take_frame(), Some(second));
        assert_eq!(host.take_frame(), None);
    }

    #[test]
    fn test_cancel_only_drops_matching_token() {
        let mut host = host();
        let token = host.request_frame();
        host.cancel_frame(FrameToken(token.0 + 1));
        assert_eq!(host.take_frame(), Some(token));

        let token = host.request_frame();
        host.cancel_frame(token);
        assert_eq!(host.take_frame(), None);
    }

    #[test]
    fn test_viewer_runs_on_egui_host() {
        let mut viewer = ModelSceneViewer::new(host(), ViewerConfig::new());
        viewer.set_props(ViewerProps {
            model: Some("site.glb".into()),
            ..Default::default()
        });

        let host = viewer.host_mut();
        assert!(host.is_input_attached());
        assert!(host.target().is_none());
        let kinds: Vec<AssetKind> = std::iter::from_fn(|| host.take_asset_request())
            .map(|r| r.ticket.kind)
            .collect();
        assert_eq!(kinds, vec![AssetKind::Model, AssetKind::MarkerTemplate]);

        let token = viewer.host_mut().take_frame().unwrap();
        assert!(viewer.on_animation_frame(token));
        assert!(viewer.host_mut().take_frame().is_some());

        viewer.teardown();
        assert!(!viewer.host().is_input_attached());
        assert_eq!(viewer.host_mut().take_frame(), None);
    }

    #[test]
    fn test_viewport_change_is_reported() {
        let mut host = host();
        assert!(!host.set_viewport(Viewport::new(640.0, 480.0)));
        assert!(host.set_viewport(Viewport::new(800.0, 480.0)));
    }

    #[test]
    fn test_cursor_mapping() {
        assert_eq!(egui_cursor(CursorIcon::Grab), egui::CursorIcon::Grab);
        assert_eq!(egui_cursor(CursorIcon::Grabbing), egui::CursorIcon::Grabbing);
    }
}
