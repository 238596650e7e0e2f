//! Site viewer desktop entry point

use clap::Parser;
use sv_core::SceneDocument;
use sv_frontend::app::SiteViewerApp;
use sv_frontend::cli::{ViewerArgs, load_config};

fn main() -> eframe::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let args = ViewerArgs::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sv_frontend=debug,site_viewer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(model = %args.model, "Starting site viewer");

    let config = load_config(args.config.as_deref());
    let scene = match &args.scene {
        Some(path) => match std::fs::read_to_string(path).map(|json| SceneDocument::from_json(&json)) {
            Ok(Ok(scene)) => scene,
            Ok(Err(err)) => {
                tracing::warn!(path = %path.display(), %err, "Invalid scene document; starting empty");
                SceneDocument::default()
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "Failed to read scene document; starting empty");
                SceneDocument::default()
            }
        },
        None => SceneDocument::default(),
    };

    // Configure wgpu for better compatibility (software GL drivers included)
    let wgpu_options = egui_wgpu::WgpuConfiguration {
        wgpu_setup: egui_wgpu::WgpuSetup::CreateNew {
            supported_backends: wgpu::Backends::GL,
            power_preference: wgpu::PowerPreference::LowPower,
            device_descriptor: std::sync::Arc::new(|_adapter| wgpu::DeviceDescriptor {
                label: Some("site-viewer device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
            }),
        },
        ..Default::default()
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Site Viewer"),
        wgpu_options,
        ..Default::default()
    };

    let model = args.model;
    eframe::run_native(
        "site-viewer",
        native_options,
        Box::new(move |cc| Ok(Box::new(SiteViewerApp::new(cc, config, scene, model)?))),
    )
}
