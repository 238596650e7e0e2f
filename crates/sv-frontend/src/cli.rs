//! Command line arguments of the site viewer binaries

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::{ConfigManager, ViewerConfig, create_shared_config};

/// Replays a viewer script headlessly and prints its events as JSON lines.
#[derive(Debug, Parser)]
#[command(name = "sv-replay", about = "Replay a site viewer script", version, long_about = None)]
pub struct ReplayArgs {
    /// Replay script (RON)
    pub script: PathBuf,

    /// Viewer config file (RON); defaults to the user config
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Opens the interactive site viewer window.
#[derive(Debug, Parser)]
#[command(name = "site-viewer", about = "Place fire and camera markers on a site model", version, long_about = None)]
pub struct ViewerArgs {
    /// Handle of the site model to show
    #[arg(long, default_value = "site.glb")]
    pub model: String,

    /// Scene document (JSON) with the committed markers
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Viewer config file (RON); defaults to the user config
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Viewer config from `path`, or from the user config location without one.
pub fn load_config(path: Option<&Path>) -> ViewerConfig {
    match path {
        Some(path) => ConfigManager::with_path(path).config().clone(),
        None => create_shared_config().read().config().clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_replay_args_positional_script() {
        let args = ReplayArgs::try_parse_from(["sv-replay", "demos/place-markers.ron"]).unwrap();
        assert_eq!(args.script, PathBuf::from("demos/place-markers.ron"));
        assert!(args.config.is_none());

        let args = ReplayArgs::try_parse_from(["sv-replay", "--config", "viewer.ron", "run.ron"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("viewer.ron")));
        assert_eq!(args.script, PathBuf::from("run.ron"));
    }

    #[test]
    fn test_replay_help_is_not_a_script() {
        let err = ReplayArgs::try_parse_from(["sv-replay", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);

        let err = ReplayArgs::try_parse_from(["sv-replay"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_viewer_args_defaults() {
        let args = ViewerArgs::try_parse_from(["site-viewer"]).unwrap();
        assert_eq!(args.model, "site.glb");
        assert!(args.scene.is_none() && args.config.is_none());
    }

    #[test]
    fn test_explicit_config_path_is_read() {
        let dir = std::env::temp_dir().join(format!("sv-cli-{}", std::process::id()));
        let path = dir.join("viewer.ron");

        let mut manager = ConfigManager::with_path(&path);
        manager.config_mut().scene.max_pixel_ratio = 1.0;
        manager.save().unwrap();

        assert_eq!(load_config(Some(&path)).scene.max_pixel_ratio, 1.0);
        // Missing files fall back to defaults
        assert_eq!(
            load_config(Some(&dir.join("missing.ron"))).scene.max_pixel_ratio,
            ViewerConfig::new().scene.max_pixel_ratio
        );
        let _ = std::fs::remove_dir_all(&dir);
    }
}
