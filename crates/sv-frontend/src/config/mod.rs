//! Viewer configuration
//!
//! Scene look, navigation feel, interaction tuning, marker sizing and the
//! camera focus offsets. Every section defaults, so partial files load.

mod manager;

pub use manager::{ConfigError, ConfigManager, SharedConfig, create_shared_config};

use serde::{Deserialize, Serialize};

/// Scene dressing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Background color (0xRRGGBB)
    pub background: u32,
    pub ground_size: f32,
    pub ground_color: u32,
    /// Ground plane height; slightly below zero so the grid stays visible
    pub ground_height: f32,
    pub grid_size: f32,
    pub grid_divisions: u32,
    pub hemisphere_sky: u32,
    pub hemisphere_ground: u32,
    pub hemisphere_intensity: f32,
    pub directional_color: u32,
    pub directional_intensity: f32,
    pub directional_position: [f32; 3],
    /// Rotation about X applied to loaded models (degrees); converts Z-up assets to Y-up
    pub model_rotation_x: f32,
    /// Initial viewing camera position
    pub camera_position: [f32; 3],
    /// Upper bound for the device pixel ratio of the render surface
    pub max_pixel_ratio: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: 0xdbeafe,
            ground_size: 200.0,
            ground_color: 0x9ca3af,
            ground_height: -0.001,
            grid_size: 30.0,
            grid_divisions: 30,
            hemisphere_sky: 0xffffff,
            hemisphere_ground: 0x94a3b8,
            hemisphere_intensity: 1.2,
            directional_color: 0xffffff,
            directional_intensity: 1.1,
            directional_position: [4.0, 8.0, 4.0],
            model_rotation_x: -90.0,
            camera_position: [2.8, 2.2, 4.0],
            max_pixel_ratio: 2.0,
        }
    }
}

/// Orbit navigation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrbitConfig {
    pub target: [f32; 3],
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            target: [0.0, 1.0, 0.0],
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}

/// Draft marker dragging
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InteractionConfig {
    /// Movement (px, either axis) after which a press becomes a drag
    pub click_threshold: f32,
    /// Degrees of yaw/pitch per pixel in rotate mode
    pub rotate_sensitivity: f64,
    /// Pitch is clamped to ±this many degrees
    pub pitch_limit: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            click_threshold: 2.0,
            rotate_sensitivity: 0.25,
            pitch_limit: 85.0,
        }
    }
}

/// Marker sizing and assets
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarkerConfig {
    /// Scale applied to the fire template before the record's own scale
    pub fire_base_scale: f64,
    /// Handle of the fire marker template asset
    pub fire_template: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            fire_base_scale: 0.5,
            fire_template: "/fire.glb".to_string(),
        }
    }
}

/// Looking through a committed camera
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FocusConfig {
    /// Height of the lens pivot above the marker base
    pub eye_height: f32,
    /// Distance from the pivot to the lens along the view direction
    pub lens_offset: f32,
    /// Distance from the eye to the orbit target
    pub look_distance: f32,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            eye_height: 0.26,
            lens_offset: 0.42,
            look_distance: 3.0,
        }
    }
}

/// Complete viewer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ViewerConfig {
    /// Configuration format version
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub orbit: OrbitConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub markers: MarkerConfig,
    #[serde(default)]
    pub focus: FocusConfig,
}

impl ViewerConfig {
    /// Current configuration version
    pub const CURRENT_VERSION: u32 = 1;

    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            ..Default::default()
        }
    }
}
