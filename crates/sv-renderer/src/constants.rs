//! Rendering constants and configuration
//!
//! Centralizes magic numbers used across the renderer.

/// Camera default parameters
pub mod camera {
    /// Default vertical field of view in degrees
    pub const DEFAULT_FOV_DEGREES: f32 = 50.0;
    /// Default near clipping plane
    pub const DEFAULT_NEAR: f32 = 0.1;
    /// Default far clipping plane
    pub const DEFAULT_FAR: f32 = 1000.0;
    /// Default aspect ratio before the first resize
    pub const DEFAULT_ASPECT: f32 = 16.0 / 9.0;
}

/// Orbit controls parameters
pub mod orbit {
    /// Fraction of the pending motion applied per update when damping is on
    pub const DEFAULT_DAMPING_FACTOR: f32 = 0.05;
    /// Wheel zoom step base (raised to the zoom speed)
    pub const ZOOM_STEP: f32 = 0.95;
    /// Keeps the polar angle away from the poles
    pub const POLAR_EPSILON: f32 = 1e-6;
    /// Minimum orbit distance
    pub const MIN_DISTANCE: f32 = 0.0;
    /// Maximum orbit distance
    pub const MAX_DISTANCE: f32 = f32::INFINITY;
}

/// Picking parameters
pub mod picking {
    /// Ray/plane and ray/triangle parallelism tolerance
    pub const EPSILON: f32 = 1e-6;
}

/// Grid rendering constants
pub mod grid {
    /// Center line color
    pub const CENTER_COLOR: [f32; 4] = [0.392, 0.455, 0.545, 1.0];
    /// Regular line color
    pub const LINE_COLOR: [f32; 4] = [0.796, 0.835, 0.882, 1.0];
}

/// Camera marker rig dimensions (meters)
pub mod marker {
    pub const POLE_RADIUS: f32 = 0.018;
    pub const POLE_HEIGHT: f32 = 0.26;
    /// Height of the head pivot above the marker base
    pub const HEAD_PIVOT_HEIGHT: f32 = 0.26;
    pub const HEAD_SIZE: [f32; 3] = [0.22, 0.1, 0.36];
    pub const HEAD_OFFSET: f32 = 0.17;
    pub const LENS_RADIUS: f32 = 0.042;
    pub const LENS_LENGTH: f32 = 0.2;
    /// Forward distance of the lens from the head pivot
    pub const LENS_OFFSET: f32 = 0.42;
    pub const CONE_RADIUS: f32 = 0.2;
    pub const CONE_LENGTH: f32 = 0.7;
    pub const CONE_OFFSET: f32 = 0.78;
    pub const CONE_OPACITY: f32 = 0.18;

    pub const POLE_COLOR: u32 = 0x64748b;
    pub const HEAD_COLOR: u32 = 0xe2e8f0;
    pub const LENS_COLOR: u32 = 0x0f172a;
    pub const CONE_COLOR: u32 = 0xf59e0b;
}
