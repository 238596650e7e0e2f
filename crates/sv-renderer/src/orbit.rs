//! Orbit navigation.
//!
//! [`OrbitControls`] keeps the camera on a sphere around a target point.
//! Pointer motion accumulates into pending rotation, pan and dolly amounts;
//! [`OrbitControls::update`] applies them to the camera once per frame. With
//! damping enabled only a fraction of the pending motion is applied per
//! update, so the camera glides to rest over the following frames.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::camera::PerspectiveCamera;
use crate::constants::orbit as defaults;

/// What a pointer drag does to the orbit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitAction {
    Rotate,
    Dolly,
    Pan,
}

/// Spherical coordinates around +Y: `theta` from +Z toward +X, `phi` from +Y.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Orbit, dolly and pan around a target.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// Point the camera orbits around and looks at.
    pub target: Vec3,
    /// Disabled controls ignore input; [`OrbitControls::update`] still settles motion.
    pub enabled: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    spherical_delta: Spherical,
    scale: f32,
    pan_offset: Vec3,
    active: Option<(OrbitAction, Vec2)>,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            enabled: true,
            enable_damping: false,
            damping_factor: defaults::DEFAULT_DAMPING_FACTOR,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: defaults::MIN_DISTANCE,
            max_distance: defaults::MAX_DISTANCE,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            spherical_delta: Spherical::default(),
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            active: None,
        }
    }

    pub fn with_damping(mut self, factor: f32) -> Self {
        self.enable_damping = true;
        self.damping_factor = factor;
        self
    }

    /// The action of the drag in progress, if any.
    pub fn active_action(&self) -> Option<OrbitAction> {
        self.active.map(|(action, _)| action)
    }

    /// Starts a drag. Returns false when disabled.
    pub fn begin(&mut self, action: OrbitAction, position: Vec2) -> bool {
        if !self.enabled {
            return false;
        }
        self.active = Some((action, position));
        true
    }

    /// Continues the drag in progress. `viewport_height` is in the same units as `position`.
    pub fn drag(&mut self, position: Vec2, camera: &PerspectiveCamera, viewport_height: f32) {
        if !self.enabled || viewport_height <= 0.0 {
            return;
        }
        let Some((action, last)) = self.active else {
            return;
        };
        let delta = position - last;
        self.active = Some((action, position));

        match action {
            OrbitAction::Rotate => {
                let delta = delta * self.rotate_speed;
                self.rotate_left(TAU * delta.x / viewport_height);
                self.rotate_up(TAU * delta.y / viewport_height);
            }
            OrbitAction::Dolly => {
                if delta.y > 0.0 {
                    self.dolly_out(self.zoom_scale());
                } else if delta.y < 0.0 {
                    self.dolly_in(self.zoom_scale());
                }
            }
            OrbitAction::Pan => self.pan(delta * self.pan_speed, camera, viewport_height),
        }
    }

    pub fn end(&mut self) {
        self.active = None;
    }

    /// Wheel input: negative deltas move closer, positive ones further away.
    pub fn wheel(&mut self, delta_y: f32) {
        if !self.enabled {
            return;
        }
        if delta_y < 0.0 {
            self.dolly_in(self.zoom_scale());
        } else if delta_y > 0.0 {
            self.dolly_out(self.zoom_scale());
        }
    }

    /// Applies pending motion to the camera and aims it at the target.
    ///
    /// Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let before = (camera.position, camera.rotation);

        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_offset(offset);

        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        spherical.theta += self.spherical_delta.theta * step;
        spherical.phi += self.spherical_delta.phi * step;

        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(defaults::POLAR_EPSILON, PI - defaults::POLAR_EPSILON);

        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pan_offset * step;

        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= decay;
            self.spherical_delta.phi *= decay;
            self.pan_offset *= decay;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        camera.position.distance_squared(before.0) > 1e-10
            || 8.0 * (1.0 - camera.rotation.dot(before.1).abs()) > 1e-5
    }

    fn zoom_scale(&self) -> f32 {
        defaults::ZOOM_STEP.powf(self.zoom_speed)
    }

    fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    fn dolly_in(&mut self, dolly_scale: f32) {
        self.scale *= dolly_scale;
    }

    fn dolly_out(&mut self, dolly_scale: f32) {
        self.scale /= dolly_scale;
    }

    /// Screen-space pan scaled so the point under the cursor at target depth follows it.
    fn pan(&mut self, delta: Vec2, camera: &PerspectiveCamera, viewport_height: f32) {
        let distance = (camera.position - self.target).length() * (camera.fov_degrees.to_radians() / 2.0).tan();
        let left = -2.0 * delta.x * distance / viewport_height;
        let up = 2.0 * delta.y * distance / viewport_height;
        self.pan_offset += camera.right() * left + camera.up() * up;
    }
}
