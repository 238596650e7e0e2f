//! Viewing camera and viewport mapping.

use glam::{Mat4, Quat, Vec2, Vec3, Vec4Swizzles};

use crate::constants::camera as defaults;
use crate::ray::Ray;

/// Right-handed perspective camera looking down its local -Z axis.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub rotation: Quat,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(
            defaults::DEFAULT_FOV_DEGREES,
            defaults::DEFAULT_ASPECT,
            defaults::DEFAULT_NEAR,
            defaults::DEFAULT_FAR,
        )
    }
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_degrees,
            aspect,
            near,
            far,
        }
    }

    /// Turn the camera toward `target`, keeping world +Y up.
    ///
    /// Does nothing when the target coincides with the camera position.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = target - self.position;
        if dir.length_squared() < f32::EPSILON * f32::EPSILON {
            return;
        }
        let up = if dir.normalize().cross(Vec3::Y).length_squared() < 1e-12 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(self.position, target, up);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        self.rotation = rotation.normalize();
    }

    /// Ignores non-positive or non-finite aspect ratios.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.world_matrix().inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Ray from the camera through a point in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let clip = inverse * ndc.extend(0.5).extend(1.0);
        let point = clip.xyz() / clip.w;
        Ray::new(self.position, point - self.position)
    }
}

/// On-screen rectangle of the drawing surface, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub device_pixel_ratio: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            device_pixel_ratio: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Width over height, or `None` for an empty viewport.
    pub fn aspect(&self) -> Option<f32> {
        (!self.is_empty()).then(|| self.width / self.height)
    }

    /// Map client coordinates to NDC (x right, y up, both in [-1, 1] inside the viewport).
    pub fn to_ndc(&self, client_x: f32, client_y: f32) -> Option<Vec2> {
        if self.is_empty() {
            return None;
        }
        Some(Vec2::new(
            (client_x - self.left) / self.width * 2.0 - 1.0,
            -((client_y - self.top) / self.height) * 2.0 + 1.0,
        ))
    }

    /// Device pixel ratio clamped to `max_ratio`.
    pub fn pixel_ratio(&self, max_ratio: f32) -> f32 {
        if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio.min(max_ratio)
        } else {
            1.0
        }
    }

    /// Size of the backing buffer in physical pixels.
    pub fn buffer_size(&self, max_ratio: f32) -> (u32, u32) {
        let ratio = self.pixel_ratio(max_ratio);
        (
            (self.width.max(0.0) * ratio).floor() as u32,
            (self.height.max(0.0) * ratio).floor() as u32,
        )
    }
}
