//! Scene lights

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::resources::hex_color;

fn hex_rgb(hex: u32) -> Vec3 {
    let [r, g, b, _] = hex_color(hex, 1.0);
    Vec3::new(r, g, b)
}

/// Sky/ground gradient light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereLight {
    pub sky_color: Vec3,
    pub ground_color: Vec3,
    pub intensity: f32,
}

impl HemisphereLight {
    pub fn new(sky: u32, ground: u32, intensity: f32) -> Self {
        Self {
            sky_color: hex_rgb(sky),
            ground_color: hex_rgb(ground),
            intensity,
        }
    }
}

/// Parallel light shining from `position` toward `target`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl DirectionalLight {
    /// Light aimed at the origin
    pub fn new(color: u32, intensity: f32, position: Vec3) -> Self {
        Self {
            color: hex_rgb(color),
            intensity,
            position,
            target: Vec3::ZERO,
        }
    }

    /// Normalized direction the light travels in
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

/// Any light a scene can hold
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Hemisphere(HemisphereLight),
    Directional(DirectionalLight),
}

impl From<HemisphereLight> for Light {
    fn from(light: HemisphereLight) -> Self {
        Light::Hemisphere(light)
    }
}

impl From<DirectionalLight> for Light {
    fn from(light: DirectionalLight) -> Self {
        Light::Directional(light)
    }
}

/// Light uniform buffer data for GPU backends (64 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    /// Sky color (RGB) and intensity (A)
    pub sky: [f32; 4],
    /// Ground color (RGB), A unused
    pub ground: [f32; 4],
    /// Direction toward the light (normalized, world space), w = unused
    pub direction: [f32; 4],
    /// Directional light color (RGB) and intensity (A)
    pub color_intensity: [f32; 4],
}

impl LightUniform {
    /// Packs the first light of each kind. Missing lights contribute nothing.
    pub fn from_lights(lights: &[Light]) -> Self {
        let mut uniform = Self::zeroed();
        let hemisphere = lights.iter().find_map(|l| match l {
            Light::Hemisphere(h) => Some(h),
            _ => None,
        });
        let directional = lights.iter().find_map(|l| match l {
            Light::Directional(d) => Some(d),
            _ => None,
        });

        if let Some(h) = hemisphere {
            uniform.sky = h.sky_color.extend(h.intensity).to_array();
            uniform.ground = h.ground_color.extend(0.0).to_array();
        }
        if let Some(d) = directional {
            uniform.direction = (-d.direction()).extend(0.0).to_array();
            uniform.color_intensity = d.color.extend(d.intensity).to_array();
        }
        uniform
    }
}
