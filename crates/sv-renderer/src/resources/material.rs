//! Material resources.

use super::pool::{PoolHandle, ResourcePool};

/// Handle to a material stored in the [`MaterialManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaterialHandle(u64);

impl PoolHandle for MaterialHandle {
    fn from_raw(value: u64) -> Self {
        Self(value)
    }

    fn raw(&self) -> u64 {
        self.0
    }
}

/// Surface description of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Base color (RGBA, linear 0-1). Alpha is the opacity.
    pub color: [f32; 4],
    pub metalness: f32,
    pub roughness: f32,
    /// Ignore lighting.
    pub unlit: bool,
    /// Alpha blended.
    pub transparent: bool,
    /// Render back faces too.
    pub double_sided: bool,
    pub depth_write: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            metalness: 0.0,
            roughness: 1.0,
            unlit: false,
            transparent: false,
            double_sided: false,
            depth_write: true,
        }
    }
}

impl Material {
    /// Lit physically based material.
    pub fn standard(hex: u32, metalness: f32, roughness: f32) -> Self {
        Self {
            color: hex_color(hex, 1.0),
            metalness,
            roughness,
            ..Default::default()
        }
    }

    /// Unlit material.
    pub fn basic(hex: u32) -> Self {
        Self {
            color: hex_color(hex, 1.0),
            unlit: true,
            ..Default::default()
        }
    }

    /// Makes the material alpha blended with the given opacity.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.color[3] = opacity;
        self.transparent = true;
        self
    }

    pub fn with_double_sided(mut self, double_sided: bool) -> Self {
        self.double_sided = double_sided;
        self
    }

    pub fn with_depth_write(mut self, depth_write: bool) -> Self {
        self.depth_write = depth_write;
        self
    }

    pub fn opacity(&self) -> f32 {
        self.color[3]
    }
}

/// Convert a 0xRRGGBB color to RGBA floats.
pub fn hex_color(hex: u32, alpha: f32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        alpha,
    ]
}

/// Manager for material resources.
pub type MaterialManager = ResourcePool<MaterialHandle, Material>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color(0xff0000, 1.0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(hex_color(0x0000ff, 0.5), [0.0, 0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_transparent_builder() {
        let m = Material::basic(0xf59e0b)
            .with_opacity(0.18)
            .with_double_sided(true)
            .with_depth_write(false);
        assert!(m.unlit && m.transparent && m.double_sided);
        assert!(!m.depth_write);
        assert_eq!(m.opacity(), 0.18);
    }
}
