//! Uniform buffer layouts shared with `shaders/mesh.wgsl`.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::camera::PerspectiveCamera;
use crate::resources::Material;

/// Camera uniform buffer data (80 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Eye position (world space), w = 1
    pub eye: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &PerspectiveCamera) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            eye: camera.position.extend(1.0).to_array(),
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            eye: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Per-draw uniform data (160 bytes), bound with a dynamic offset
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of the model matrix
    pub normal: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// x = metalness, y = roughness, z = unlit flag, w unused
    pub params: [f32; 4],
}

impl DrawUniform {
    pub fn new(model: Mat4, material: &Material) -> Self {
        let inverse = model.inverse();
        let normal = if inverse.is_finite() {
            inverse.transpose()
        } else {
            // Degenerate scale: fall back to the model matrix itself
            model
        };
        Self {
            model: model.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
            color: material.color,
            params: [
                material.metalness,
                material.roughness,
                if material.unlit { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

/// Rounds `size` up to a multiple of `alignment`.
pub fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec3;

    #[test]
    fn test_uniform_sizes_match_shader() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
        assert_eq!(std::mem::size_of::<DrawUniform>(), 160);
    }

    #[test]
    fn test_aligned_stride() {
        assert_eq!(aligned_stride(160, 256), 256);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(300, 256), 512);
        assert_eq!(aligned_stride(160, 0), 160);
    }

    #[test]
    fn test_draw_uniform_normal_matrix_undoes_scale() {
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let uniform = DrawUniform::new(model, &Material::basic(0xff0000));

        let normal = Mat4::from_cols_array_2d(&uniform.normal);
        assert_relative_eq!(normal.x_axis.x, 0.5);
        assert_eq!(uniform.params[2], 1.0);
        assert_eq!(uniform.color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_draw_uniform_survives_zero_scale() {
        let model = Mat4::from_scale(Vec3::ZERO);
        let uniform = DrawUniform::new(model, &Material::default());
        assert!(uniform.normal.iter().flatten().all(|v| v.is_finite()));
    }
}
