//! Procedural mesh primitives.
//!
//! Conventions follow common engine primitives: cylinders and cones stand on
//! the Y axis centered at the origin, planes lie in XY facing +Z and grids
//! lie in XZ. Triangles wind counter-clockwise when seen from outside.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::resources::{MeshData, MeshVertex};

/// Cylinder (or truncated cone) along Y, centered at the origin.
///
/// `open_ended` skips the caps.
pub fn cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    segments: u32,
    open_ended: bool,
) -> MeshData {
    let segments = segments.max(3);
    let half = height * 0.5;
    let slope = if height.abs() > f32::EPSILON {
        (radius_bottom - radius_top) / height
    } else {
        0.0
    };

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // Side: one top and one bottom ring, seam vertex duplicated
    for i in 0..=segments {
        let theta = i as f32 / segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        let normal = Vec3::new(sin, slope, cos).normalize_or_zero();
        vertices.push(MeshVertex::new(Vec3::new(radius_top * sin, half, radius_top * cos), normal));
        vertices.push(MeshVertex::new(
            Vec3::new(radius_bottom * sin, -half, radius_bottom * cos),
            normal,
        ));
    }
    for i in 0..segments {
        let a = i * 2;
        let c = a + 1;
        let b = a + 2;
        let d = a + 3;
        indices.extend_from_slice(&[a, c, b, b, c, d]);
    }

    if !open_ended {
        if radius_top > 0.0 {
            cap(&mut vertices, &mut indices, radius_top, half, segments, true);
        }
        if radius_bottom > 0.0 {
            cap(&mut vertices, &mut indices, radius_bottom, -half, segments, false);
        }
    }

    MeshData::indexed(vertices, indices)
}

/// Cone along Y with its apex at `+height / 2`.
pub fn cone(radius: f32, height: f32, segments: u32, open_ended: bool) -> MeshData {
    cylinder(0.0, radius, height, segments, open_ended)
}

fn cap(vertices: &mut Vec<MeshVertex>, indices: &mut Vec<u32>, radius: f32, y: f32, segments: u32, top: bool) {
    let normal = if top { Vec3::Y } else { Vec3::NEG_Y };
    let center = vertices.len() as u32;
    vertices.push(MeshVertex::new(Vec3::new(0.0, y, 0.0), normal));

    for i in 0..=segments {
        let theta = i as f32 / segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        vertices.push(MeshVertex::new(Vec3::new(radius * sin, y, radius * cos), normal));
    }
    for i in 0..segments {
        let p = center + 1 + i;
        if top {
            indices.extend_from_slice(&[center, p, p + 1]);
        } else {
            indices.extend_from_slice(&[center, p + 1, p]);
        }
    }
}

/// Axis-aligned box centered at the origin.
pub fn cuboid(width: f32, height: f32, depth: f32) -> MeshData {
    let h = Vec3::new(width, height, depth) * 0.5;
    let (x, y, z) = (Vec3::X * h.x, Vec3::Y * h.y, Vec3::Z * h.z);

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (offset, u, v) in [
        (x, y, z),
        (-x, z, y),
        (y, z, x),
        (-y, x, z),
        (z, x, y),
        (-z, y, x),
    ] {
        quad(&mut vertices, &mut indices, offset, u, v);
    }

    MeshData::indexed(vertices, indices)
}

/// Rectangle in the XY plane facing +Z, centered at the origin.
pub fn plane(width: f32, height: f32) -> MeshData {
    let mut vertices = Vec::with_capacity(4);
    let mut indices = Vec::with_capacity(6);
    quad(
        &mut vertices,
        &mut indices,
        Vec3::ZERO,
        Vec3::X * width * 0.5,
        Vec3::Y * height * 0.5,
    );
    MeshData::indexed(vertices, indices)
}

/// Quad spanning `center ± u ± v`, facing `u × v`.
fn quad(vertices: &mut Vec<MeshVertex>, indices: &mut Vec<u32>, center: Vec3, u: Vec3, v: Vec3) {
    let normal = u.cross(v).normalize_or_zero();
    let base = vertices.len() as u32;
    for corner in [center - u - v, center + u - v, center + u + v, center - u + v] {
        vertices.push(MeshVertex::new(corner, normal));
    }
    indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

/// Line meshes of a square grid on the XZ plane.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLines {
    /// The two lines through the origin.
    pub center: MeshData,
    pub lines: MeshData,
}

/// Square grid of `size` with `divisions` cells per side.
pub fn grid(size: f32, divisions: u32) -> GridLines {
    let divisions = divisions.max(1);
    let half = size * 0.5;
    let step = size / divisions as f32;
    let center_index = divisions / 2;

    let mut center = Vec::new();
    let mut lines = Vec::new();
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let target = if i == center_index { &mut center } else { &mut lines };
        target.extend_from_slice(&[
            MeshVertex::new(Vec3::new(-half, 0.0, k), Vec3::Y),
            MeshVertex::new(Vec3::new(half, 0.0, k), Vec3::Y),
            MeshVertex::new(Vec3::new(k, 0.0, -half), Vec3::Y),
            MeshVertex::new(Vec3::new(k, 0.0, half), Vec3::Y),
        ]);
    }

    GridLines {
        center: MeshData::lines(center),
        lines: MeshData::lines(lines),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Every triangle's winding normal points away from the mesh center.
    fn assert_outward(mesh: &MeshData) {
        let center = mesh.bounds.center();
        for [a, b, c] in mesh.triangles() {
            let n = (b - a).cross(c - a);
            if n.length_squared() < 1e-12 {
                continue;
            }
            let centroid = (a + b + c) / 3.0;
            assert!(n.dot(centroid - center) > 0.0, "inward triangle at {centroid:?}");
        }
    }

    #[test]
    fn test_cuboid() {
        let mesh = cuboid(0.22, 0.1, 0.36);
        assert_eq!(mesh.triangle_count(), 12);
        assert_relative_eq!(mesh.bounds.max.z, 0.18);
        assert_relative_eq!(mesh.bounds.min.y, -0.05);
        assert_outward(&mesh);
    }

    #[test]
    fn test_closed_cylinder() {
        let mesh = cylinder(0.018, 0.018, 0.26, 12, false);
        assert_eq!(mesh.triangle_count(), 12 * 2 + 12 * 2);
        assert_relative_eq!(mesh.bounds.max.y, 0.13);
        assert_relative_eq!(mesh.bounds.max.z, 0.018, epsilon = 1e-6);
        assert_outward(&mesh);
    }

    #[test]
    fn test_open_cone_has_no_caps() {
        let mesh = cone(0.2, 0.7, 20, true);
        assert_eq!(mesh.triangle_count(), 20 * 2);
        assert_relative_eq!(mesh.bounds.max.y, 0.35);
        assert_relative_eq!(mesh.bounds.min.y, -0.35);
        assert_relative_eq!(mesh.bounds.max.x, 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_plane_faces_z() {
        let mesh = plane(200.0, 200.0);
        let [a, b, c] = mesh.triangles().next().unwrap();
        let n = (b - a).cross(c - a).normalize();
        assert_relative_eq!(n.z, 1.0);
        assert_eq!(mesh.bounds.max, Vec3::new(100.0, 100.0, 0.0));
    }

    #[test]
    fn test_grid_lines() {
        let grid = grid(30.0, 30);
        assert_eq!(grid.center.vertices.len(), 4);
        assert_eq!(grid.lines.vertices.len(), 30 * 4);
        assert_eq!(grid.lines.triangle_count(), 0);
        assert_relative_eq!(grid.lines.bounds.max.x, 15.0);
    }
}
