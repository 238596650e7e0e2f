//! Mesh resources.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::pool::{PoolHandle, ResourcePool};
use crate::scene::BoundingBox;

/// Handle to a mesh stored in the [`MeshManager`].
///
/// Handles are lightweight and can be copied freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MeshHandle(u64);

impl PoolHandle for MeshHandle {
    fn from_raw(value: u64) -> Self {
        Self(value)
    }

    fn raw(&self) -> u64 {
        self.0
    }
}

/// Vertex layout handed to GPU backends.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }
}

/// How indices (or consecutive vertices) form primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Topology {
    #[default]
    TriangleList,
    LineList,
}

/// CPU mesh data.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Vertex data.
    pub vertices: Vec<MeshVertex>,
    /// Index data (optional).
    pub indices: Option<Vec<u32>>,
    /// Primitive topology.
    pub topology: Topology,
    /// Local bounding box.
    pub bounds: BoundingBox,
}

impl MeshData {
    /// Creates non-indexed triangle mesh data.
    pub fn new(vertices: Vec<MeshVertex>) -> Self {
        let bounds = Self::compute_bounds(&vertices);
        Self {
            vertices,
            indices: None,
            topology: Topology::TriangleList,
            bounds,
        }
    }

    /// Creates indexed triangle mesh data.
    pub fn indexed(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        let bounds = Self::compute_bounds(&vertices);
        Self {
            vertices,
            indices: Some(indices),
            topology: Topology::TriangleList,
            bounds,
        }
    }

    /// Creates line-list mesh data (pairs of vertices).
    pub fn lines(vertices: Vec<MeshVertex>) -> Self {
        let bounds = Self::compute_bounds(&vertices);
        Self {
            vertices,
            indices: None,
            topology: Topology::LineList,
            bounds,
        }
    }

    /// Iterates triangles as vertex positions. Line meshes yield nothing.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        let count = match (self.topology, &self.indices) {
            (Topology::LineList, _) => 0,
            (Topology::TriangleList, Some(indices)) => indices.len() / 3,
            (Topology::TriangleList, None) => self.vertices.len() / 3,
        };

        (0..count).filter_map(move |tri| {
            let corner = |i: usize| -> Option<Vec3> {
                let index = match &self.indices {
                    Some(indices) => *indices.get(tri * 3 + i)? as usize,
                    None => tri * 3 + i,
                };
                self.vertices.get(index).map(|v| Vec3::from(v.position))
            };
            Some([corner(0)?, corner(1)?, corner(2)?])
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles().count()
    }

    fn compute_bounds(vertices: &[MeshVertex]) -> BoundingBox {
        vertices.iter().fold(BoundingBox::empty(), |bounds, v| {
            bounds.expand(Vec3::from(v.position))
        })
    }
}

/// Manager for mesh resources.
pub type MeshManager = ResourcePool<MeshHandle, MeshData>;

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32, z: f32) -> MeshVertex {
        MeshVertex::new(Vec3::new(x, y, z), Vec3::Y)
    }

    #[test]
    fn test_bounds_from_vertices() {
        let mesh = MeshData::new(vec![v(-1.0, 0.0, 2.0), v(3.0, -2.0, 0.0), v(0.0, 1.0, 0.0)]);
        assert_eq!(mesh.bounds.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(mesh.bounds.max, Vec3::new(3.0, 1.0, 2.0));
    }

    #[test]
    fn test_indexed_triangles() {
        let mesh = MeshData::indexed(
            vec![v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0), v(1.0, 1.0, 0.0)],
            vec![0, 1, 2, 2, 1, 3],
        );
        let tris: Vec<_> = mesh.triangles().collect();
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[1][2], Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_lines_have_no_triangles() {
        let mesh = MeshData::lines(vec![v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0)]);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_out_of_range_indices_are_skipped() {
        let mesh = MeshData::indexed(vec![v(0.0, 0.0, 0.0)], vec![0, 5, 9]);
        assert_eq!(mesh.triangle_count(), 0);
    }
}
