//! GPU copies of pooled meshes.

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::resources::{MeshData, MeshHandle, Topology};
use crate::scene::SceneGraph;

/// Vertex (and index) buffers of one mesh.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: Option<wgpu::Buffer>,
    /// Indices to draw, or vertices when not indexed
    pub element_count: u32,
    pub topology: Topology,
}

impl GpuMesh {
    /// Uploads `mesh`. Returns `None` if it has nothing to draw.
    pub fn upload(device: &wgpu::Device, label: &str, mesh: &MeshData) -> Option<Self> {
        let element_count = element_count(mesh);
        if element_count == 0 {
            return None;
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = mesh.indices.as_ref().map(|indices| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        Some(Self {
            vertex_buffer,
            index_buffer,
            element_count,
            topology: mesh.topology,
        })
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        match &self.index_buffer {
            Some(indices) => {
                pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..self.element_count, 0, 0..1);
            }
            None => pass.draw(0..self.element_count, 0..1),
        }
    }
}

/// Number of elements a draw of `mesh` consumes; partial primitives are dropped.
pub fn element_count(mesh: &MeshData) -> u32 {
    let len = match &mesh.indices {
        Some(indices) => indices.len(),
        None => mesh.vertices.len(),
    };
    let per_primitive = match mesh.topology {
        Topology::TriangleList => 3,
        Topology::LineList => 2,
    };
    (len - len % per_primitive) as u32
}

/// Uploaded meshes keyed by pool handle.
///
/// Pool handles are never reused within a scene, so an entry stays valid
/// until the scene releases the mesh.
#[derive(Default)]
pub struct MeshCache {
    meshes: HashMap<MeshHandle, GpuMesh>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads every mesh in `handles` that is not cached yet.
    pub fn prepare(&mut self, device: &wgpu::Device, scene: &SceneGraph, handles: impl IntoIterator<Item = MeshHandle>) {
        for handle in handles {
            if self.meshes.contains_key(&handle) {
                continue;
            }
            let Some(mesh) = scene.mesh(handle) else {
                continue;
            };
            if let Some(gpu) = GpuMesh::upload(device, "Scene Mesh", mesh) {
                self.meshes.insert(handle, gpu);
            }
        }
    }

    /// Drops buffers of meshes the scene no longer holds.
    pub fn prune(&mut self, scene: &SceneGraph) -> usize {
        let before = self.meshes.len();
        self.meshes.retain(|handle, _| scene.mesh(*handle).is_some());
        before - self.meshes.len()
    }

    pub fn get(&self, handle: MeshHandle) -> Option<&GpuMesh> {
        self.meshes.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn clear(&mut self) {
        for (_, mesh) in self.meshes.drain() {
            mesh.vertex_buffer.destroy();
            if let Some(indices) = mesh.index_buffer {
                indices.destroy();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry;
    use crate::resources::MeshVertex;
    use glam::Vec3;

    #[test]
    fn test_element_count_of_indexed_triangles() {
        let mesh = geometry::cuboid(1.0, 1.0, 1.0);
        let expected = mesh.indices.as_ref().map_or(mesh.vertices.len(), Vec::len);
        assert_eq!(element_count(&mesh) as usize, expected);
        assert_eq!(element_count(&mesh) % 3, 0);
    }

    #[test]
    fn test_element_count_drops_partial_lines() {
        let v = MeshVertex::new(Vec3::ZERO, Vec3::Y);
        assert_eq!(element_count(&MeshData::lines(vec![v; 5])), 4);
        assert_eq!(element_count(&MeshData::lines(Vec::new())), 0);
    }
}
