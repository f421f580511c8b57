use super::helpers::VERTEX_STRIDE;
use edu3d_core::{Geometry, Topology};
use wgpu::util::DeviceExt;

/// Vertex and index buffers uploaded once per scene mesh.
pub(crate) struct GpuMesh {
    pub(crate) vertices: wgpu::Buffer,
    pub(crate) indices: wgpu::Buffer,
    pub(crate) index_count: u32,
    pub(crate) topology: Topology,
}

impl GpuMesh {
    pub(crate) fn upload(device: &wgpu::Device, geometry: &Geometry) -> Self {
        let data = geometry.tessellate();
        let mut interleaved: Vec<f32> = Vec::with_capacity(data.vertex_count() * 6);
        for (p, n) in data.positions.iter().zip(&data.normals) {
            interleaved.extend_from_slice(p);
            interleaved.extend_from_slice(n);
        }
        debug_assert_eq!(
            (interleaved.len() * 4) as u64,
            data.vertex_count() as u64 * VERTEX_STRIDE
        );
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertices"),
            contents: bytemuck::cast_slice(&interleaved),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_indices"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertices,
            indices,
            index_count: data.indices.len() as u32,
            topology: geometry.topology(),
        }
    }
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        self.vertices.destroy();
        self.indices.destroy();
    }
}
