//! GPU-resident tile mesh: holds wgpu buffer handles for vertex/index data.

use wgpu::util::DeviceExt;

use crate::TileMesh;

/// A tile mesh that has been uploaded to the GPU.
///
/// Holds wgpu buffer handles and the metadata needed to issue indexed draw
/// calls. Buffers are explicitly destroyed exactly once, when the owning
/// tile is disposed.
pub struct GpuTileMesh {
    /// Vertex buffer on the GPU.
    pub vertex_buffer: wgpu::Buffer,
    /// Index buffer on the GPU.
    pub index_buffer: wgpu::Buffer,
    /// Number of indices (used in `draw_indexed`).
    pub index_count: u32,
    /// Number of vertices.
    pub vertex_count: u32,
    /// Size of the vertex buffer in bytes (for memory tracking).
    vertex_buffer_size: u64,
    /// Size of the index buffer in bytes (for memory tracking).
    index_buffer_size: u64,
}

impl GpuTileMesh {
    /// Upload a [`TileMesh`] to the GPU, creating new buffers.
    #[must_use]
    pub fn upload(device: &wgpu::Device, mesh: &TileMesh) -> Self {
        let vertex_bytes = mesh.vertex_bytes();
        let index_bytes = mesh.index_bytes();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tile_vertex_buffer"),
            contents: vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tile_index_buffer"),
            contents: index_bytes,
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            vertex_count: mesh.vertices.len() as u32,
            vertex_buffer_size: vertex_bytes.len() as u64,
            index_buffer_size: index_bytes.len() as u64,
        }
    }

    /// Release the underlying GPU buffers.
    ///
    /// Idempotence is the caller's concern: the owning tile guarantees this
    /// runs exactly once.
    pub fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }

    /// Total GPU memory consumed by this mesh's buffers in bytes.
    #[must_use]
    pub fn total_gpu_bytes(&self) -> u64 {
        self.vertex_buffer_size + self.index_buffer_size
    }

    /// Bind this mesh's buffers to a render pass.
    pub fn bind<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    /// Issue an indexed draw call for this mesh.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass) {
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
