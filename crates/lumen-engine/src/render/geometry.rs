use wgpu::util::DeviceExt;

use super::error::RenderError;
use super::mesh::Mesh;

/// Immutable GPU copy of one mesh.
pub struct GeometryBuffer {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
}

impl GeometryBuffer {
    pub const INDEX_FORMAT: wgpu::IndexFormat = wgpu::IndexFormat::Uint16;

    /// Uploads `mesh` into vertex and index buffers. Nothing writes to them afterwards.
    pub fn load(device: &wgpu::Device, mesh: &Mesh, label: &str) -> Result<Self, RenderError> {
        if mesh.vertices().is_empty() || mesh.triangles().is_empty() {
            return Err(RenderError::invalid(format!("mesh `{label}` is empty")));
        }

        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vertices")),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let indices: Vec<u16> = mesh.triangles().iter().flatten().copied().collect();
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} indices")),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!(
            "loaded geometry `{label}`: {} vertices, {} triangles",
            mesh.vertices().len(),
            mesh.triangles().len()
        );

        Ok(Self {
            vertex,
            index,
            index_count: mesh.index_count(),
        })
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex
    }

    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Binds both buffers and issues one indexed draw.
    pub fn draw<'p>(&self, pass: &mut wgpu::RenderPass<'p>) {
        pass.set_vertex_buffer(0, self.vertex_buffer().slice(..));
        pass.set_index_buffer(self.index_buffer().slice(..), Self::INDEX_FORMAT);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
