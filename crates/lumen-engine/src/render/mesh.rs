use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use super::error::RenderError;

/// Interleaved vertex: position, normal, uv. Eight floats per vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    /// Number of `f32` components per vertex.
    pub const STRIDE_FLOATS: usize = 8;

    const ATTRS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Triangle-list mesh with 16-bit indices.
///
/// Construction validates the data once; after that the mesh is read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    triangles: Vec<[u16; 3]>,
}

impl Mesh {
    /// Builds a mesh from interleaved vertices and triangles.
    pub fn new(vertices: Vec<Vertex>, triangles: Vec<[u16; 3]>) -> Result<Self, RenderError> {
        if vertices.is_empty() || triangles.is_empty() {
            return Err(RenderError::invalid("mesh has no vertices or no triangles"));
        }
        if vertices.len() > u16::MAX as usize + 1 {
            return Err(RenderError::invalid(format!(
                "mesh has {} vertices; 16-bit indices address at most {}",
                vertices.len(),
                u16::MAX as usize + 1
            )));
        }
        let count = vertices.len();
        if let Some(bad) = triangles.iter().flatten().find(|&&i| i as usize >= count) {
            return Err(RenderError::invalid(format!(
                "triangle index {bad} out of range for {count} vertices"
            )));
        }
        Ok(Self { vertices, triangles })
    }

    /// Builds a mesh from separate attribute streams, as produced by mesh loaders.
    pub fn from_parts(
        positions: &[[f32; 3]],
        normals: &[[f32; 3]],
        uvs: &[[f32; 2]],
        triangles: Vec<[u16; 3]>,
    ) -> Result<Self, RenderError> {
        if positions.len() != normals.len() || positions.len() != uvs.len() {
            return Err(RenderError::invalid(format!(
                "attribute streams differ in length: {} positions, {} normals, {} uvs",
                positions.len(),
                normals.len(),
                uvs.len()
            )));
        }
        let vertices = positions
            .iter()
            .zip(normals)
            .zip(uvs)
            .map(|((&position, &normal), &uv)| Vertex {
                position,
                normal,
                uv,
            })
            .collect();
        Self::new(vertices, triangles)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[[u16; 3]] {
        &self.triangles
    }

    /// Number of indices drawn for this mesh (three per triangle).
    pub fn index_count(&self) -> u32 {
        (self.triangles.len() * 3) as u32
    }

    /// Unit cube centred at the origin, one quad per face.
    pub fn cube() -> Self {
        let mut builder = MeshBuilder::default();
        for (n, u, v) in CUBE_FACES {
            builder.push_quad(Vec3::from(n) * 0.5, Vec3::from(n), Vec3::from(u) * 0.5, Vec3::from(v) * 0.5);
        }
        builder.finish()
    }

    /// Demo scene for the deferred renderer: a ground plane with a grid of spheres.
    ///
    /// The ground sits at y = 0; place it inside the light extent with the model matrix.
    pub fn showcase() -> Self {
        let mut builder = MeshBuilder::default();
        builder.push_quad(
            Vec3::ZERO,
            Vec3::Y,
            Vec3::X * 75.0,
            Vec3::NEG_Z * 75.0,
        );

        const GRID: i32 = 4;
        const SPACING: f32 = 28.0;
        const RADIUS: f32 = 7.0;
        let offset = (GRID - 1) as f32 * SPACING * 0.5;
        for row in 0..GRID {
            for col in 0..GRID {
                let center = Vec3::new(
                    col as f32 * SPACING - offset,
                    RADIUS,
                    row as f32 * SPACING - offset,
                );
                builder.push_sphere(center, RADIUS, 16, 24);
            }
        }
        builder.finish()
    }
}

// (normal, u, v) with u × v = normal so each quad winds counter-clockwise.
const CUBE_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
];

#[derive(Default)]
struct MeshBuilder {
    vertices: Vec<Vertex>,
    triangles: Vec<[u16; 3]>,
}

impl MeshBuilder {
    fn base(&self) -> u16 {
        self.vertices.len() as u16
    }

    /// Quad spanning `center ± u ± v`; `u × v` must point along `normal`.
    fn push_quad(&mut self, center: Vec3, normal: Vec3, u: Vec3, v: Vec3) {
        let base = self.base();
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
        for (su, sv) in corners {
            let uv = Vec2::new((su + 1.0) * 0.5, (sv + 1.0) * 0.5);
            self.vertices
                .push(Vertex::new(center + u * su + v * sv, normal, uv));
        }
        self.triangles.push([base, base + 1, base + 2]);
        self.triangles.push([base, base + 2, base + 3]);
    }

    fn push_sphere(&mut self, center: Vec3, radius: f32, stacks: u16, slices: u16) {
        let base = self.base();
        for i in 0..=stacks {
            let phi = std::f32::consts::PI * i as f32 / stacks as f32;
            for j in 0..=slices {
                let theta = std::f32::consts::TAU * j as f32 / slices as f32;
                let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
                let uv = Vec2::new(j as f32 / slices as f32, i as f32 / stacks as f32);
                self.vertices
                    .push(Vertex::new(center + normal * radius, normal, uv));
            }
        }

        let row = slices + 1;
        for i in 0..stacks {
            for j in 0..slices {
                let a = base + i * row + j;
                let b = a + row;
                self.triangles.push([a, a + 1, b]);
                self.triangles.push([a + 1, b + 1, b]);
            }
        }
    }

    fn finish(self) -> Mesh {
        Mesh {
            vertices: self.vertices,
            triangles: self.triangles,
        }
    }
}
