use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::core::Renderer;
use crate::input::InputState;
use crate::render::camera::{CameraInputMapper, FlyCamera, FOV_Y};
use crate::render::error::require;
use crate::render::gbuffer::create_depth_texture;
use crate::render::geometry::GeometryBuffer;
use crate::render::mesh::{Mesh, Vertex};
use crate::render::uniforms::uniform_entry;
use crate::render::{RenderCtx, RenderError, RenderTarget};
use crate::time::FrameTime;

const NEAR: f32 = 1.0;
const FAR: f32 = 100.0;

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.5,
    g: 0.5,
    b: 0.5,
    a: 1.0,
};

fn projection(aspect: f32) -> Mat4 {
    Mat4::perspective_rh(FOV_Y, aspect.max(0.01), NEAR, FAR)
}

/// Model-view-projection for the rotating cube at `t` seconds.
///
/// The cube sits 4 units in front of the eye and turns by one radian about
/// `(sin t, cos t, 0)`.
pub fn rotating_cube_mvp(t: f32, aspect: f32) -> Mat4 {
    let axis = Vec3::new(t.sin(), t.cos(), 0.0);
    let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -4.0)) * Mat4::from_axis_angle(axis, 1.0);
    projection(aspect) * view
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct TransformUniform {
    mvp: [[f32; 4]; 4],
}

/// Pipeline, cube geometry, transform uniform and depth target shared by both cube renderers.
struct CubeResources {
    pipeline: wgpu::RenderPipeline,
    geometry: GeometryBuffer,
    transform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    depth: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl CubeResources {
    fn new(ctx: &RenderCtx<'_>, label: &str) -> Result<Self, RenderError> {
        let device = ctx.device;
        let geometry = GeometryBuffer::load(device, &Mesh::cube(), label)?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen cube shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/cube.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lumen cube bgl"),
            entries: &[uniform_entry::<TransformUniform>(0, wgpu::ShaderStages::VERTEX)],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lumen cube pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lumen cube pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(ctx.surface_format.into())],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth24Plus,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let transform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen cube transform"),
            size: std::mem::size_of::<TransformUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen cube bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform.as_entire_binding(),
            }],
        });

        let depth = create_depth_texture(
            device,
            ctx.surface_size,
            wgpu::TextureUsages::empty(),
            "lumen cube depth",
        )
        .create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            pipeline,
            geometry,
            transform,
            bind_group,
            depth,
            depth_size: ctx.surface_size,
        })
    }

    fn resize(&mut self, ctx: &RenderCtx<'_>) {
        if self.depth_size == ctx.surface_size {
            return;
        }
        self.depth = create_depth_texture(
            ctx.device,
            ctx.surface_size,
            wgpu::TextureUsages::empty(),
            "lumen cube depth",
        )
        .create_view(&wgpu::TextureViewDescriptor::default());
        self.depth_size = ctx.surface_size;
    }

    fn record(&self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, mvp: Mat4) {
        let uniform = TransformUniform {
            mvp: mvp.to_cols_array_2d(),
        };
        ctx.queue.write_buffer(&self.transform, 0, bytemuck::bytes_of(&uniform));

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lumen cube pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        self.geometry.draw(&mut rpass);
    }
}

/// Position-colored cube spinning in front of a fixed camera.
#[derive(Default)]
pub struct RotatingCube {
    resources: Option<CubeResources>,
}

impl RotatingCube {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for RotatingCube {
    fn name(&self) -> &'static str {
        "rotating-cube"
    }

    fn init_pipeline(&mut self, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        self.resources = Some(CubeResources::new(ctx, "lumen rotating cube")?);
        Ok(())
    }

    fn resize(&mut self, ctx: &RenderCtx<'_>) {
        if let Some(resources) = &mut self.resources {
            resources.resize(ctx);
        }
    }

    fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        time: &FrameTime,
    ) -> Result<(), RenderError> {
        let resources = require(&self.resources, "cube resources")?;
        resources.record(ctx, target, rotating_cube_mvp(time.elapsed, ctx.aspect()));
        Ok(())
    }

    fn teardown(&mut self) {
        self.resources = None;
    }
}

/// The same cube, viewed through a WASD/QE + mouse-drag fly camera.
pub struct CameraControlledCube {
    resources: Option<CubeResources>,
    camera: FlyCamera,
    mapper: CameraInputMapper,
    view: Mat4,
}

impl CameraControlledCube {
    pub fn new() -> Self {
        let camera = FlyCamera::looking_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO);
        let view = camera.view();
        Self {
            resources: None,
            camera,
            mapper: CameraInputMapper::new(),
            view,
        }
    }

    pub fn camera(&self) -> &FlyCamera {
        &self.camera
    }
}

impl Default for CameraControlledCube {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for CameraControlledCube {
    fn name(&self) -> &'static str {
        "camera-cube"
    }

    fn init_pipeline(&mut self, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        self.resources = Some(CubeResources::new(ctx, "lumen camera cube")?);
        Ok(())
    }

    fn resize(&mut self, ctx: &RenderCtx<'_>) {
        if let Some(resources) = &mut self.resources {
            resources.resize(ctx);
        }
    }

    fn update(&mut self, time: &FrameTime, input: &InputState) {
        let intent = self.mapper.map(input);
        self.view = self.camera.update(time.dt, &intent);
    }

    fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        _time: &FrameTime,
    ) -> Result<(), RenderError> {
        let resources = require(&self.resources, "cube resources")?;
        resources.record(ctx, target, projection(ctx.aspect()) * self.view);
        Ok(())
    }

    fn teardown(&mut self) {
        self.resources = None;
    }
}
