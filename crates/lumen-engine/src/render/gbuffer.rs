use glam::Mat4;
use wgpu::util::DeviceExt;

use super::geometry::GeometryBuffer;
use super::mesh::Vertex;
use super::uniforms::{uniform_entry, CameraUniform, ModelUniform};

/// Texture extent for a surface of `size` physical pixels. Zero axes become 1.
pub fn target_extent(size: (u32, u32)) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.0.max(1),
        height: size.1.max(1),
        depth_or_array_layers: 1,
    }
}

/// Creates a `Depth24Plus` attachment matching `size`.
pub(crate) fn create_depth_texture(
    device: &wgpu::Device,
    size: (u32, u32),
    usage: wgpu::TextureUsages,
    label: &str,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: target_extent(size),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: GBufferTargets::DEPTH_FORMAT,
        usage: usage | wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    })
}

/// The three geometry-pass targets. Always sized to the surface; recreated as a set.
pub struct GBufferTargets {
    normal: wgpu::TextureView,
    albedo: wgpu::TextureView,
    depth: wgpu::TextureView,
    size: (u32, u32),
}

impl GBufferTargets {
    pub const NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
    pub const ALBEDO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8Unorm;
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    pub fn new(device: &wgpu::Device, size: (u32, u32)) -> Self {
        let usage = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
        let color = |format, label| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: target_extent(size),
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage,
                view_formats: &[],
            })
        };

        let normal = color(Self::NORMAL_FORMAT, "lumen gbuffer normal");
        let albedo = color(Self::ALBEDO_FORMAT, "lumen gbuffer albedo");
        let depth = create_depth_texture(
            device,
            size,
            wgpu::TextureUsages::TEXTURE_BINDING,
            "lumen gbuffer depth",
        );

        log::debug!("gbuffer targets created at {}x{}", size.0, size.1);

        Self {
            normal: normal.create_view(&wgpu::TextureViewDescriptor::default()),
            albedo: albedo.create_view(&wgpu::TextureViewDescriptor::default()),
            depth: depth.create_view(&wgpu::TextureViewDescriptor::default()),
            size,
        }
    }

    /// Size in physical pixels the targets were created for.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn normal_view(&self) -> &wgpu::TextureView {
        &self.normal
    }

    pub fn albedo_view(&self) -> &wgpu::TextureView {
        &self.albedo
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth
    }
}

/// Rasterizes scene geometry into [`GBufferTargets`].
pub struct GBufferPass {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
}

impl GBufferPass {
    /// Far sentinel left in pixels no geometry covers.
    pub const NORMAL_CLEAR: wgpu::Color = wgpu::Color {
        r: 0.0,
        g: 0.0,
        b: 1.0,
        a: 1.0,
    };
    pub const ALBEDO_CLEAR: wgpu::Color = wgpu::Color::BLACK;
    pub const DEPTH_CLEAR: f32 = 1.0;

    pub fn new(device: &wgpu::Device, camera_buffer: &wgpu::Buffer, model: Mat4) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen gbuffer shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/gbuffer.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lumen gbuffer scene bgl"),
            entries: &[
                uniform_entry::<ModelUniform>(0, wgpu::ShaderStages::VERTEX),
                uniform_entry::<CameraUniform>(1, wgpu::ShaderStages::VERTEX),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lumen gbuffer pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lumen gbuffer pipeline"),
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
                targets: &[
                    Some(GBufferTargets::NORMAL_FORMAT.into()),
                    Some(GBufferTargets::ALBEDO_FORMAT.into()),
                ],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: GBufferTargets::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let model_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lumen model uniform"),
            contents: bytemuck::bytes_of(&ModelUniform::new(model)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen gbuffer scene bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: model_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: camera_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            pipeline,
            bind_group,
        }
    }

    /// Clears all three targets and draws `geometry` once.
    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        targets: &GBufferTargets,
        geometry: &GeometryBuffer,
    ) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lumen gbuffer pass"),
            color_attachments: &[
                cleared(targets.normal_view(), Self::NORMAL_CLEAR),
                cleared(targets.albedo_view(), Self::ALBEDO_CLEAR),
            ],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: targets.depth_view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(Self::DEPTH_CLEAR),
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
        geometry.draw(&mut rpass);
    }
}

fn cleared(view: &wgpu::TextureView, clear: wgpu::Color) -> Option<wgpu::RenderPassColorAttachment<'_>> {
    Some(wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        ops: wgpu::Operations {
            load: wgpu::LoadOp::Clear(clear),
            store: wgpu::StoreOp::Store,
        },
        depth_slice: None,
    })
}
