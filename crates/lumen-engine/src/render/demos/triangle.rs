use crate::core::Renderer;
use crate::render::error::require;
use crate::render::{RenderCtx, RenderError, RenderTarget};
use crate::time::FrameTime;

/// One hard-coded triangle, no buffers.
#[derive(Default)]
pub struct TriangleDemo {
    pipeline: Option<wgpu::RenderPipeline>,
}

impl TriangleDemo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for TriangleDemo {
    fn name(&self) -> &'static str {
        "triangle"
    }

    fn init_pipeline(&mut self, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen triangle shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/triangle.wgsl").into()),
        });

        let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lumen triangle pipeline layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lumen triangle pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(ctx.surface_format.into())],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline = Some(pipeline);
        log::debug!("triangle pipeline created for {:?}", ctx.surface_format);
        Ok(())
    }

    fn render(
        &mut self,
        _ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        _time: &FrameTime,
    ) -> Result<(), RenderError> {
        let pipeline = require(&self.pipeline, "triangle pipeline")?;

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lumen triangle pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_pipeline(pipeline);
        rpass.draw(0..3, 0..1);
        Ok(())
    }

    fn teardown(&mut self) {
        self.pipeline = None;
    }
}
