//! A no-op wgpu device for exercising renderers without a GPU.
//!
//! Commands are validated but never executed. Validation errors reach wgpu's
//! default uncaptured-error handler, which panics and fails the test.

use super::ctx::{RenderCtx, RenderTarget};

pub(crate) const SURFACE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;

pub(crate) struct TestGpu {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl TestGpu {
    pub fn new() -> Self {
        let (device, queue) = wgpu::Device::noop(&wgpu::DeviceDescriptor::default());
        Self { device, queue }
    }

    pub fn ctx(&self, size: (u32, u32)) -> RenderCtx<'_> {
        RenderCtx::new(&self.device, &self.queue, SURFACE_FORMAT, size)
    }

    /// Records one frame into a fresh surface-sized texture and submits it.
    pub fn frame<R>(
        &self,
        size: (u32, u32),
        draw: impl FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>) -> R,
    ) -> R {
        let surface = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("test surface"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SURFACE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = surface.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("test frame") });

        let ctx = self.ctx(size);
        let out = {
            let mut target = RenderTarget::new(&mut encoder, &view);
            draw(&ctx, &mut target)
        };

        self.queue.submit(std::iter::once(encoder.finish()));
        out
    }
}
