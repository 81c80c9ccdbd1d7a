use glam::{Mat4, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;
use wgpu::util::DeviceExt;

use crate::core::Renderer;
use crate::time::FrameTime;

use super::camera::OrbitCamera;
use super::composition::CompositionPass;
use super::ctx::{RenderCtx, RenderTarget};
use super::error::{require, RenderError};
use super::gbuffer::{GBufferPass, GBufferTargets};
use super::geometry::GeometryBuffer;
use super::light_update::LightUpdatePass;
use super::lights::{LightExtent, LightStore};
use super::mesh::Mesh;
use super::settings::RenderSettings;
use super::uniforms::CameraUniform;

/// One step of a deferred frame, in recording order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStep {
    /// Write view-projection and its inverse for this frame's camera.
    UpdateCamera,
    /// Rasterize geometry into the G-buffer.
    GBuffer,
    /// Advance light positions on the GPU.
    LightUpdate,
    /// Shade (or visualize) the G-buffer into the surface.
    Composition,
}

/// Fixed order of steps recorded into a single encoder.
#[derive(Debug, Copy, Clone)]
pub struct FramePlan {
    steps: &'static [FrameStep],
}

impl FramePlan {
    pub const DEFERRED: FramePlan = FramePlan {
        steps: &[
            FrameStep::UpdateCamera,
            FrameStep::GBuffer,
            FrameStep::LightUpdate,
            FrameStep::Composition,
        ],
    };

    pub fn steps(&self) -> &'static [FrameStep] {
        self.steps
    }

    /// Position of `step` in the plan, if present.
    pub fn position(&self, step: FrameStep) -> Option<usize> {
        self.steps.iter().position(|s| *s == step)
    }
}

/// Scene and light configuration for [`DeferredRenderer`].
#[derive(Debug, Clone)]
pub struct DeferredConfig {
    pub mesh: Mesh,
    pub model: Mat4,
    pub camera: OrbitCamera,
    pub extent: LightExtent,
    /// Seed for light placement; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for DeferredConfig {
    fn default() -> Self {
        Self {
            mesh: Mesh::showcase(),
            model: Mat4::from_translation(Vec3::new(0.0, -25.0, 0.0)),
            camera: OrbitCamera::default(),
            extent: LightExtent::default(),
            seed: None,
        }
    }
}

/// G-buffer + compute-animated point lights + full-screen composition.
pub struct DeferredRenderer {
    config: DeferredConfig,
    settings: RenderSettings,

    camera_buffer: Option<wgpu::Buffer>,
    geometry: Option<GeometryBuffer>,
    lights: Option<LightStore>,
    targets: Option<GBufferTargets>,
    gbuffer_pass: Option<GBufferPass>,
    light_pass: Option<LightUpdatePass>,
    composition: Option<CompositionPass>,
}

impl DeferredRenderer {
    pub fn new(config: DeferredConfig, settings: RenderSettings) -> Self {
        Self {
            config,
            settings,
            camera_buffer: None,
            geometry: None,
            lights: None,
            targets: None,
            gbuffer_pass: None,
            light_pass: None,
            composition: None,
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Size of the current G-buffer, if initialized.
    pub fn target_size(&self) -> Option<(u32, u32)> {
        self.targets.as_ref().map(GBufferTargets::size)
    }
}

impl Default for DeferredRenderer {
    fn default() -> Self {
        Self::new(DeferredConfig::default(), RenderSettings::default())
    }
}

impl Renderer for DeferredRenderer {
    fn name(&self) -> &'static str {
        "deferred"
    }

    fn init_pipeline(&mut self, ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
        let device = ctx.device;

        let geometry = GeometryBuffer::load(device, &self.config.mesh, "lumen scene")?;

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let lights = LightStore::new(device, self.config.extent, self.settings.num_lights, &mut rng)?;

        let camera = CameraUniform::new(self.config.camera.view_proj(0.0, ctx.aspect()));
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lumen camera uniform"),
            contents: bytemuck::bytes_of(&camera),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let targets = GBufferTargets::new(device, ctx.surface_size);
        let gbuffer_pass = GBufferPass::new(device, &camera_buffer, self.config.model);
        let light_pass = LightUpdatePass::new(device, &lights);
        let composition = CompositionPass::new(
            device,
            ctx.surface_format,
            &targets,
            &lights,
            &camera_buffer,
            self.settings.mode,
        );

        log::info!(
            "deferred renderer ready: {} indices, {} active lights, {}x{} gbuffer",
            geometry.index_count(),
            lights.active_count(),
            ctx.surface_size.0,
            ctx.surface_size.1
        );

        self.camera_buffer = Some(camera_buffer);
        self.geometry = Some(geometry);
        self.lights = Some(lights);
        self.targets = Some(targets);
        self.gbuffer_pass = Some(gbuffer_pass);
        self.light_pass = Some(light_pass);
        self.composition = Some(composition);
        Ok(())
    }

    fn resize(&mut self, ctx: &RenderCtx<'_>) {
        let (Some(targets), Some(composition)) = (&mut self.targets, &mut self.composition) else {
            return;
        };
        if targets.size() == ctx.surface_size {
            return;
        }

        *targets = GBufferTargets::new(ctx.device, ctx.surface_size);
        composition.rebind(ctx.device, targets);
        log::info!(
            "gbuffer resized to {}x{}",
            ctx.surface_size.0,
            ctx.surface_size.1
        );
    }

    fn settings_changed(
        &mut self,
        ctx: &RenderCtx<'_>,
        settings: &RenderSettings,
    ) -> Result<(), RenderError> {
        if let Some(lights) = &mut self.lights {
            lights.set_active_count(ctx.queue, settings.num_lights)?;
        }
        if let Some(composition) = &mut self.composition {
            composition.select(settings.mode);
        }
        self.settings = *settings;
        Ok(())
    }

    fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        time: &FrameTime,
    ) -> Result<(), RenderError> {
        let camera_buffer = require(&self.camera_buffer, "camera uniform")?;
        let geometry = require(&self.geometry, "geometry buffer")?;
        let lights = require(&self.lights, "light store")?;
        let targets = require(&self.targets, "gbuffer targets")?;
        let gbuffer_pass = require(&self.gbuffer_pass, "gbuffer pipeline")?;
        let light_pass = require(&self.light_pass, "light update pipeline")?;
        let composition = require(&self.composition, "composition pipeline")?;

        for step in FramePlan::DEFERRED.steps() {
            match step {
                FrameStep::UpdateCamera => {
                    let view_proj = self.config.camera.view_proj(time.elapsed, ctx.aspect());
                    ctx.queue.write_buffer(
                        camera_buffer,
                        0,
                        bytemuck::bytes_of(&CameraUniform::new(view_proj)),
                    );
                }
                FrameStep::GBuffer => gbuffer_pass.record(target.encoder, targets, geometry),
                FrameStep::LightUpdate => {
                    lights.write_motion(ctx.queue, time);
                    light_pass.record(target.encoder);
                }
                FrameStep::Composition => composition.record(target.encoder, target.color_view),
            }
        }
        Ok(())
    }

    fn teardown(&mut self) {
        self.composition = None;
        self.light_pass = None;
        self.gbuffer_pass = None;
        self.targets = None;
        self.lights = None;
        self.geometry = None;
        self.camera_buffer = None;
        log::debug!("deferred renderer torn down");
    }
}
