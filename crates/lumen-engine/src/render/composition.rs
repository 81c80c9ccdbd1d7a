//! Final full-screen pass: deferred lighting or a G-buffer debug view.
//!
//! Both pipelines share the G-buffer texture layout (group 0). The lighting
//! pipeline additionally binds the light array, the active count and the
//! camera (group 1). Switching mode only changes which pipeline is recorded.

use super::gbuffer::GBufferTargets;
use super::lights::{LightCountUniform, LightRecord, LightStore};
use super::settings::CompositionMode;
use super::uniforms::{min_binding_size, uniform_entry, CameraUniform};

/// Constant light added to every covered pixel.
pub const AMBIENT: f32 = 0.2;

/// Whether `mode` reads the light buffer.
pub fn reads_lights(mode: CompositionMode) -> bool {
    matches!(mode, CompositionMode::Rendering)
}

pub struct CompositionPass {
    gbuffer_layout: wgpu::BindGroupLayout,
    gbuffer_bind_group: wgpu::BindGroup,
    lights_bind_group: wgpu::BindGroup,
    lighting_pipeline: wgpu::RenderPipeline,
    debug_pipeline: wgpu::RenderPipeline,
    mode: CompositionMode,
}

impl CompositionPass {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        targets: &GBufferTargets,
        lights: &LightStore,
        camera_buffer: &wgpu::Buffer,
        mode: CompositionMode,
    ) -> Self {
        let quad = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen fullscreen quad shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/fullscreen_quad.wgsl").into()),
        });
        let lighting = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen deferred lighting shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/deferred_lighting.wgsl").into()),
        });
        let debug = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen gbuffer debug shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/gbuffer_debug.wgsl").into()),
        });

        let texture = |binding, sample_type| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type,
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let gbuffer_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lumen gbuffer textures bgl"),
            entries: &[
                texture(0, wgpu::TextureSampleType::Float { filterable: false }),
                texture(1, wgpu::TextureSampleType::Float { filterable: false }),
                texture(2, wgpu::TextureSampleType::Depth),
            ],
        });

        let lights_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lumen lights bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: min_binding_size::<LightRecord>(),
                    },
                    count: None,
                },
                uniform_entry::<LightCountUniform>(1, wgpu::ShaderStages::FRAGMENT),
                uniform_entry::<CameraUniform>(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let lighting_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lumen deferred lighting pipeline layout"),
            bind_group_layouts: &[&gbuffer_layout, &lights_layout],
            immediate_size: 0,
        });
        let debug_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lumen gbuffer debug pipeline layout"),
            bind_group_layouts: &[&gbuffer_layout],
            immediate_size: 0,
        });

        let fullscreen = |label, layout: &wgpu::PipelineLayout, fragment: &wgpu::ShaderModule| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &quad,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[],
                },
                fragment: Some(wgpu::FragmentState {
                    module: fragment,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(surface_format.into())],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let lighting_pipeline = fullscreen("lumen deferred lighting pipeline", &lighting_layout, &lighting);
        let debug_pipeline = fullscreen("lumen gbuffer debug pipeline", &debug_layout, &debug);

        let lights_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen lights bind group"),
            layout: &lights_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: lights.lights_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights.count_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: camera_buffer.as_entire_binding(),
                },
            ],
        });

        let gbuffer_bind_group = create_gbuffer_bind_group(device, &gbuffer_layout, targets);

        Self {
            gbuffer_layout,
            gbuffer_bind_group,
            lights_bind_group,
            lighting_pipeline,
            debug_pipeline,
            mode,
        }
    }

    /// Points the texture bind group at freshly created targets.
    pub fn rebind(&mut self, device: &wgpu::Device, targets: &GBufferTargets) {
        self.gbuffer_bind_group = create_gbuffer_bind_group(device, &self.gbuffer_layout, targets);
    }

    pub fn select(&mut self, mode: CompositionMode) {
        if self.mode != mode {
            log::debug!("composition mode: {} -> {}", self.mode, mode);
            self.mode = mode;
        }
    }

    pub fn mode(&self) -> CompositionMode {
        self.mode
    }

    /// Draws the full-screen quad into `view`. Pixels without geometry stay black.
    pub fn record(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lumen composition pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
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

        if reads_lights(self.mode) {
            rpass.set_pipeline(&self.lighting_pipeline);
            rpass.set_bind_group(0, &self.gbuffer_bind_group, &[]);
            rpass.set_bind_group(1, &self.lights_bind_group, &[]);
        } else {
            rpass.set_pipeline(&self.debug_pipeline);
            rpass.set_bind_group(0, &self.gbuffer_bind_group, &[]);
        }
        rpass.draw(0..6, 0..1);
    }
}

fn create_gbuffer_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    targets: &GBufferTargets,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("lumen gbuffer textures bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(targets.normal_view()),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(targets.albedo_view()),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(targets.depth_view()),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::{Mat4, Vec2, Vec3, Vec4};

    /// CPU mirror of `world_from_screen` in `deferred_lighting.wgsl`.
    ///
    /// `uv` is the pixel position divided by the target size (origin top-left).
    fn world_from_screen(uv: Vec2, depth: f32, inv_view_proj: Mat4) -> Vec3 {
        let clip = Vec4::new(uv.x * 2.0 - 1.0, (1.0 - uv.y) * 2.0 - 1.0, depth, 1.0);
        let world = inv_view_proj * clip;
        world.truncate() / world.w
    }

    /// CPU mirror of the lighting loop in `deferred_lighting.wgsl`.
    ///
    /// Only the first `active_count` entries of `lights` contribute.
    fn shade_point(
        position: Vec3,
        normal: Vec3,
        albedo: Vec3,
        lights: &[LightRecord],
        active_count: u32,
    ) -> Vec3 {
        let count = (active_count as usize).min(lights.len());
        let lit: Vec3 = lights[..count]
            .iter()
            .filter_map(|light| {
                let to_light = light.position() - position;
                let dist = to_light.length();
                if dist > light.radius {
                    return None;
                }
                let lambert = normal.dot(to_light.normalize_or_zero()).max(0.0);
                let falloff = (1.0 - dist / light.radius).powi(2);
                Some(lambert * falloff * Vec3::from(light.color) * albedo)
            })
            .sum();
        lit + Vec3::splat(AMBIENT)
    }

    fn light_at(p: Vec3, color: Vec3) -> LightRecord {
        LightRecord {
            position: p.extend(1.0).to_array(),
            color: color.to_array(),
            radius: 20.0,
        }
    }

    // ── mode selection ────────────────────────────────────────────────────

    #[test]
    fn only_rendering_mode_reads_lights() {
        assert!(reads_lights(CompositionMode::Rendering));
        assert!(!reads_lights(CompositionMode::GBuffersView));
    }

    // ── lighting ──────────────────────────────────────────────────────────

    #[test]
    fn unlit_point_gets_ambient_only() {
        let c = shade_point(Vec3::ZERO, Vec3::Y, Vec3::ONE, &[], 0);
        assert_eq!(c, Vec3::splat(AMBIENT));
    }

    #[test]
    fn lights_past_active_count_are_ignored() {
        let lights = [
            light_at(Vec3::new(0.0, 5.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
            light_at(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
        ];
        let one = shade_point(Vec3::ZERO, Vec3::Y, Vec3::ONE, &lights, 1);
        assert!(one.x > AMBIENT);
        assert_eq!(one.y, AMBIENT);

        let both = shade_point(Vec3::ZERO, Vec3::Y, Vec3::ONE, &lights, 2);
        assert!(both.y > AMBIENT);
    }

    #[test]
    fn active_count_beyond_array_is_capped() {
        let lights = [light_at(Vec3::new(0.0, 5.0, 0.0), Vec3::ONE)];
        let a = shade_point(Vec3::ZERO, Vec3::Y, Vec3::ONE, &lights, 1);
        let b = shade_point(Vec3::ZERO, Vec3::Y, Vec3::ONE, &lights, 1024);
        assert_eq!(a, b);
    }

    #[test]
    fn light_outside_radius_contributes_nothing() {
        let lights = [light_at(Vec3::new(0.0, 25.0, 0.0), Vec3::ONE)];
        let c = shade_point(Vec3::ZERO, Vec3::Y, Vec3::ONE, &lights, 1);
        assert_eq!(c, Vec3::splat(AMBIENT));
    }

    #[test]
    fn falloff_and_lambert() {
        // Straight above at half radius: lambert 1, falloff 0.25.
        let lights = [light_at(Vec3::new(0.0, 10.0, 0.0), Vec3::ONE)];
        let c = shade_point(Vec3::ZERO, Vec3::Y, Vec3::splat(0.5), &lights, 1);
        assert_relative_eq!(c.x, 0.25 * 0.5 + AMBIENT, epsilon = 1e-6);

        // Behind the surface: lambert clamps to zero.
        let c = shade_point(Vec3::ZERO, Vec3::NEG_Y, Vec3::ONE, &lights, 1);
        assert_eq!(c, Vec3::splat(AMBIENT));
    }

    // ── reconstruction ────────────────────────────────────────────────────

    #[test]
    fn world_position_round_trips_through_projection() {
        let view_proj = Mat4::perspective_rh(1.2566, 4.0 / 3.0, 1.0, 2000.0)
            * Mat4::look_at_rh(Vec3::new(0.0, 50.0, -100.0), Vec3::ZERO, Vec3::Y);
        let p = Vec3::new(10.0, 5.0, -3.0);

        let clip = view_proj * p.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        let uv = Vec2::new((ndc.x + 1.0) * 0.5, 1.0 - (ndc.y + 1.0) * 0.5);

        let back = world_from_screen(uv, ndc.z, view_proj.inverse());
        assert!((back - p).length() < 0.05, "reconstructed {back} from {p}");
    }
}
