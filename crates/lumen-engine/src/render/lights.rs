//! Point-light storage shared by the light-update compute pass and the
//! deferred composition pass.
//!
//! GPU layout (matches `shaders/light_update.wgsl` and `shaders/deferred_lighting.wgsl`):
//! - light array: `MAX_LIGHTS` × [`LightRecord`] (32 bytes each), `STORAGE`
//! - light count: one `u32` padded to 16 bytes, `UNIFORM`
//! - extent: min.xyz + pad, max.xyz + pad, `UNIFORM`
//! - motion: delta time + pad, `UNIFORM`, rewritten every frame

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::Rng;
use wgpu::util::DeviceExt;

use super::error::RenderError;
use crate::time::FrameTime;

/// Capacity of the light buffer. The active count never exceeds it.
pub const MAX_LIGHTS: u32 = 1024;

/// Compute workgroup size declared in `light_update.wgsl`.
pub const WORKGROUP_SIZE: u32 = 64;

/// Radius given to every seeded light.
pub const LIGHT_RADIUS: f32 = 20.0;

/// Number of workgroups needed to touch `capacity` lights.
///
/// The update pass always covers full capacity; honoring the active count is
/// the composition pass's job.
pub const fn dispatch_count(capacity: u32) -> u32 {
    capacity.div_ceil(WORKGROUP_SIZE)
}

/// One light as stored on the GPU: eight floats.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LightRecord {
    /// xyz position, w = 1.
    pub position: [f32; 4],
    pub color: [f32; 3],
    pub radius: f32,
}

impl LightRecord {
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.position[0], self.position[1], self.position[2])
    }
}

/// Axis-aligned box the lights live in.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightExtent {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for LightExtent {
    fn default() -> Self {
        Self {
            min: Vec3::new(-50.0, -30.0, -50.0),
            max: Vec3::new(50.0, 50.0, 50.0),
        }
    }
}

impl LightExtent {
    /// Rejects boxes that are empty along any axis.
    pub fn new(min: Vec3, max: Vec3) -> Result<Self, RenderError> {
        if min.cmpge(max).any() {
            return Err(RenderError::invalid(format!(
                "light extent min {min} must be below max {max} on every axis"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Wraps `p` into the box per axis: leaving past one face re-enters at the opposite one.
    pub fn wrap(&self, p: Vec3) -> Vec3 {
        let size = self.size();
        let t = (p - self.min) / size;
        let wrapped = self.min + (t - t.floor()) * size;
        wrapped.clamp(self.min, self.max)
    }
}

/// Drift speed (units per second) of light `index` along −Y.
pub fn drift_speed(index: u32) -> f32 {
    30.0 + 0.18 * (index % WORKGROUP_SIZE) as f32
}

/// CPU mirror of the motion law in `light_update.wgsl`.
pub fn advance_light(position: Vec3, index: u32, dt: f32, extent: &LightExtent) -> Vec3 {
    let moved = position - Vec3::Y * drift_speed(index) * dt;
    extent.wrap(moved)
}

/// Random initial lights: positions uniform in the extent, colors in `[0, 2)`.
pub fn seed_lights<R: Rng + ?Sized>(rng: &mut R, extent: &LightExtent, count: u32) -> Vec<LightRecord> {
    let size = extent.size();
    (0..count)
        .map(|_| {
            let p = extent.min
                + Vec3::new(
                    rng.r#gen::<f32>() * size.x,
                    rng.r#gen::<f32>() * size.y,
                    rng.r#gen::<f32>() * size.z,
                );
            LightRecord {
                position: [p.x, p.y, p.z, 1.0],
                color: [
                    rng.r#gen::<f32>() * 2.0,
                    rng.r#gen::<f32>() * 2.0,
                    rng.r#gen::<f32>() * 2.0,
                ],
                radius: LIGHT_RADIUS,
            }
        })
        .collect()
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct LightCountUniform {
    count: u32,
    _pad: [u32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct ExtentUniform {
    pub min: [f32; 4],
    pub max: [f32; 4],
}

impl From<&LightExtent> for ExtentUniform {
    fn from(extent: &LightExtent) -> Self {
        Self {
            min: extent.min.extend(0.0).to_array(),
            max: extent.max.extend(0.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct MotionUniform {
    delta_time: f32,
    _pad: [f32; 3],
}

/// Owns the light array and the small uniforms describing it.
pub struct LightStore {
    lights: wgpu::Buffer,
    count: wgpu::Buffer,
    extent_buffer: wgpu::Buffer,
    motion: wgpu::Buffer,
    extent: LightExtent,
    active_count: u32,
}

impl LightStore {
    /// Size in bytes of the light array.
    pub const BUFFER_SIZE: u64 = MAX_LIGHTS as u64 * std::mem::size_of::<LightRecord>() as u64;

    /// Seeds `MAX_LIGHTS` lights with `rng` and uploads them.
    pub fn new<R: Rng + ?Sized>(
        device: &wgpu::Device,
        extent: LightExtent,
        active_count: u32,
        rng: &mut R,
    ) -> Result<Self, RenderError> {
        validate_active_count(active_count)?;

        let records = seed_lights(rng, &extent, MAX_LIGHTS);
        let lights = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lumen lights"),
            contents: bytemuck::cast_slice(&records),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });

        let count = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lumen light count"),
            contents: bytemuck::bytes_of(&LightCountUniform {
                count: active_count,
                _pad: [0; 3],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let extent_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lumen light extent"),
            contents: bytemuck::bytes_of(&ExtentUniform::from(&extent)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let motion = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen light motion"),
            size: std::mem::size_of::<MotionUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::debug!(
            "light store: {MAX_LIGHTS} lights ({} bytes), {active_count} active",
            Self::BUFFER_SIZE
        );

        Ok(Self {
            lights,
            count,
            extent_buffer,
            motion,
            extent,
            active_count,
        })
    }

    /// Changes how many lights composition reads. Only the count uniform is rewritten.
    pub fn set_active_count(&mut self, queue: &wgpu::Queue, count: u32) -> Result<(), RenderError> {
        validate_active_count(count)?;
        if count != self.active_count {
            queue.write_buffer(&self.count, 0, bytemuck::bytes_of(&count));
            self.active_count = count;
        }
        Ok(())
    }

    /// Uploads this frame's delta time for the motion law.
    pub fn write_motion(&self, queue: &wgpu::Queue, time: &FrameTime) {
        let uniform = MotionUniform {
            delta_time: time.dt,
            _pad: [0.0; 3],
        };
        queue.write_buffer(&self.motion, 0, bytemuck::bytes_of(&uniform));
    }

    pub fn active_count(&self) -> u32 {
        self.active_count
    }

    pub fn extent(&self) -> &LightExtent {
        &self.extent
    }

    pub fn lights_buffer(&self) -> &wgpu::Buffer {
        &self.lights
    }

    pub fn count_buffer(&self) -> &wgpu::Buffer {
        &self.count
    }

    pub fn extent_buffer(&self) -> &wgpu::Buffer {
        &self.extent_buffer
    }

    pub fn motion_buffer(&self) -> &wgpu::Buffer {
        &self.motion
    }
}

fn validate_active_count(count: u32) -> Result<(), RenderError> {
    if (1..=MAX_LIGHTS).contains(&count) {
        Ok(())
    } else {
        Err(RenderError::invalid(format!(
            "light count {count} outside [1, {MAX_LIGHTS}]"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    // ── dispatch ──────────────────────────────────────────────────────────

    #[test]
    fn dispatch_covers_full_capacity() {
        assert_eq!(dispatch_count(MAX_LIGHTS), 16);
        assert_eq!(dispatch_count(1), 1);
        assert_eq!(dispatch_count(65), 2);
        assert!(dispatch_count(MAX_LIGHTS) * WORKGROUP_SIZE >= MAX_LIGHTS);
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn light_record_is_eight_floats() {
        assert_eq!(std::mem::size_of::<LightRecord>(), 8 * 4);
    }

    #[test]
    fn light_buffer_size_matches_capacity() {
        assert_eq!(LightStore::BUFFER_SIZE, 1024 * 8 * 4);
    }

    #[test]
    fn extent_uniform_is_eight_floats() {
        let u = ExtentUniform::from(&LightExtent::default());
        assert_eq!(std::mem::size_of::<ExtentUniform>(), 8 * 4);
        assert_eq!(u.min, [-50.0, -30.0, -50.0, 0.0]);
        assert_eq!(u.max, [50.0, 50.0, 50.0, 0.0]);
    }

    // ── active count ──────────────────────────────────────────────────────

    #[test]
    fn active_count_range_is_enforced() {
        assert!(validate_active_count(0).is_err());
        assert!(validate_active_count(1).is_ok());
        assert!(validate_active_count(MAX_LIGHTS).is_ok());
        assert!(validate_active_count(MAX_LIGHTS + 1).is_err());
    }

    // ── seeding ───────────────────────────────────────────────────────────

    #[test]
    fn seeded_lights_fill_the_extent() {
        let extent = LightExtent::default();
        let mut rng = StdRng::seed_from_u64(7);
        let lights = seed_lights(&mut rng, &extent, MAX_LIGHTS);
        assert_eq!(lights.len(), MAX_LIGHTS as usize);
        for light in &lights {
            assert!(extent.contains(light.position()));
            assert_eq!(light.position[3], 1.0);
            assert!(light.color.iter().all(|c| (0.0..2.0).contains(c)));
            assert_eq!(light.radius, LIGHT_RADIUS);
        }
    }

    #[test]
    fn seeding_is_deterministic_for_a_seed() {
        let extent = LightExtent::default();
        let a = seed_lights(&mut StdRng::seed_from_u64(3), &extent, 8);
        let b = seed_lights(&mut StdRng::seed_from_u64(3), &extent, 8);
        assert_eq!(a, b);
    }

    // ── motion ────────────────────────────────────────────────────────────

    #[test]
    fn extent_rejects_empty_axis() {
        assert!(LightExtent::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0)).is_err());
        assert!(LightExtent::new(Vec3::ZERO, Vec3::ONE).is_ok());
    }

    #[test]
    fn wrap_reenters_from_opposite_face() {
        let extent = LightExtent::default();
        let p = extent.wrap(Vec3::new(0.0, -35.0, 0.0));
        assert!((p.y - 45.0).abs() < 1e-4);
        let p = extent.wrap(Vec3::new(55.0, 0.0, -60.0));
        assert!((p.x - -45.0).abs() < 1e-4);
        assert!((p.z - 40.0).abs() < 1e-4);
    }

    #[test]
    fn lights_never_leave_the_extent() {
        let extent = LightExtent::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut lights = seed_lights(&mut rng, &extent, MAX_LIGHTS);
        for frame in 0..600 {
            // Alternate between normal and stalled frame times.
            let dt = if frame % 97 == 0 { 0.25 } else { 1.0 / 60.0 };
            for (index, light) in lights.iter_mut().enumerate() {
                let p = advance_light(light.position(), index as u32, dt, &extent);
                light.position = [p.x, p.y, p.z, 1.0];
                assert!(extent.contains(p), "light {index} escaped at frame {frame}: {p}");
            }
        }
    }

    #[test]
    fn motion_scales_with_delta_time() {
        let extent = LightExtent::default();
        let start = Vec3::new(0.0, 20.0, 0.0);
        let a = advance_light(start, 0, 0.01, &extent);
        let b = advance_light(start, 0, 0.02, &extent);
        assert!(((start.y - a.y) * 2.0 - (start.y - b.y)).abs() < 1e-4);
        assert_eq!(a.x, start.x);
        assert_eq!(a.z, start.z);
    }

    #[test]
    fn zero_delta_time_keeps_lights_still() {
        let extent = LightExtent::default();
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!((advance_light(p, 5, 0.0, &extent) - p).length() < 1e-5);
    }
}
