use glam::{Mat4, Vec3};

use crate::input::{InputState, Key, MouseButton};

/// Vertical field of view shared by every demo camera.
pub const FOV_Y: f32 = 2.0 * std::f32::consts::PI / 5.0;

/// Width / height, guarding against a zero-height surface.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

/// Camera that circles the origin at a fixed height, driven only by time.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub near: f32,
    pub far: f32,
    /// Seconds for a full revolution.
    pub period: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 50.0, -100.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            near: 1.0,
            far: 2000.0,
            period: 10.0,
        }
    }
}

impl OrbitCamera {
    /// Eye position after `elapsed` seconds of orbiting.
    pub fn eye_at(&self, elapsed: f32) -> Vec3 {
        let angle = std::f32::consts::TAU * elapsed / self.period;
        Mat4::from_rotation_y(angle).transform_point3(self.eye)
    }

    pub fn view_proj(&self, elapsed: f32, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye_at(elapsed), self.target, self.up);
        let proj = Mat4::perspective_rh(FOV_Y, aspect.max(0.01), self.near, self.far);
        proj * view
    }
}

/// Movement intent for one frame, decoupled from the windowing layer.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct CameraInput {
    pub forward: f32,
    pub right: f32,
    pub up: f32,
    /// Radians to turn, positive to the right.
    pub yaw: f32,
    /// Radians to tilt, positive upwards.
    pub pitch: f32,
}

/// Translates held keys and mouse drags into [`CameraInput`].
///
/// Looking is drag-only; the arrow keys belong to the studio control panel.
#[derive(Debug, Default)]
pub struct CameraInputMapper {
    last_pointer: Option<(f32, f32)>,
    pub sensitivity: f32,
}

impl CameraInputMapper {
    pub fn new() -> Self {
        Self {
            last_pointer: None,
            sensitivity: 0.005,
        }
    }

    pub fn map(&mut self, input: &InputState) -> CameraInput {
        let axis = |pos: Key, neg: Key| {
            (input.key_down(pos) as i32 - input.key_down(neg) as i32) as f32
        };

        let mut out = CameraInput {
            forward: axis(Key::W, Key::S),
            right: axis(Key::D, Key::A),
            up: axis(Key::E, Key::Q),
            ..CameraInput::default()
        };

        let pointer = input.pointer_pos;
        if input.button_down(MouseButton::Left) {
            if let (Some((x, y)), Some((lx, ly))) = (pointer, self.last_pointer) {
                out.yaw += (x - lx) * self.sensitivity;
                out.pitch -= (y - ly) * self.sensitivity;
            }
        }
        self.last_pointer = pointer;
        out
    }
}

/// First-person camera: WASD moves, yaw/pitch look.
#[derive(Debug, Clone)]
pub struct FlyCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// Units per second.
    pub speed: f32,
}

impl FlyCamera {
    const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

    /// Places the camera at `position` looking at `target`.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let dir = (target - position).normalize_or(Vec3::NEG_Z);
        Self {
            position,
            yaw: dir.x.atan2(-dir.z),
            pitch: dir.y.asin(),
            speed: 3.0,
        }
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
    }

    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin())
    }

    /// Applies one frame of input and returns the new view matrix.
    pub fn update(&mut self, dt: f32, input: &CameraInput) -> Mat4 {
        self.yaw += input.yaw;
        self.pitch = (self.pitch + input.pitch).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);

        let step = self.speed * dt;
        self.position += self.forward() * input.forward * step
            + self.right() * input.right * step
            + Vec3::Y * input.up * step;

        self.view()
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ── orbit ─────────────────────────────────────────────────────────────

    #[test]
    fn orbit_keeps_radius_and_height() {
        let cam = OrbitCamera::default();
        for t in [0.0, 1.3, 2.5, 7.9] {
            let eye = cam.eye_at(t);
            assert_relative_eq!(eye.y, 50.0, epsilon = 1e-4);
            assert_relative_eq!(
                Vec3::new(eye.x, 0.0, eye.z).length(),
                100.0,
                epsilon = 1e-3
            );
        }
    }

    #[test]
    fn orbit_completes_a_revolution_per_period() {
        let cam = OrbitCamera::default();
        let a = cam.eye_at(0.0);
        let b = cam.eye_at(cam.period);
        assert!((a - b).length() < 1e-3);
        let half = cam.eye_at(cam.period * 0.5);
        assert_relative_eq!(half.z, 100.0, epsilon = 1e-3);
    }

    #[test]
    fn orbit_projects_target_to_screen_center() {
        let cam = OrbitCamera::default();
        let clip = cam.view_proj(3.0, 4.0 / 3.0) * cam.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-4);
        assert!((0.0..1.0).contains(&ndc.z));
    }

    #[test]
    fn aspect_ratio_handles_zero_height() {
        assert_eq!(aspect_ratio(800, 600), 800.0 / 600.0);
        assert_eq!(aspect_ratio(800, 0), 1.0);
    }

    // ── fly ───────────────────────────────────────────────────────────────

    #[test]
    fn looking_at_faces_the_target() {
        let cam = FlyCamera::looking_at(Vec3::new(3.0, 2.0, 5.0), Vec3::ZERO);
        let expected = (Vec3::ZERO - Vec3::new(3.0, 2.0, 5.0)).normalize();
        assert!((cam.forward() - expected).length() < 1e-4);
    }

    #[test]
    fn forward_input_moves_along_view_direction() {
        let mut cam = FlyCamera::looking_at(Vec3::ZERO, Vec3::NEG_Z);
        let input = CameraInput {
            forward: 1.0,
            ..Default::default()
        };
        cam.update(1.0, &input);
        assert_relative_eq!(cam.position.z, -cam.speed, epsilon = 1e-4);
        assert_relative_eq!(cam.position.x, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn strafe_is_perpendicular_to_forward() {
        let cam = FlyCamera::looking_at(Vec3::ZERO, Vec3::new(1.0, 0.0, -1.0));
        assert_relative_eq!(cam.forward().dot(cam.right()), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = FlyCamera::looking_at(Vec3::ZERO, Vec3::NEG_Z);
        let input = CameraInput {
            pitch: 10.0,
            ..Default::default()
        };
        cam.update(0.016, &input);
        assert!(cam.pitch < std::f32::consts::FRAC_PI_2);
        assert!(cam.view().is_finite());
    }

    #[test]
    fn mapper_reads_held_keys() {
        let mut state = InputState::default();
        state.keys_down.insert(Key::W);
        state.keys_down.insert(Key::A);
        let input = CameraInputMapper::new().map(&state);
        assert_eq!(input.forward, 1.0);
        assert_eq!(input.right, -1.0);
        assert_eq!(input.up, 0.0);
    }

    #[test]
    fn mapper_turns_on_left_drag() {
        let mut mapper = CameraInputMapper::new();
        let mut state = InputState::default();
        state.buttons_down.insert(MouseButton::Left);
        state.pointer_pos = Some((100.0, 100.0));
        mapper.map(&state);
        state.pointer_pos = Some((110.0, 100.0));
        let input = mapper.map(&state);
        assert!(input.yaw > 0.0);
        assert_eq!(input.pitch, 0.0);
    }

    #[test]
    fn arrow_keys_do_not_turn_the_camera() {
        let mut state = InputState::default();
        for key in [Key::ArrowUp, Key::ArrowDown, Key::ArrowLeft, Key::ArrowRight] {
            state.keys_down.insert(key);
        }
        let input = CameraInputMapper::new().map(&state);
        assert_eq!(input, CameraInput::default());
    }
}
