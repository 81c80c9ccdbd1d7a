use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Camera block: view-projection and its inverse (for depth reconstruction).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new(view_proj: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view_proj)
    }

    pub fn inv_view_proj(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.inv_view_proj)
    }
}

/// Model block: model matrix and the inverse-transpose used for normals.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl ModelUniform {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
        }
    }

    pub fn model(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }

    pub fn normal(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.normal)
    }
}

/// Minimum binding size for a uniform of type `T`.
pub(crate) fn min_binding_size<T>() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64)
}

/// Layout entry for a plain uniform buffer of type `T`.
pub(crate) fn uniform_entry<T>(
    binding: u32,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: min_binding_size::<T>(),
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::{Quat, Vec3};

    fn assert_mat_eq(a: Mat4, b: Mat4, epsilon: f32) {
        for (x, y) in a.to_cols_array().iter().zip(b.to_cols_array().iter()) {
            assert_relative_eq!(*x, *y, epsilon = epsilon);
        }
    }

    #[test]
    fn model_uniform_round_trips_through_bytes() {
        let model = Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 1.0, 0.5),
            Quat::from_rotation_y(0.7),
            Vec3::new(0.0, -45.0, 3.0),
        );
        let uniform = ModelUniform::new(model);
        let bytes = bytemuck::bytes_of(&uniform).to_vec();
        assert_eq!(bytes.len(), 2 * 16 * 4);

        let back: ModelUniform = bytemuck::pod_read_unaligned(&bytes);
        assert_mat_eq(back.model(), model, 1e-6);
        assert_mat_eq(back.normal(), model.inverse().transpose(), 1e-6);
    }

    #[test]
    fn normal_matrix_of_translation_keeps_directions() {
        let uniform = ModelUniform::new(Mat4::from_translation(Vec3::new(0.0, -45.0, 0.0)));
        let n = uniform.normal().transform_vector3(Vec3::Y);
        assert_relative_eq!(n.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(n.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(n.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn camera_uniform_stores_inverse() {
        let proj = Mat4::perspective_rh(1.2, 4.0 / 3.0, 1.0, 2000.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 50.0, -100.0), Vec3::ZERO, Vec3::Y);
        let uniform = CameraUniform::new(proj * view);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 2 * 16 * 4);
        assert_mat_eq(uniform.view_proj() * uniform.inv_view_proj(), Mat4::IDENTITY, 1e-3);
    }
}
