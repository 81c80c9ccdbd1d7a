//! Single-pass renderers that share the orchestrator with the deferred renderer.

mod cube;
mod triangle;

pub use cube::{rotating_cube_mvp, CameraControlledCube, RotatingCube};
pub use triangle::TriangleDemo;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Renderer;
    use crate::input::InputState;
    use crate::render::RenderError;
    use crate::render::testing::TestGpu;
    use crate::time::FrameTime;

    fn all() -> Vec<Box<dyn Renderer>> {
        vec![
            Box::new(TriangleDemo::new()),
            Box::new(RotatingCube::new()),
            Box::new(CameraControlledCube::new()),
        ]
    }

    #[test]
    fn demos_render_and_survive_resize() {
        let gpu = TestGpu::new();
        let input = InputState::default();
        let time = FrameTime::from_parts(1.0 / 60.0, 0.5, 0);

        for mut demo in all() {
            demo.init_pipeline(&gpu.ctx((800, 600))).unwrap();
            demo.update(&time, &input);
            gpu.frame((800, 600), |ctx, target| demo.render(ctx, target, &time))
                .unwrap();

            demo.resize(&gpu.ctx((640, 480)));
            gpu.frame((640, 480), |ctx, target| demo.render(ctx, target, &time))
                .unwrap();
            demo.teardown();
        }
    }

    #[test]
    fn demos_refuse_to_render_before_init() {
        let gpu = TestGpu::new();
        let time = FrameTime::from_parts(1.0 / 60.0, 0.0, 0);
        for mut demo in all() {
            let result = gpu.frame((800, 600), |ctx, target| demo.render(ctx, target, &time));
            assert!(
                matches!(result, Err(RenderError::UninitializedResource { .. })),
                "{} rendered without init",
                demo.name()
            );
        }
    }
}
