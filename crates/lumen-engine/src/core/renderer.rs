use crate::input::InputState;
use crate::render::{RenderCtx, RenderError, RenderSettings, RenderTarget};
use crate::time::FrameTime;

/// A complete rendering technique driven by the [`FrameOrchestrator`].
///
/// GPU objects are created in `init_pipeline`, never in the constructor, so a renderer can
/// be built before a device exists and swapped at runtime.
///
/// [`FrameOrchestrator`]: super::FrameOrchestrator
pub trait Renderer {
    /// Short identifier used in logs and the window title.
    fn name(&self) -> &'static str;

    /// Creates every pipeline, buffer and target this renderer needs.
    fn init_pipeline(&mut self, ctx: &RenderCtx<'_>) -> Result<(), RenderError>;

    /// Recreates size-dependent resources after the surface changed size.
    fn resize(&mut self, ctx: &RenderCtx<'_>) {
        let _ = ctx;
    }

    /// Applies new runtime settings. Renderers that ignore them keep the default.
    fn settings_changed(
        &mut self,
        ctx: &RenderCtx<'_>,
        settings: &RenderSettings,
    ) -> Result<(), RenderError> {
        let _ = (ctx, settings);
        Ok(())
    }

    /// CPU-side per-frame update, before `render`.
    fn update(&mut self, time: &FrameTime, input: &InputState) {
        let _ = (time, input);
    }

    /// Records one frame into `target`. Submission is the caller's job.
    fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        time: &FrameTime,
    ) -> Result<(), RenderError>;

    /// Drops GPU objects. The renderer may be initialized again afterwards.
    fn teardown(&mut self);
}
