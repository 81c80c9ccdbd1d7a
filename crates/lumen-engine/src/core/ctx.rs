use winit::window::{Window, WindowId};

use crate::device::{Gpu, SurfaceErrorAction};
use crate::input::{InputFrame, InputState};
use crate::render::{RenderCtx, RenderTarget};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id:     WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Replaces the window title. Cheap to call every frame; unchanged titles are skipped.
    pub fn set_title(&self, title: &str) {
        if self.window.title() != title {
            self.window.set_title(title);
        }
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window:       WindowCtx<'a>,
    pub gpu:          &'a mut Gpu<'w>,
    pub input:        &'a InputState,
    pub input_frame:  &'a InputFrame,
    pub time:         FrameTime,
    pub runtime:      &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Builds a [`RenderCtx`] for the current surface without acquiring a frame.
    ///
    /// Used for work that needs the device outside a frame (renderer initialization).
    pub fn render_ctx(&self) -> RenderCtx<'_> {
        let size = self.gpu.size();
        RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            (size.width, size.height),
        )
    }

    /// Acquires the surface texture, calls `draw` with a ready [`RenderCtx`] and
    /// [`RenderTarget`], then submits and presents the frame.
    ///
    /// Surface errors are resolved here: a skipped frame returns `Continue`, a fatal one `Exit`.
    pub fn render<F>(&mut self, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>) -> AppControl,
    {
        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            // Minimized; nothing to draw into.
            return AppControl::Continue;
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let action = self.gpu.handle_surface_error(err);
                if action == SurfaceErrorAction::Fatal {
                    return AppControl::Exit;
                }
                return AppControl::Continue;
            }
        };

        let rctx = self.render_ctx();

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        let control = {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            draw(&rctx, &mut target)
        };

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        control
    }
}
