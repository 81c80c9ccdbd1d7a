use crate::input::InputState;
use crate::render::{RenderCtx, RenderError, RenderSettings, RenderTarget};
use crate::time::FrameTime;

use super::renderer::Renderer;

/// Whether a renderer is installed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OrchestratorState {
    Idle,
    Running,
}

/// What happened on one tick.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    /// The active renderer recorded a frame.
    Rendered,
    /// No renderer; the target was only cleared.
    Idle,
    /// The frame limit was reached before this tick; nothing was recorded.
    LimitReached,
}

/// Changes queued between frames and applied before the next one starts.
#[derive(Debug, Default)]
pub struct FrameBoundary {
    pending_settings: Option<RenderSettings>,
    last_size: Option<(u32, u32)>,
    frame_limit: Option<u64>,
    frames: u64,
}

impl FrameBoundary {
    /// Queues `settings`; a later request before the boundary replaces it.
    pub fn request_settings(&mut self, settings: RenderSettings) {
        self.pending_settings = Some(settings);
    }

    pub fn take_settings(&mut self) -> Option<RenderSettings> {
        self.pending_settings.take()
    }

    /// Records the surface size for this frame; true if it differs from the last one seen.
    pub fn observe_size(&mut self, size: (u32, u32)) -> bool {
        let changed = self.last_size.is_some_and(|last| last != size);
        self.last_size = Some(size);
        changed
    }

    /// Forgets the last size so the next observation counts as fresh.
    pub fn reset_size(&mut self, size: (u32, u32)) {
        self.last_size = Some(size);
    }

    pub fn set_frame_limit(&mut self, limit: Option<u64>) {
        self.frame_limit = limit;
    }

    pub fn limit_reached(&self) -> bool {
        self.frame_limit.is_some_and(|limit| self.frames >= limit)
    }

    pub fn count_frame(&mut self) {
        self.frames += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Owns the active renderer and drives it one frame at a time.
///
/// Settings changes, resizes and renderer swaps take effect at frame boundaries only.
pub struct FrameOrchestrator {
    renderer: Option<Box<dyn Renderer>>,
    pending_swap: Option<Box<dyn Renderer>>,
    settings: RenderSettings,
    boundary: FrameBoundary,
}

impl FrameOrchestrator {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            renderer: None,
            pending_swap: None,
            settings,
            boundary: FrameBoundary::default(),
        }
    }

    pub fn state(&self) -> OrchestratorState {
        if self.renderer.is_some() {
            OrchestratorState::Running
        } else {
            OrchestratorState::Idle
        }
    }

    /// Name of the active renderer, if any.
    pub fn renderer_name(&self) -> Option<&'static str> {
        self.renderer.as_ref().map(|r| r.name())
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn frames_rendered(&self) -> u64 {
        self.boundary.frames()
    }

    pub fn set_frame_limit(&mut self, limit: Option<u64>) {
        self.boundary.set_frame_limit(limit);
    }

    /// Queues new settings for the next frame boundary.
    pub fn request_settings(&mut self, settings: RenderSettings) {
        self.boundary.request_settings(settings);
    }

    /// Queues a renderer swap for the next frame boundary.
    pub fn request_swap(&mut self, renderer: Box<dyn Renderer>) {
        self.pending_swap = Some(renderer);
    }

    /// Tears down and drops the active renderer, leaving the orchestrator idle.
    pub fn retire(&mut self) {
        if let Some(mut old) = self.renderer.take() {
            old.teardown();
            log::info!("renderer `{}` retired", old.name());
        }
    }

    /// Replaces the active renderer now.
    ///
    /// The old renderer is torn down and dropped before the new one initializes. If
    /// initialization fails the orchestrator stays idle and the error is returned; a
    /// renderer that initialized but rejected the settings is torn down first.
    pub fn swap(&mut self, ctx: &RenderCtx<'_>, mut next: Box<dyn Renderer>) -> Result<(), RenderError> {
        self.retire();

        next.init_pipeline(ctx)?;
        if let Err(e) = next.settings_changed(ctx, &self.settings) {
            next.teardown();
            return Err(e);
        }
        self.boundary.reset_size(ctx.surface_size);

        log::info!("renderer `{}` running", next.name());
        self.renderer = Some(next);
        Ok(())
    }

    /// Applies boundary changes, then records one frame into `target`.
    pub fn tick(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        time: &FrameTime,
        input: &InputState,
    ) -> Result<FrameOutcome, RenderError> {
        if self.boundary.limit_reached() {
            return Ok(FrameOutcome::LimitReached);
        }

        if let Some(next) = self.pending_swap.take() {
            let name = next.name();
            if let Err(e) = self.swap(ctx, next) {
                log::error!("failed to initialize renderer `{name}`: {e}");
            }
        }

        let resized = self.boundary.observe_size(ctx.surface_size);
        let pending = self.boundary.take_settings();

        let Some(renderer) = self.renderer.as_mut() else {
            if let Some(settings) = pending {
                self.settings = settings;
            }
            clear(target);
            return Ok(FrameOutcome::Idle);
        };

        if resized {
            log::info!(
                "surface resized to {}x{}",
                ctx.surface_size.0,
                ctx.surface_size.1
            );
            renderer.resize(ctx);
        }

        if let Some(settings) = pending {
            if settings != self.settings {
                renderer.settings_changed(ctx, &settings)?;
                log::info!(
                    "settings: mode {}, {} lights",
                    settings.mode,
                    settings.num_lights
                );
                self.settings = settings;
            }
        }

        renderer.update(time, input);
        renderer.render(ctx, target, time)?;
        self.boundary.count_frame();
        Ok(FrameOutcome::Rendered)
    }
}

fn clear(target: &mut RenderTarget<'_>) {
    let _rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("lumen idle clear"),
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CompositionMode;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records every lifecycle call as `"<name>:<event>"`.
    struct Recorder {
        name: &'static str,
        log: Log,
        fail_init: bool,
        fail_settings: bool,
    }

    impl Recorder {
        fn boxed(name: &'static str, log: &Log) -> Box<Self> {
            Box::new(Self {
                name,
                log: log.clone(),
                fail_init: false,
                fail_settings: false,
            })
        }

        fn push(&self, event: impl std::fmt::Display) {
            self.log.borrow_mut().push(format!("{}:{event}", self.name));
        }
    }

    impl Renderer for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn init_pipeline(&mut self, _ctx: &RenderCtx<'_>) -> Result<(), RenderError> {
            self.push("init");
            if self.fail_init {
                return Err(RenderError::InvalidConfiguration("init refused".into()));
            }
            Ok(())
        }

        fn resize(&mut self, ctx: &RenderCtx<'_>) {
            self.push(format_args!("resize {}x{}", ctx.surface_size.0, ctx.surface_size.1));
        }

        fn settings_changed(
            &mut self,
            _ctx: &RenderCtx<'_>,
            settings: &RenderSettings,
        ) -> Result<(), RenderError> {
            self.push(format_args!("settings {}", settings.num_lights));
            if self.fail_settings {
                return Err(RenderError::InvalidConfiguration("settings refused".into()));
            }
            Ok(())
        }

        fn render(
            &mut self,
            _ctx: &RenderCtx<'_>,
            _target: &mut RenderTarget<'_>,
            _time: &FrameTime,
        ) -> Result<(), RenderError> {
            self.push("render");
            Ok(())
        }

        fn teardown(&mut self) {
            self.push("teardown");
        }
    }

    impl Drop for Recorder {
        fn drop(&mut self) {
            self.push("drop");
        }
    }

    fn events(log: &Log) -> Vec<String> {
        log.borrow_mut().drain(..).collect()
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn starts_idle() {
        let o = FrameOrchestrator::new(RenderSettings::default());
        assert_eq!(o.state(), OrchestratorState::Idle);
        assert_eq!(o.renderer_name(), None);
        assert_eq!(o.frames_rendered(), 0);
    }

    #[test]
    fn retire_tears_down_then_drops() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut o = FrameOrchestrator::new(RenderSettings::default());
        o.renderer = Some(Recorder::boxed("a", &log));
        assert_eq!(o.state(), OrchestratorState::Running);
        assert_eq!(o.renderer_name(), Some("a"));

        o.retire();
        assert_eq!(o.state(), OrchestratorState::Idle);
        assert_eq!(events(&log), ["a:teardown", "a:drop"]);
    }

    #[test]
    fn retire_when_idle_is_a_no_op() {
        let mut o = FrameOrchestrator::new(RenderSettings::default());
        o.retire();
        assert_eq!(o.state(), OrchestratorState::Idle);
    }

    #[test]
    fn queued_swap_waits_for_the_boundary() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut o = FrameOrchestrator::new(RenderSettings::default());
        o.request_swap(Recorder::boxed("a", &log));
        assert_eq!(o.state(), OrchestratorState::Idle);
        assert!(log.borrow().is_empty());
    }

    // ── frame boundary ────────────────────────────────────────────────────

    #[test]
    fn first_size_is_not_a_resize() {
        let mut b = FrameBoundary::default();
        assert!(!b.observe_size((800, 600)));
        assert!(!b.observe_size((800, 600)));
        assert!(b.observe_size((1024, 768)));
        assert!(!b.observe_size((1024, 768)));
    }

    #[test]
    fn reset_size_suppresses_the_next_resize() {
        let mut b = FrameBoundary::default();
        b.observe_size((800, 600));
        b.reset_size((1600, 1200));
        assert!(!b.observe_size((1600, 1200)));
    }

    #[test]
    fn latest_settings_request_wins() {
        let mut b = FrameBoundary::default();
        let base = RenderSettings::default();
        b.request_settings(base.with_num_lights(10));
        b.request_settings(base.with_mode(CompositionMode::GBuffersView));
        let s = b.take_settings().unwrap();
        assert_eq!(s.mode, CompositionMode::GBuffersView);
        assert_eq!(s.num_lights, 128);
        assert!(b.take_settings().is_none());
    }

    #[test]
    fn frame_limit() {
        let mut b = FrameBoundary::default();
        assert!(!b.limit_reached());

        b.set_frame_limit(Some(2));
        b.count_frame();
        assert!(!b.limit_reached());
        b.count_frame();
        assert!(b.limit_reached());
        assert_eq!(b.frames(), 2);

        b.set_frame_limit(None);
        assert!(!b.limit_reached());
    }

    #[test]
    fn zero_frame_limit_renders_nothing() {
        let mut b = FrameBoundary::default();
        b.set_frame_limit(Some(0));
        assert!(b.limit_reached());
    }

    // ── on a device ───────────────────────────────────────────────────────

    use crate::render::testing::TestGpu;

    fn tick(o: &mut FrameOrchestrator, gpu: &TestGpu, size: (u32, u32)) -> FrameOutcome {
        let time = FrameTime::from_parts(1.0 / 60.0, 0.0, o.frames_rendered());
        let input = InputState::default();
        gpu.frame(size, |ctx, target| o.tick(ctx, target, &time, &input))
            .unwrap()
    }

    #[test]
    fn swap_retires_the_old_renderer_before_init() {
        let gpu = TestGpu::new();
        let log = Log::default();
        let mut o = FrameOrchestrator::new(RenderSettings::default());

        o.swap(&gpu.ctx((800, 600)), Recorder::boxed("a", &log)).unwrap();
        assert_eq!(events(&log), ["a:init", "a:settings 128"]);

        o.swap(&gpu.ctx((800, 600)), Recorder::boxed("b", &log)).unwrap();
        assert_eq!(
            events(&log),
            ["a:teardown", "a:drop", "b:init", "b:settings 128"]
        );
        assert_eq!(o.renderer_name(), Some("b"));
    }

    #[test]
    fn failed_init_leaves_the_orchestrator_idle() {
        let gpu = TestGpu::new();
        let log = Log::default();
        let mut o = FrameOrchestrator::new(RenderSettings::default());
        o.swap(&gpu.ctx((800, 600)), Recorder::boxed("a", &log)).unwrap();
        events(&log);

        let mut broken = Recorder::boxed("b", &log);
        broken.fail_init = true;
        let err = o.swap(&gpu.ctx((800, 600)), broken).unwrap_err();

        assert!(matches!(err, RenderError::InvalidConfiguration(_)));
        assert_eq!(o.state(), OrchestratorState::Idle);
        assert_eq!(events(&log), ["a:teardown", "a:drop", "b:init", "b:drop"]);
        assert_eq!(tick(&mut o, &gpu, (800, 600)), FrameOutcome::Idle);
    }

    #[test]
    fn rejected_settings_tear_down_the_new_renderer() {
        let gpu = TestGpu::new();
        let log = Log::default();
        let mut o = FrameOrchestrator::new(RenderSettings::default());

        let mut picky = Recorder::boxed("a", &log);
        picky.fail_settings = true;
        assert!(o.swap(&gpu.ctx((800, 600)), picky).is_err());

        assert_eq!(o.state(), OrchestratorState::Idle);
        assert_eq!(
            events(&log),
            ["a:init", "a:settings 128", "a:teardown", "a:drop"]
        );
    }

    #[test]
    fn settings_apply_at_the_next_tick() {
        let gpu = TestGpu::new();
        let log = Log::default();
        let mut o = FrameOrchestrator::new(RenderSettings::default());
        o.swap(&gpu.ctx((800, 600)), Recorder::boxed("a", &log)).unwrap();
        events(&log);

        o.request_settings(RenderSettings::default().with_num_lights(10));
        o.request_settings(RenderSettings::default().with_num_lights(20));
        assert!(log.borrow().is_empty());
        assert_eq!(o.settings().num_lights, 128);

        assert_eq!(tick(&mut o, &gpu, (800, 600)), FrameOutcome::Rendered);
        assert_eq!(events(&log), ["a:settings 20", "a:render"]);
        assert_eq!(o.settings().num_lights, 20);

        o.request_settings(RenderSettings::default().with_num_lights(20));
        tick(&mut o, &gpu, (800, 600));
        assert_eq!(events(&log), ["a:render"]);
    }

    #[test]
    fn resize_fires_once_per_size_change() {
        let gpu = TestGpu::new();
        let log = Log::default();
        let mut o = FrameOrchestrator::new(RenderSettings::default());
        o.swap(&gpu.ctx((800, 600)), Recorder::boxed("a", &log)).unwrap();
        events(&log);

        tick(&mut o, &gpu, (800, 600));
        assert_eq!(events(&log), ["a:render"]);

        tick(&mut o, &gpu, (1024, 768));
        assert_eq!(events(&log), ["a:resize 1024x768", "a:render"]);

        tick(&mut o, &gpu, (1024, 768));
        assert_eq!(events(&log), ["a:render"]);
    }

    #[test]
    fn ticks_stop_at_the_frame_limit() {
        let gpu = TestGpu::new();
        let log = Log::default();
        let mut o = FrameOrchestrator::new(RenderSettings::default());
        o.set_frame_limit(Some(2));
        o.swap(&gpu.ctx((800, 600)), Recorder::boxed("a", &log)).unwrap();
        events(&log);

        assert_eq!(tick(&mut o, &gpu, (800, 600)), FrameOutcome::Rendered);
        assert_eq!(tick(&mut o, &gpu, (800, 600)), FrameOutcome::Rendered);
        assert_eq!(tick(&mut o, &gpu, (800, 600)), FrameOutcome::LimitReached);
        assert_eq!(o.frames_rendered(), 2);
        assert_eq!(events(&log), ["a:render", "a:render"]);
    }

    #[test]
    fn idle_tick_keeps_settings_for_the_next_renderer() {
        let gpu = TestGpu::new();
        let log = Log::default();
        let mut o = FrameOrchestrator::new(RenderSettings::default());

        o.request_settings(RenderSettings::default().with_num_lights(42));
        assert_eq!(tick(&mut o, &gpu, (800, 600)), FrameOutcome::Idle);
        assert_eq!(o.frames_rendered(), 0);

        o.request_swap(Recorder::boxed("a", &log));
        assert_eq!(tick(&mut o, &gpu, (800, 600)), FrameOutcome::Rendered);
        assert_eq!(events(&log), ["a:init", "a:settings 42", "a:render"]);
    }
}
