//! Lumen studio: opens a window and drives one renderer at a time.
//!
//! Keys: `Tab` composition mode, `↑/↓` light count (`Shift` for steps of 64),
//! `1`-`4` renderer, `Esc` quit.

mod cli;
mod control_panel;

use anyhow::{Context, Result};
use clap::Parser;
use winit::dpi::LogicalSize;

use lumen_engine::core::{App, AppControl, FrameCtx, FrameOrchestrator, FrameOutcome};
use lumen_engine::device::GpuInit;
use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::window::{Runtime, RuntimeConfig};

use cli::{Cli, RendererKind};
use control_panel::PanelAction;

struct Studio {
    orchestrator: FrameOrchestrator,
    initial: Option<RendererKind>,
    seed: Option<u64>,
}

impl Studio {
    fn new(cli: &Cli) -> Self {
        let mut orchestrator = FrameOrchestrator::new(cli.settings());
        orchestrator.set_frame_limit(cli.frames);
        Self {
            orchestrator,
            initial: Some(cli.renderer),
            seed: cli.seed,
        }
    }

    fn apply(&mut self, action: PanelAction) -> AppControl {
        match action {
            PanelAction::Exit => return AppControl::Exit,
            PanelAction::Settings(settings) => self.orchestrator.request_settings(settings),
            PanelAction::Swap(kind) => {
                log::info!("switching to {kind:?}");
                let renderer = kind.build(*self.orchestrator.settings(), self.seed);
                self.orchestrator.request_swap(renderer);
            }
        }
        AppControl::Continue
    }
}

impl App for Studio {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if let Some(kind) = self.initial.take() {
            let renderer = kind.build(*self.orchestrator.settings(), self.seed);
            if let Err(e) = self.orchestrator.swap(&ctx.render_ctx(), renderer) {
                log::error!("cannot start {kind:?} renderer: {e}");
                return AppControl::Exit;
            }
        }

        let actions = control_panel::actions(
            ctx.input_frame,
            ctx.input.modifiers,
            *self.orchestrator.settings(),
        );
        for action in actions {
            if self.apply(action) == AppControl::Exit {
                return AppControl::Exit;
            }
        }

        let time = ctx.time;
        let input = ctx.input;
        let orchestrator = &mut self.orchestrator;
        let control = ctx.render(|rctx, target| {
            match orchestrator.tick(rctx, target, &time, input) {
                Ok(FrameOutcome::LimitReached) => {
                    log::info!("frame limit reached after {} frames", orchestrator.frames_rendered());
                    AppControl::Exit
                }
                Ok(_) => AppControl::Continue,
                Err(e) => {
                    log::error!("frame failed: {e}");
                    AppControl::Exit
                }
            }
        });

        ctx.window.set_title(&control_panel::title(&self.orchestrator));
        control
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        env_filter: cli.log.clone(),
        ..LoggingConfig::default()
    });

    let config = RuntimeConfig {
        title: "lumen".to_string(),
        initial_size: LogicalSize::new(cli.width, cli.height),
    };

    log::info!(
        "starting {:?} renderer ({}, {} lights)",
        cli.renderer,
        cli.mode,
        cli.settings().num_lights
    );

    Runtime::run(config, GpuInit::default(), Studio::new(&cli)).context("lumen-studio exited with an error")
}
