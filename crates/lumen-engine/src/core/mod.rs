//! Core engine-facing contracts.
//!
//! This module defines the stable interface between the runtime (platform loop)
//! and higher layers (studio, tools): the per-frame context, the `Renderer`
//! contract, and the orchestrator that drives one renderer at a time.

mod app;
mod ctx;
mod orchestrator;
mod renderer;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
pub use orchestrator::{FrameBoundary, FrameOrchestrator, FrameOutcome, OrchestratorState};
pub use renderer::Renderer;
