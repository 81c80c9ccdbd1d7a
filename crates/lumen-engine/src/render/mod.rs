//! GPU rendering subsystem.
//!
//! Renderers own their GPU resources (pipelines, buffers, targets) and record
//! into the frame encoder handed to them; the orchestrator submits.
//!
//! Convention:
//! - World space is right-handed, +Y up.
//! - Surface-sized resources use physical pixels.

pub mod camera;
pub mod composition;
mod ctx;
pub mod deferred;
pub mod demos;
mod error;
pub mod gbuffer;
pub mod geometry;
pub mod light_update;
pub mod lights;
pub mod mesh;
mod settings;
pub mod uniforms;

#[cfg(test)]
pub(crate) mod testing;

pub use ctx::{RenderCtx, RenderTarget};
pub use deferred::{DeferredConfig, DeferredRenderer, FramePlan, FrameStep};
pub use demos::{CameraControlledCube, RotatingCube, TriangleDemo};
pub use error::RenderError;
pub use settings::{CompositionMode, RenderSettings};
