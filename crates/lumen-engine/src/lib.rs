//! Lumen engine crate.
//!
//! Platform runtime, GPU device and the deferred renderer with its demo techniques.
//! Higher layers (the studio) implement `core::App` and drive a `core::FrameOrchestrator`.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod render;
