//! Frame timing.
//!
//! The runtime owns one [`FrameClock`] per window and hands each frame's
//! [`FrameTime`] to the app; renderers never read the wall clock themselves.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
