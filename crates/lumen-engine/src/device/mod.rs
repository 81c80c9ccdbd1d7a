//! GPU device + surface management.
//!
//! Owns the wgpu device, queue and window surface, and hands out one
//! encoder + surface view per frame.

mod context;
mod init;
mod surface;

pub use context::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
