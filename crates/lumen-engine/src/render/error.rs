use thiserror::Error;

/// Errors surfaced by renderers and the GPU layer.
///
/// Capability and uninitialized-resource errors are programming or platform
/// failures: callers log them and stop, they are never retried.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No adapter, device or drawable surface could be acquired.
    #[error("graphics capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// `render` ran before `init_pipeline` produced the named object.
    #[error("renderer resource `{resource}` is not initialized (call init_pipeline first)")]
    UninitializedResource { resource: &'static str },

    /// Input that violates a documented range or shape.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The presentable surface image could not be acquired.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

impl RenderError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

/// Borrows an initialized resource slot or reports which one is missing.
pub(crate) fn require<'a, T>(
    slot: &'a Option<T>,
    resource: &'static str,
) -> Result<&'a T, RenderError> {
    slot.as_ref()
        .ok_or(RenderError::UninitializedResource { resource })
}
