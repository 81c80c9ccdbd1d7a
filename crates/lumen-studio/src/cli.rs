use clap::{Parser, ValueEnum};

use lumen_engine::core::Renderer;
use lumen_engine::render::{
    CameraControlledCube, CompositionMode, DeferredConfig, DeferredRenderer, RenderSettings,
    RotatingCube, TriangleDemo,
};

#[derive(Parser, Debug)]
#[command(
    name = "lumen-studio",
    author,
    version,
    about = "Deferred shading playground"
)]
pub struct Cli {
    /// Renderer to start with.
    #[arg(long, value_enum, default_value_t = RendererKind::Deferred)]
    pub renderer: RendererKind,

    /// Active point lights (clamped to 1..=1024).
    #[arg(long, value_name = "COUNT", default_value_t = 128, allow_negative_numbers = true)]
    pub lights: i64,

    /// Composition mode: `rendering` or `gbuffers`.
    #[arg(long, value_name = "MODE", default_value_t = CompositionMode::Rendering)]
    pub mode: CompositionMode,

    /// Exit after this many rendered frames.
    #[arg(long, value_name = "COUNT")]
    pub frames: Option<u64>,

    /// Initial window width in logical pixels.
    #[arg(long, default_value_t = 1280.0)]
    pub width: f64,

    /// Initial window height in logical pixels.
    #[arg(long, default_value_t = 720.0)]
    pub height: f64,

    /// Seed for light placement; random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log filter in `env_logger` syntax; falls back to `RUST_LOG`.
    #[arg(long, env = "LUMEN_LOG", value_name = "FILTER")]
    pub log: Option<String>,
}

impl Cli {
    pub fn settings(&self) -> RenderSettings {
        RenderSettings::default()
            .with_mode(self.mode)
            .with_num_lights(self.lights)
    }
}

/// Renderer variants selectable from the command line and the number keys.
#[derive(ValueEnum, Debug, Copy, Clone, Eq, PartialEq)]
pub enum RendererKind {
    Triangle,
    RotatingCube,
    CameraCube,
    Deferred,
}

impl RendererKind {
    pub const ALL: [RendererKind; 4] = [
        RendererKind::Triangle,
        RendererKind::RotatingCube,
        RendererKind::CameraCube,
        RendererKind::Deferred,
    ];

    /// Maps the `1`..`4` keys onto variants.
    pub fn from_slot(slot: u8) -> Option<Self> {
        let index = usize::from(slot).checked_sub(1)?;
        Self::ALL.get(index).copied()
    }

    pub fn build(self, settings: RenderSettings, seed: Option<u64>) -> Box<dyn Renderer> {
        match self {
            RendererKind::Triangle => Box::new(TriangleDemo::new()),
            RendererKind::RotatingCube => Box::new(RotatingCube::new()),
            RendererKind::CameraCube => Box::new(CameraControlledCube::new()),
            RendererKind::Deferred => Box::new(DeferredRenderer::new(
                DeferredConfig {
                    seed,
                    ..DeferredConfig::default()
                },
                settings,
            )),
        }
    }
}
