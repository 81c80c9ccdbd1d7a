use std::fmt;
use std::str::FromStr;

use super::lights::MAX_LIGHTS;

/// What the composition pass writes to the surface.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum CompositionMode {
    /// Deferred lighting over the G-buffer.
    #[default]
    Rendering,
    /// Depth, normal and albedo side by side.
    GBuffersView,
}

impl CompositionMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Rendering => Self::GBuffersView,
            Self::GBuffersView => Self::Rendering,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rendering => "rendering",
            Self::GBuffersView => "gbuffers",
        }
    }
}

impl fmt::Display for CompositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompositionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rendering" | "render" => Ok(Self::Rendering),
            "gbuffers" | "gbuffers-view" | "debug" => Ok(Self::GBuffersView),
            other => Err(format!("unknown composition mode `{other}`")),
        }
    }
}

/// Runtime-adjustable settings, owned by the orchestrator.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RenderSettings {
    pub mode: CompositionMode,
    pub num_lights: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            mode: CompositionMode::Rendering,
            num_lights: 128,
        }
    }
}

impl RenderSettings {
    /// Returns a copy with `num_lights` clamped to `[1, MAX_LIGHTS]`.
    pub fn with_num_lights(self, num_lights: i64) -> Self {
        Self {
            num_lights: num_lights.clamp(1, MAX_LIGHTS as i64) as u32,
            ..self
        }
    }

    pub fn with_mode(self, mode: CompositionMode) -> Self {
        Self { mode, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = RenderSettings::default();
        assert_eq!(s.mode, CompositionMode::Rendering);
        assert_eq!(s.num_lights, 128);
    }

    #[test]
    fn light_count_is_clamped() {
        let s = RenderSettings::default();
        assert_eq!(s.with_num_lights(0).num_lights, 1);
        assert_eq!(s.with_num_lights(-20).num_lights, 1);
        assert_eq!(s.with_num_lights(500).num_lights, 500);
        assert_eq!(s.with_num_lights(5000).num_lights, MAX_LIGHTS);
    }

    #[test]
    fn toggling_twice_is_identity() {
        let m = CompositionMode::Rendering;
        assert_eq!(m.toggled(), CompositionMode::GBuffersView);
        assert_eq!(m.toggled().toggled(), m);
    }

    #[test]
    fn mode_parses_from_str() {
        assert_eq!("gbuffers".parse(), Ok(CompositionMode::GBuffersView));
        assert_eq!("Rendering".parse(), Ok(CompositionMode::Rendering));
        assert!("wireframe".parse::<CompositionMode>().is_err());
        assert_eq!(CompositionMode::GBuffersView.to_string(), "gbuffers");
    }
}
