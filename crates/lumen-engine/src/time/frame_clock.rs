use std::time::{Duration, Instant};

/// Timing for one frame.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,

    /// Seconds since the clock was created. Not clamped; drives orbit and demo animation.
    pub elapsed: f32,

    pub now: Instant,

    /// Zero on the first tick.
    pub frame_index: u64,
}

impl FrameTime {
    /// Builds a snapshot from explicit values, stamped with the current instant.
    ///
    /// Used for fixed-step replays and tests; live frames come from [`FrameClock::tick`].
    pub fn from_parts(dt: f32, elapsed: f32, frame_index: u64) -> Self {
        Self {
            dt,
            elapsed,
            now: Instant::now(),
            frame_index,
        }
    }
}

const DEFAULT_DT_MIN: Duration = Duration::from_micros(100);
const DEFAULT_DT_MAX: Duration = Duration::from_millis(250);

/// Per-window clock. Each window ticks its own so delta times are never shared.
///
/// `dt` is clamped: a debugger pause or a minimized window must not launch the lights
/// across the whole volume on the next frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
    dt_range: (Duration, Duration),
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(DEFAULT_DT_MIN, DEFAULT_DT_MAX)
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_index: 0,
            dt_range: (dt_min, dt_max),
        }
    }

    /// Advances the clock by one frame.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let (lo, hi) = self.dt_range;
        let dt = now.saturating_duration_since(self.last).clamp(lo, hi);
        self.last = now;

        let index = self.frame_index;
        self.frame_index = self.frame_index.wrapping_add(1);

        FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
            now,
            frame_index: index,
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
