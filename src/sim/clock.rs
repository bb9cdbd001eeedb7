//! Frame clock: wall-clock timestamps to a bounded simulation step

use crate::consts::MAX_DT;

/// Converts animation-frame timestamps (ms) into a clamped `dt` (s)
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last_ms: None }
    }

    /// Forget the previous timestamp; the next frame reports zero elapsed time
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    /// Advance to `now_ms` and return the step in seconds, in `[0, MAX_DT]`
    pub fn step(&mut self, now_ms: f64) -> f64 {
        if !now_ms.is_finite() {
            return 0.0;
        }
        let Some(last) = self.last_ms.replace(now_ms) else {
            return 0.0;
        };

        let dt = (now_ms - last) / 1000.0;
        if dt.is_finite() { dt.clamp(0.0, MAX_DT) } else { 0.0 }
    }
}
