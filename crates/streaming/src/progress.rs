use serde::Serialize;

use crate::stage::Stage;

/// What the loading overlay shows. Percent never decreases within a session.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct LoadProgress {
    pub stage: Stage,
    pub percent: f64,
}

impl Default for LoadProgress {
    fn default() -> Self {
        Self {
            stage: Stage::Idle,
            percent: 0.0,
        }
    }
}

impl LoadProgress {
    /// Records `stage` and raises the percentage to at least `percent`.
    pub fn advance(&mut self, stage: Stage, percent: f64) {
        self.stage = stage;
        let percent = if percent.is_finite() { percent } else { 0.0 };
        self.percent = self.percent.max(percent.clamp(0.0, 100.0));
    }
}
