/// Read-only view of the renderer's tile refinement state.
pub trait QualityProbe {
    /// Largest current screen-space error over all attached tilesets.
    ///
    /// `None` when no tileset is attached.
    fn screen_space_error(&self) -> Option<f64>;
}

/// Quality is reached when every attached tileset is at or below `target`.
pub fn quality_ready(probe: &dyn QualityProbe, target: f64) -> bool {
    match probe.screen_space_error() {
        None => true,
        Some(err) => err <= target,
    }
}

/// Fixed reading, for tests and headless runs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FixedQuality(pub Option<f64>);

impl QualityProbe for FixedQuality {
    fn screen_space_error(&self) -> Option<f64> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::{FixedQuality, quality_ready};

    #[test]
    fn ready_when_at_or_below_target_or_no_tilesets() {
        assert!(quality_ready(&FixedQuality(None), 2.0));
        assert!(quality_ready(&FixedQuality(Some(2.0)), 2.0));
        assert!(!quality_ready(&FixedQuality(Some(2.1)), 2.0));
    }
}
