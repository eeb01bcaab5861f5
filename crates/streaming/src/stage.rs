use serde::Serialize;

/// Render detail level; each maps to a maximum screen-space error.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Detail {
    Low,
    Medium,
    Final,
}

/// Loading stages, in the only order they are entered.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase", tag = "stage", content = "detail")]
pub enum Stage {
    Idle,
    BasicMapLoading,
    BuildingsLoading(Detail),
    DataLoading,
    HighQualityWait,
    Ready,
}

impl Stage {
    /// Position in the stage order; detail changes share one rank.
    pub fn rank(self) -> u8 {
        match self {
            Stage::Idle => 0,
            Stage::BasicMapLoading => 1,
            Stage::BuildingsLoading(_) => 2,
            Stage::DataLoading => 3,
            Stage::HighQualityWait => 4,
            Stage::Ready => 5,
        }
    }

    /// Progress percentage at stage entry.
    pub fn base_percent(self) -> f64 {
        match self {
            Stage::Idle => 0.0,
            Stage::BasicMapLoading => 10.0,
            Stage::BuildingsLoading(Detail::Low) => 20.0,
            Stage::BuildingsLoading(Detail::Medium) => 30.0,
            Stage::BuildingsLoading(Detail::Final) => 40.0,
            Stage::DataLoading => 50.0,
            Stage::HighQualityWait => 98.0,
            Stage::Ready => 100.0,
        }
    }

    /// Text shown on the loading overlay.
    pub fn message(self) -> &'static str {
        match self {
            Stage::Idle => "Starting",
            Stage::BasicMapLoading => "Loading basic map",
            Stage::BuildingsLoading(Detail::Low) => "Loading buildings (low detail)",
            Stage::BuildingsLoading(Detail::Medium) => "Loading buildings (medium detail)",
            Stage::BuildingsLoading(Detail::Final) => "Loading buildings",
            Stage::DataLoading => "Loading campus data",
            Stage::HighQualityWait => "Refining detail",
            Stage::Ready => "Ready",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::{Detail, Stage};

    #[test]
    fn base_percent_is_monotonic_in_stage_order() {
        let order = [
            Stage::Idle,
            Stage::BasicMapLoading,
            Stage::BuildingsLoading(Detail::Low),
            Stage::BuildingsLoading(Detail::Medium),
            Stage::BuildingsLoading(Detail::Final),
            Stage::DataLoading,
            Stage::HighQualityWait,
            Stage::Ready,
        ];
        for w in order.windows(2) {
            assert!(w[0].base_percent() < w[1].base_percent());
            assert!(w[0].rank() <= w[1].rank());
        }
    }
}
