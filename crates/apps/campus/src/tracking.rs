use foundation::geo::LonLat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Other(String),
}

impl std::fmt::Display for GeolocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeolocationError::PermissionDenied => write!(f, "location permission denied"),
            GeolocationError::PositionUnavailable => write!(f, "location unavailable"),
            GeolocationError::Timeout => write!(f, "location request timed out"),
            GeolocationError::Other(msg) => write!(f, "location error: {msg}"),
        }
    }
}

impl std::error::Error for GeolocationError {}

/// What the caller should do with a position update.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FixOutcome {
    /// Not tracking; the update is stale.
    Ignored,
    /// First fix of this watch: place the marker and fly to it.
    First(LonLat),
    Moved(LonLat),
}

/// State of the "track my location" toggle.
#[derive(Debug, Default, Clone)]
pub struct LocationTracker {
    watching: bool,
    last_fix: Option<LonLat>,
}

impl LocationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_watching(&self) -> bool {
        self.watching
    }

    pub fn last_fix(&self) -> Option<LonLat> {
        self.last_fix
    }

    /// Flips the watch. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        if self.watching {
            self.reset();
        } else {
            self.watching = true;
        }
        self.watching
    }

    pub fn reset(&mut self) {
        self.watching = false;
        self.last_fix = None;
    }

    pub fn on_fix(&mut self, position: LonLat) -> FixOutcome {
        if !self.watching {
            return FixOutcome::Ignored;
        }
        let first = self.last_fix.is_none();
        self.last_fix = Some(position);
        if first {
            FixOutcome::First(position)
        } else {
            FixOutcome::Moved(position)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FixOutcome, LocationTracker};
    use foundation::geo::LonLat;

    #[test]
    fn first_fix_then_moves() {
        let mut t = LocationTracker::new();
        let p = LonLat::new(-116.99, 32.81).unwrap();
        assert_eq!(t.on_fix(p), FixOutcome::Ignored);
        assert!(t.toggle());
        assert_eq!(t.on_fix(p), FixOutcome::First(p));
        assert_eq!(t.on_fix(p), FixOutcome::Moved(p));
        assert!(!t.toggle());
        assert_eq!(t.last_fix(), None);
    }
}
