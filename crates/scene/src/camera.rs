use foundation::geo::LonLat;
use foundation::math::{Ecef, lon_lat_to_ecef};
use serde::{Deserialize, Serialize};

use crate::entity::MapEntity;

/// Altitude of the home view above the campus centre.
pub const HOME_ALTITUDE_M: f64 = 1000.0;
/// Altitude used when flying to a single selected entity.
pub const ENTITY_ALTITUDE_M: f64 = 500.0;
/// Default fly-to animation length.
pub const FLIGHT_DURATION_S: f64 = 2.0;

/// Where the camera should fly to.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDestination {
    pub target: LonLat,
    pub altitude_m: f64,
    /// The same point in renderer coordinates.
    pub ecef: Ecef,
    pub duration_s: f64,
}

impl CameraDestination {
    pub fn new(target: LonLat, altitude_m: f64) -> Self {
        Self {
            target,
            altitude_m,
            ecef: lon_lat_to_ecef(target, altitude_m),
            duration_s: FLIGHT_DURATION_S,
        }
    }

    pub fn home(center: LonLat) -> Self {
        Self::new(center, HOME_ALTITUDE_M)
    }

    pub fn entity(entity: &MapEntity) -> Self {
        Self::new(entity.position, ENTITY_ALTITUDE_M)
    }
}
