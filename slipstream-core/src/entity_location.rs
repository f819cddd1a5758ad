use glam::DVec3;
use serde::{Deserialize, Serialize};

// EntityLocation gets sent from the server to the presentation layer to tell
// it where to place a car == checkpoint reset transforms and starting grid slots
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityLocation {
    pub position: DVec3,
    pub unit_heading: DVec3, // should be a normalized vector
}

impl EntityLocation {
    pub fn new(position: DVec3, unit_heading: DVec3) -> Self {
        EntityLocation {
            position,
            unit_heading,
        }
    }

    // a location at the origin facing along positive x
    pub fn origin() -> Self {
        EntityLocation {
            position: DVec3::ZERO,
            unit_heading: DVec3::X,
        }
    }
}
