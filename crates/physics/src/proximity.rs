//! Proximity classification between the end-effector and a task object.
//!
//! Contact is tested first; only then are the distance bands consulted, so a
//! contact radius larger than `far` shadows every distance band.

use crate::types::Vec2;
use serde::{Deserialize, Serialize};

/// Discrete proximity band, ordered from farthest to closest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Band {
    OutOfRange,
    Far,
    Near,
    VeryNear,
    Contact,
}

impl Band {
    /// Higher means closer.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Band::OutOfRange => 0,
            Band::Far => 1,
            Band::Near => 2,
            Band::VeryNear => 3,
            Band::Contact => 4,
        }
    }

    #[must_use]
    pub const fn is_contact(self) -> bool {
        matches!(self, Band::Contact)
    }
}

/// Band thresholds. `contact_radius` is exclusive, the others inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityBands {
    pub contact_radius: f64,
    pub very_near: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for ProximityBands {
    fn default() -> Self {
        Self {
            contact_radius: 20.0,
            very_near: 5.0,
            near: 10.0,
            far: 15.0,
        }
    }
}

impl ProximityBands {
    /// Whether the thresholds give a classification monotone in distance.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.contact_radius >= 0.0
            && self.contact_radius.is_finite()
            && self.very_near >= 0.0
            && self.very_near <= self.near
            && self.near <= self.far
            && self.far.is_finite()
    }

    /// Classify a raw distance.
    #[must_use]
    pub fn classify_distance(&self, distance: f64) -> Band {
        if distance < self.contact_radius {
            Band::Contact
        } else if distance <= self.very_near {
            Band::VeryNear
        } else if distance <= self.near {
            Band::Near
        } else if distance <= self.far {
            Band::Far
        } else {
            Band::OutOfRange
        }
    }

    /// Distance and band of `reference` as seen from `effector`.
    #[must_use]
    pub fn classify(&self, effector: Vec2, reference: Vec2) -> Proximity {
        let distance = effector.distance(reference);
        Proximity { distance, band: self.classify_distance(distance) }
    }
}

/// Result of one classification.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Proximity {
    pub distance: f64,
    pub band: Band,
}
