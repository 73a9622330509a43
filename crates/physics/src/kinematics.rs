//! Two-link planar arm
//!
//! Forward kinematics for the arm used by the pick-and-place task. The arm is
//! anchored at a fixed base; both joint angles are absolute headings measured
//! counter-clockwise from +x, so the second link does not inherit the first
//! link's heading.

use crate::types::{ArmPose, Vec2};
use serde::{Deserialize, Serialize};

/// Geometry of the arm
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmConfig {
    /// Fixed anchor point of the first joint (screen space)
    pub base: Vec2,
    /// Length of the first link
    pub link1: f64,
    /// Length of the second link
    pub link2: f64,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            base: Vec2::new(400.0, 300.0), // centre of an 800x600 board
            link1: 100.0,
            link2: 100.0,
        }
    }
}

impl ArmConfig {
    /// Largest distance from the base the end-effector can reach.
    #[must_use]
    pub fn reach(&self) -> f64 {
        self.link1 + self.link2
    }
}

/// The arm entity: fixed geometry plus a mutable pose.
#[derive(Clone, Debug)]
pub struct TwoLinkArm {
    pub config: ArmConfig,
    pose: ArmPose,
}

impl TwoLinkArm {
    #[must_use]
    pub fn new(config: ArmConfig) -> Self {
        Self { config, pose: ArmPose::default() }
    }

    #[must_use]
    pub fn pose(&self) -> ArmPose {
        self.pose
    }

    /// Rotate both joints by the given deltas in degrees. Never fails.
    pub fn apply_delta(&mut self, d1: f64, d2: f64) {
        self.pose.angle1 += d1;
        self.pose.angle2 += d2;
    }

    /// Return to the zero pose.
    pub fn reset(&mut self) {
        self.pose = ArmPose::default();
    }

    /// End of the first link.
    #[must_use]
    pub fn elbow(&self) -> Vec2 {
        self.config.base + Vec2::polar_screen(self.config.link1, self.pose.angle1)
    }

    /// Tip of the second link.
    #[must_use]
    pub fn end_effector(&self) -> Vec2 {
        self.end_effector_at(self.pose)
    }

    /// Tip position the arm would have at `pose`, without moving it.
    #[must_use]
    pub fn end_effector_at(&self, pose: ArmPose) -> Vec2 {
        self.config.base
            + Vec2::polar_screen(self.config.link1, pose.angle1)
            + Vec2::polar_screen(self.config.link2, pose.angle2)
    }
}
