#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Arm Physics
//!
//! Planar geometry for the pick-and-place arm.
//!
//! This crate is the pure-math layer underneath the task environment. It knows
//! nothing about scoring or episodes; it only answers two questions: where is
//! the end-effector for a given pose, and how close is it to a point of
//! interest.
//!
//! ## Key Components
//!
//! -   **Kinematics:** [`TwoLinkArm`] in the [`kinematics`] module owns an
//!     [`ArmPose`] and maps joint-angle deltas to an updated end-effector
//!     position.
//! -   **Proximity:** [`ProximityBands`] in the [`proximity`] module turns a
//!     distance into one of five ordered [`Band`]s, with contact taking
//!     precedence over the distance bands.
//!
//! ## Usage
//!
//! ```rust
//! use physics::{ArmConfig, Band, ProximityBands, TwoLinkArm, Vec2};
//!
//! let mut arm = TwoLinkArm::new(ArmConfig::default());
//! arm.apply_delta(5.0, 0.0);
//! let tip = arm.end_effector();
//!
//! let bands = ProximityBands::default();
//! assert_eq!(bands.classify(tip, Vec2::new(600.0, 300.0)).band, Band::Contact);
//! assert_eq!(bands.classify(tip, Vec2::new(700.0, 300.0)).band, Band::OutOfRange);
//! ```

pub mod kinematics;
pub mod proximity;
pub mod types;

pub use kinematics::{ArmConfig, TwoLinkArm};
pub use proximity::{Band, Proximity, ProximityBands};
pub use types::{ArmPose, Vec2};
