//! Reward shaping as an ordered rule list.
//!
//! Each step is scored by exactly one rule: the first whose predicate holds.
//! Rules never sum. The predicates only read a [`StepContext`]; the numbers
//! they produce come from a [`MagnitudeTable`] so that difficulty profiles
//! differ in data, not in code.

use crate::task::TaskState;
use physics::{Band, Proximity};
use serde::{Deserialize, Serialize};

/// Identifier of a reward rule, in evaluation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleId {
    PickSuccess,
    WrongObjectContact,
    PlaceSuccess,
    PlaceFailure,
    InvalidTransition,
    MissedGrasp,
    ApproachTarget,
    DriftToDestination,
    ApproachDestination,
    DriftToTarget,
    DistanceFallback,
}

impl RuleId {
    /// Whether this rule marks a qualifying event for the stagnation timer.
    #[must_use]
    pub const fn is_progress(self) -> bool {
        matches!(self, RuleId::PickSuccess | RuleId::PlaceSuccess)
    }
}

/// Reward per proximity band. `OutOfRange` is always worth zero.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BandMagnitudes {
    pub contact: f64,
    pub very_near: f64,
    pub near: f64,
    pub far: f64,
}

impl BandMagnitudes {
    pub const ZERO: Self = Self { contact: 0.0, very_near: 0.0, near: 0.0, far: 0.0 };

    #[must_use]
    pub const fn get(&self, band: Band) -> f64 {
        match band {
            Band::Contact => self.contact,
            Band::VeryNear => self.very_near,
            Band::Near => self.near,
            Band::Far => self.far,
            Band::OutOfRange => 0.0,
        }
    }
}

/// Signed reward values, one entry (or band row) per rule.
///
/// Penalties are stored as negative numbers so the table reads as the reward
/// actually handed to the agent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagnitudeTable {
    pub pick_success: f64,
    pub wrong_object_contact: f64,
    pub place_success: f64,
    pub place_failure: f64,
    pub invalid_transition: f64,
    pub missed_grasp: f64,
    pub approach_target: BandMagnitudes,
    pub drift_to_destination: BandMagnitudes,
    pub approach_destination: BandMagnitudes,
    pub drift_to_target: BandMagnitudes,
    /// Weight on the distance to the goal that matters right now.
    pub fallback_relevant_weight: f64,
    /// Weight on the distance to the other object.
    pub fallback_irrelevant_weight: f64,
    /// Added to the score each time the stagnation timer expires.
    pub stagnation_penalty: f64,
    /// Added once when stagnation ends the episode.
    pub exhaustion_penalty: f64,
}

impl Default for MagnitudeTable {
    fn default() -> Self {
        crate::config::Profile::Shaped.config().magnitudes
    }
}

impl MagnitudeTable {
    /// Fixed reward of `rule`; band rules are looked up at `band`.
    /// The distance fallback is not a table entry and yields zero here.
    #[must_use]
    pub const fn get(&self, rule: RuleId, band: Band) -> f64 {
        match rule {
            RuleId::PickSuccess => self.pick_success,
            RuleId::WrongObjectContact => self.wrong_object_contact,
            RuleId::PlaceSuccess => self.place_success,
            RuleId::PlaceFailure => self.place_failure,
            RuleId::InvalidTransition => self.invalid_transition,
            RuleId::MissedGrasp => self.missed_grasp,
            RuleId::ApproachTarget => self.approach_target.get(band),
            RuleId::DriftToDestination => self.drift_to_destination.get(band),
            RuleId::ApproachDestination => self.approach_destination.get(band),
            RuleId::DriftToTarget => self.drift_to_target.get(band),
            RuleId::DistanceFallback => 0.0,
        }
    }
}

/// Everything a rule predicate may look at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepContext {
    pub state: TaskState,
    pub target: Proximity,
    pub destination: Proximity,
    /// A pick was triggered this step (explicitly, or implicitly by contact).
    pub pick_attempted: bool,
    /// A place was triggered this step.
    pub place_attempted: bool,
}

impl StepContext {
    fn idle(&self) -> bool {
        self.state == TaskState::Idle
    }

    fn holding(&self) -> bool {
        self.state == TaskState::Holding
    }
}

type Predicate = fn(&StepContext) -> bool;

/// The cascade, highest priority first.
pub const RULES: [(RuleId, Predicate); 11] = [
    (RuleId::PickSuccess, |c| c.target.band.is_contact() && c.pick_attempted && c.idle()),
    (RuleId::WrongObjectContact, |c| c.target.band.is_contact() && c.pick_attempted && !c.idle()),
    (RuleId::PlaceSuccess, |c| c.destination.band.is_contact() && c.place_attempted && c.holding()),
    (RuleId::PlaceFailure, |c| c.destination.band.is_contact() && c.place_attempted && !c.holding()),
    (RuleId::InvalidTransition, |c| (c.pick_attempted && !c.idle()) || (c.place_attempted && !c.holding())),
    (RuleId::MissedGrasp, |c| c.pick_attempted || c.place_attempted),
    (RuleId::ApproachTarget, |c| c.idle() && c.target.band != Band::OutOfRange),
    (RuleId::DriftToDestination, |c| c.idle() && c.destination.band != Band::OutOfRange),
    (RuleId::ApproachDestination, |c| c.holding() && c.destination.band != Band::OutOfRange),
    (RuleId::DriftToTarget, |c| c.holding() && c.target.band != Band::OutOfRange),
    (RuleId::DistanceFallback, |_| true),
];

/// Reward chosen for one step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shaped {
    pub rule: RuleId,
    pub reward: f64,
}

#[derive(Clone, Debug)]
pub struct RewardShaper {
    table: MagnitudeTable,
}

impl RewardShaper {
    #[must_use]
    pub fn new(table: MagnitudeTable) -> Self {
        Self { table }
    }

    #[must_use]
    pub fn table(&self) -> &MagnitudeTable {
        &self.table
    }

    /// First rule whose predicate holds. Always returns a rule because the
    /// fallback matches everything.
    #[must_use]
    pub fn select(ctx: &StepContext) -> RuleId {
        RULES
            .iter()
            .find(|(_, predicate)| predicate(ctx))
            .map_or(RuleId::DistanceFallback, |(rule, _)| *rule)
    }

    /// Score one step.
    #[must_use]
    pub fn evaluate(&self, ctx: &StepContext) -> Shaped {
        let rule = Self::select(ctx);
        let reward = match rule {
            RuleId::ApproachTarget | RuleId::DriftToTarget => self.table.get(rule, ctx.target.band),
            RuleId::ApproachDestination | RuleId::DriftToDestination => {
                self.table.get(rule, ctx.destination.band)
            }
            RuleId::DistanceFallback => self.fallback(ctx),
            _ => self.table.get(rule, Band::OutOfRange),
        };
        Shaped { rule, reward }
    }

    fn fallback(&self, ctx: &StepContext) -> f64 {
        let (relevant, irrelevant) = if ctx.idle() {
            (ctx.target.distance, ctx.destination.distance)
        } else {
            (ctx.destination.distance, ctx.target.distance)
        };
        -(self.table.fallback_relevant_weight * relevant + self.table.fallback_irrelevant_weight * irrelevant)
    }
}
