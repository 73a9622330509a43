//! Episode bookkeeping: score, stagnation timer and termination.

use crate::config::{PlacePolicy, StagnationConfig, Thresholds};
use crate::reward::{MagnitudeTable, Shaped};
use crate::task::TaskState;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Relative slack when comparing elapsed time against the timer limit, so
/// that a limit which is a whole number of fixed steps expires on that step.
const TIMER_TOLERANCE: f64 = 1e-9;

/// Why an episode ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Score reached the win threshold.
    Win,
    /// Score fell below the loss threshold.
    Loss,
    /// The payload was placed and placing ends the episode.
    Success,
    /// The stagnation timer expired more often than tolerated.
    StagnationExhausted,
}

/// What the controller did with one step's reward.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Total change of score this step, penalties included.
    pub reward: f64,
    pub stagnation_expired: bool,
    /// Stagnation ended the episode; the caller must drop the payload.
    pub exhausted: bool,
    pub termination: Option<TerminationReason>,
}

#[derive(Clone, Debug)]
pub struct EpisodeController {
    stagnation: StagnationConfig,
    thresholds: Thresholds,
    place_policy: PlacePolicy,
    stagnation_penalty: f64,
    exhaustion_penalty: f64,

    score: f64,
    timer_start: Option<f64>,
    stagnation_count: u32,
    running: bool,
    termination: Option<TerminationReason>,
}

impl EpisodeController {
    #[must_use]
    pub fn new(
        stagnation: StagnationConfig,
        thresholds: Thresholds,
        place_policy: PlacePolicy,
        magnitudes: &MagnitudeTable,
    ) -> Self {
        Self {
            stagnation,
            thresholds,
            place_policy,
            stagnation_penalty: magnitudes.stagnation_penalty,
            exhaustion_penalty: magnitudes.exhaustion_penalty,
            score: 0.0,
            timer_start: None,
            stagnation_count: 0,
            running: true,
            termination: None,
        }
    }

    /// Zero the score and counter and stop the timer.
    pub fn reset(&mut self) {
        self.score = 0.0;
        self.timer_start = None;
        self.stagnation_count = 0;
        self.running = true;
        self.termination = None;
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[must_use]
    pub fn stagnation_count(&self) -> u32 {
        self.stagnation_count
    }

    #[must_use]
    pub fn running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn termination(&self) -> Option<TerminationReason> {
        self.termination
    }

    #[must_use]
    pub fn timer_start(&self) -> Option<f64> {
        self.timer_start
    }

    /// Seconds left before the stagnation timer expires, if it is running.
    #[must_use]
    pub fn time_left(&self, now: f64) -> Option<f64> {
        self.timer_start
            .map(|start| (self.stagnation.timer_limit - (now - start)).max(0.0))
    }

    /// Fold one step into the episode.
    ///
    /// `state` is the task state after any transition this step made.
    pub fn record(&mut self, shaped: Shaped, state: TaskState, now: f64) -> Outcome {
        let mut reward = shaped.reward;
        let mut stagnation_expired = false;
        let mut exhausted = false;

        if shaped.rule.is_progress() {
            self.timer_start = None;
        } else if let Some(start) = self.timer_start {
            if self.expired(now - start) {
                reward += self.stagnation_penalty;
                self.timer_start = None;
                self.stagnation_count += 1;
                stagnation_expired = true;
                info!(count = self.stagnation_count, "stagnation timer expired");
                if self.stagnation_count > self.stagnation.max_expiries {
                    reward += self.exhaustion_penalty;
                    self.stagnation_count = 0;
                    exhausted = true;
                }
            }
        }
        if self.timer_start.is_none() {
            self.timer_start = Some(now);
        }

        self.score += reward;

        let termination = self.decide(state, exhausted);
        if let Some(reason) = termination {
            if self.running {
                info!(?reason, score = self.score, "episode terminated");
            }
            self.running = false;
            self.termination = Some(reason);
        }
        debug!(rule = ?shaped.rule, reward, score = self.score, "step recorded");

        Outcome { reward, stagnation_expired, exhausted, termination: self.termination }
    }

    fn expired(&self, elapsed: f64) -> bool {
        let limit = self.stagnation.timer_limit;
        elapsed >= limit - TIMER_TOLERANCE * limit.abs().max(1.0)
    }

    fn decide(&self, state: TaskState, exhausted: bool) -> Option<TerminationReason> {
        if exhausted {
            return Some(TerminationReason::StagnationExhausted);
        }
        if state == TaskState::Placed && self.place_policy == PlacePolicy::EndEpisode {
            return Some(TerminationReason::Success);
        }
        if self.thresholds.win.is_some_and(|win| self.score >= win) {
            return Some(TerminationReason::Win);
        }
        if self.thresholds.loss.is_some_and(|loss| self.score < loss) {
            return Some(TerminationReason::Loss);
        }
        self.termination
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reward::RuleId;

    fn controller(limit: f64) -> EpisodeController {
        let mut table = MagnitudeTable::default();
        table.stagnation_penalty = -5.0;
        table.exhaustion_penalty = -100.0;
        EpisodeController::new(
            StagnationConfig { timer_limit: limit, max_expiries: 4 },
            Thresholds::default(),
            PlacePolicy::EndEpisode,
            &table,
        )
    }

    fn idle_step(reward: f64) -> Shaped {
        Shaped { rule: RuleId::DistanceFallback, reward }
    }

    #[test]
    fn first_step_starts_timer() {
        let mut ep = controller(3.0);
        assert_eq!(ep.timer_start(), None);
        let out = ep.record(idle_step(-1.0), TaskState::Idle, 1.0);
        assert_eq!(ep.timer_start(), Some(1.0));
        assert!((out.reward + 1.0).abs() < 1e-12);
        assert!((ep.time_left(2.5).unwrap() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn progress_restarts_timer() {
        let mut ep = controller(3.0);
        ep.record(idle_step(0.0), TaskState::Idle, 1.0);
        ep.record(Shaped { rule: RuleId::PickSuccess, reward: 10.0 }, TaskState::Holding, 3.5);
        assert_eq!(ep.timer_start(), Some(3.5));
        let out = ep.record(idle_step(0.0), TaskState::Holding, 5.0);
        assert!(!out.stagnation_expired);
        assert_eq!(ep.stagnation_count(), 0);
    }

    #[test]
    fn limit_in_fractional_steps_expires_on_time() {
        let dt = 1.0 / 60.0;
        let mut ep = controller(15.0);
        #[allow(clippy::cast_precision_loss)]
        let expiries: Vec<u64> = (1..=1_801u64)
            .filter(|&tick| ep.record(idle_step(0.0), TaskState::Idle, tick as f64 * dt).stagnation_expired)
            .collect();
        assert_eq!(expiries, vec![901, 1_801]);
    }

    #[test]
    fn placed_ends_episode_with_success() {
        let mut ep = controller(3.0);
        let out = ep.record(Shaped { rule: RuleId::PlaceSuccess, reward: 50.0 }, TaskState::Placed, 1.0);
        assert_eq!(out.termination, Some(TerminationReason::Success));
        assert!(!ep.running());
    }

    #[test]
    fn thresholds_end_episode() {
        let mut ep = controller(100.0);
        ep.thresholds = Thresholds { win: Some(20.0), loss: Some(-30.0) };
        ep.record(idle_step(-29.0), TaskState::Idle, 1.0);
        ep.record(idle_step(-1.0), TaskState::Idle, 2.0);
        assert!(ep.running(), "sitting on the loss threshold is not a loss");
        let out = ep.record(idle_step(-0.5), TaskState::Idle, 3.0);
        assert_eq!(out.termination, Some(TerminationReason::Loss));

        ep.reset();
        assert!(ep.running());
        let out = ep.record(idle_step(20.0), TaskState::Idle, 1.0);
        assert_eq!(out.termination, Some(TerminationReason::Win));
    }
}
