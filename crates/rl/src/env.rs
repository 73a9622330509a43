//! Reinforcement learning environment trait and the pick-and-place environment.
//!
//! Inspired by classic frameworks like OpenAI Gym, [`Env`] declares the four
//! operations a driver may call. Trainers and renderers depend on the trait
//! only; [`PickPlaceEnv`] is the one implementation in this crate and owns
//! every piece of mutable simulation state.

use crate::action::{Action, TriggerMode};
use crate::clock::{Clock, StepClock};
use crate::config::{EnvConfig, ObservationKind, PlacePolicy};
use crate::episode::{EpisodeController, TerminationReason};
use crate::error::{ConfigError, EnvError};
use crate::reward::{RewardShaper, RuleId, StepContext};
use crate::scene::{Frame, NullRenderer, Observation, RenderMode, SceneDescriptor, SceneRenderer};
use crate::task::{TaskState, TaskStateMachine, Transition};
use physics::{Proximity, TwoLinkArm, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Spawn retries before accepting a coincident or overlapping position.
const SPAWN_ATTEMPTS: usize = 64;

/// Auxiliary information returned with every observation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// Rule that scored the step; `None` right after `reset`.
    pub rule: Option<RuleId>,
    /// Proximities the rule was matched against, before a pick or place
    /// moved the target.
    pub target: Proximity,
    pub destination: Proximity,
    pub stagnation_expired: bool,
    pub termination: Option<TerminationReason>,
    pub score: f64,
    pub steps: u64,
}

/// Result of one `step`.
#[derive(Clone, Debug, PartialEq)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f64,
    pub terminated: bool,
    /// No step cap exists, so this is always `false`.
    pub truncated: bool,
    pub info: Info,
}

/// Gym-style environment interface.
pub trait Env {
    /// Start a new episode. A seed reseeds the object generator; `None`
    /// continues the current random stream.
    fn reset(&mut self, seed: Option<u64>) -> (Observation, Info);

    /// Advance the simulation by one action.
    ///
    /// # Errors
    ///
    /// [`EnvError::NotInitialized`] before the first `reset`,
    /// [`EnvError::InvalidAction`] for an action outside the action space.
    fn step(&mut self, action: Action) -> Result<StepResult, EnvError>;

    /// Draw the current scene.
    ///
    /// # Errors
    ///
    /// [`EnvError::NotInitialized`] before the first `reset`.
    fn render(&mut self, mode: RenderMode) -> Result<Option<Frame>, EnvError>;

    /// Release the episode; `reset` must be called before stepping again.
    fn close(&mut self);

    /// Length of [`Observation::to_vec`].
    fn observation_size(&self) -> usize;

    /// Number of discrete action codes.
    fn action_count(&self) -> usize;

    /// Decode an integer action code for this environment.
    ///
    /// # Errors
    ///
    /// [`EnvError::InvalidAction`] for codes outside the action space.
    fn action_from_code(&self, code: u32) -> Result<Action, EnvError>;

    /// Step with an integer action code.
    ///
    /// # Errors
    ///
    /// As for [`Env::action_from_code`] and [`Env::step`].
    fn step_discrete(&mut self, code: u32) -> Result<StepResult, EnvError> {
        let action = self.action_from_code(code)?;
        self.step(action)
    }

    /// Render with a mode given by name (`"human"` or `"rgb_array"`).
    ///
    /// # Errors
    ///
    /// [`EnvError::UnsupportedRenderMode`] for any other name.
    fn render_named(&mut self, mode: &str) -> Result<Option<Frame>, EnvError> {
        let mode = mode.parse()?;
        self.render(mode)
    }
}

/// Pick-and-place task with a two-link arm.
pub struct PickPlaceEnv {
    config: EnvConfig,
    arm: TwoLinkArm,
    task: TaskStateMachine,
    shaper: RewardShaper,
    episode: EpisodeController,
    clock: Box<dyn Clock>,
    renderer: Box<dyn SceneRenderer>,
    rng: fastrand::Rng,
    target: Vec2,
    destination: Vec2,
    steps: u64,
    initialized: bool,
}

impl PickPlaceEnv {
    /// Build an environment with a step-counted clock and a blank renderer.
    ///
    /// # Errors
    ///
    /// Returns the validation error of an inconsistent `config`.
    pub fn new(config: EnvConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let clock = Box::new(StepClock::new(config.seconds_per_step));
        let renderer = Box::new(NullRenderer::new(config.frame.width, config.frame.height));
        Ok(Self {
            arm: TwoLinkArm::new(config.arm),
            task: TaskStateMachine::new(),
            shaper: RewardShaper::new(config.magnitudes),
            episode: EpisodeController::new(
                config.stagnation,
                config.thresholds,
                config.place_policy,
                &config.magnitudes,
            ),
            clock,
            renderer,
            rng: fastrand::Rng::new(),
            target: config.arm.base,
            destination: config.arm.base,
            steps: 0,
            initialized: false,
            config,
        })
    }

    /// Replace the renderer used by `render` and pixel observations.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Box<dyn SceneRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Replace the stagnation clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    #[must_use]
    pub fn arm(&self) -> &TwoLinkArm {
        &self.arm
    }

    #[must_use]
    pub fn task_state(&self) -> TaskState {
        self.task.state()
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.episode.score()
    }

    #[must_use]
    pub fn stagnation_count(&self) -> u32 {
        self.episode.stagnation_count()
    }

    #[must_use]
    pub fn termination(&self) -> Option<TerminationReason> {
        self.episode.termination()
    }

    #[must_use]
    pub fn target(&self) -> Vec2 {
        self.target
    }

    #[must_use]
    pub fn destination(&self) -> Vec2 {
        self.destination
    }

    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.initialized && self.episode.running()
    }

    /// Snapshot of the current scene.
    #[must_use]
    pub fn scene(&self) -> SceneDescriptor {
        let now = self.clock.now();
        SceneDescriptor {
            arm_pose: self.arm.pose(),
            base: self.arm.config.base,
            elbow: self.arm.elbow(),
            end_effector: self.arm.end_effector(),
            target: self.target,
            destination: self.destination,
            held: self.task.held(),
            score: self.episode.score(),
            task_state: self.task.state(),
            stagnation_count: self.episode.stagnation_count(),
            time_left: self.episode.time_left(now),
            elapsed: now,
            target_radius: self.config.target_bands.contact_radius,
            destination_radius: self.config.destination_bands.contact_radius,
        }
    }

    fn observe(&mut self) -> Observation {
        let scene = self.scene();
        match self.config.observation {
            ObservationKind::Scene => Observation::Scene(scene),
            ObservationKind::Pixels => Observation::Pixels(self.renderer.draw(&scene)),
        }
    }

    fn proximities(&self) -> (Proximity, Proximity) {
        let tip = self.arm.end_effector();
        (
            self.config.target_bands.classify(tip, self.target),
            self.config.destination_bands.classify(tip, self.destination),
        )
    }

    /// Uniform integer position within `spawn_extent` of the base, clipped
    /// to the frame.
    #[allow(clippy::cast_possible_truncation)]
    fn spawn_point(&self) -> Vec2 {
        let base = self.config.arm.base;
        let extent = self.config.spawn_extent;
        let axis = |centre: f64, limit: u32| {
            let lo = (centre - extent).max(0.0).ceil() as i32;
            let hi = (centre + extent).min(f64::from(limit)).floor() as i32;
            f64::from(self.rng.i32(lo..=hi.max(lo)))
        };
        Vec2::new(axis(base.x, self.config.frame.width), axis(base.y, self.config.frame.height))
    }

    /// A fresh target that differs from the current one and does not sit on
    /// the destination.
    fn regenerate_target(&self) -> Vec2 {
        let clearance = self.config.target_bands.contact_radius + self.config.destination_bands.contact_radius;
        let mut candidate = self.spawn_point();
        for _ in 0..SPAWN_ATTEMPTS {
            if candidate != self.target && candidate.distance(self.destination) >= clearance {
                break;
            }
            candidate = self.spawn_point();
        }
        candidate
    }

    /// Step info for proximities measured before any transition moved the target.
    fn info(
        &self,
        rule: Option<RuleId>,
        (target, destination): (Proximity, Proximity),
        stagnation_expired: bool,
    ) -> Info {
        Info {
            rule,
            target,
            destination,
            stagnation_expired,
            termination: self.episode.termination(),
            score: self.episode.score(),
            steps: self.steps,
        }
    }

    /// Apply the state transition a matched rule stands for.
    fn apply_rule(&mut self, rule: RuleId, target: Proximity, destination: Proximity) {
        match rule {
            RuleId::PickSuccess => {
                if self.task.try_pick(target.band.is_contact(), self.target) == Transition::Accepted {
                    info!(at = ?self.target, "payload picked");
                    self.target = self.regenerate_target();
                }
            }
            RuleId::PlaceSuccess => {
                if self.task.try_place(destination.band.is_contact()) == Transition::Accepted {
                    info!(at = ?self.destination, "payload placed");
                    self.target = self.regenerate_target();
                }
            }
            RuleId::WrongObjectContact | RuleId::PlaceFailure | RuleId::InvalidTransition => {
                warn!(?rule, state = ?self.task.state(), "rejected transition");
            }
            _ => {}
        }
    }
}

impl Env for PickPlaceEnv {
    fn reset(&mut self, seed: Option<u64>) -> (Observation, Info) {
        if let Some(seed) = seed {
            self.rng.seed(seed);
        }
        self.arm.reset();
        self.task.reset();
        self.episode.reset();
        self.clock.restart();
        self.steps = 0;

        self.destination = self.spawn_point();
        self.target = self.config.arm.base;
        self.target = self.regenerate_target();
        self.initialized = true;
        info!(target = ?self.target, destination = ?self.destination, ?seed, "episode reset");

        let info = self.info(None, self.proximities(), false);
        (self.observe(), info)
    }

    fn step(&mut self, action: Action) -> Result<StepResult, EnvError> {
        if !self.initialized {
            return Err(EnvError::NotInitialized);
        }
        if !action.is_available(self.config.trigger) {
            return Err(EnvError::InvalidAction(action.code()));
        }

        self.clock.tick();
        self.steps += 1;

        let (d1, d2) = action.direction();
        self.arm.apply_delta(d1 * self.config.step_degrees, d2 * self.config.step_degrees);

        let (target, destination) = self.proximities();
        let (pick_attempted, place_attempted) = match self.config.trigger {
            TriggerMode::Implicit => (target.band.is_contact(), destination.band.is_contact()),
            TriggerMode::Explicit => (action == Action::Pick, action == Action::Place),
        };
        let ctx = StepContext {
            state: self.task.state(),
            target,
            destination,
            pick_attempted,
            place_attempted,
        };
        let shaped = self.shaper.evaluate(&ctx);
        self.apply_rule(shaped.rule, target, destination);

        let outcome = self.episode.record(shaped, self.task.state(), self.clock.now());
        if outcome.exhausted {
            self.task.reset();
        }
        if self.task.state() == TaskState::Placed && self.config.place_policy == PlacePolicy::NextCycle {
            self.task.begin_next_cycle();
        }
        debug!(
            step = self.steps,
            ?action,
            rule = ?shaped.rule,
            reward = outcome.reward,
            d_target = target.distance,
            d_destination = destination.distance,
            "step"
        );

        let info = self.info(Some(shaped.rule), (target, destination), outcome.stagnation_expired);
        Ok(StepResult {
            observation: self.observe(),
            reward: outcome.reward,
            terminated: !self.episode.running(),
            truncated: false,
            info,
        })
    }

    fn render(&mut self, mode: RenderMode) -> Result<Option<Frame>, EnvError> {
        if !self.initialized {
            return Err(EnvError::NotInitialized);
        }
        let scene = self.scene();
        let frame = self.renderer.draw(&scene);
        match mode {
            RenderMode::Human => {
                self.renderer.present(&scene, &frame);
                Ok(None)
            }
            RenderMode::RgbArray => Ok(Some(frame)),
        }
    }

    fn close(&mut self) {
        if self.initialized {
            info!(score = self.episode.score(), steps = self.steps, "environment closed");
        }
        self.initialized = false;
    }

    fn observation_size(&self) -> usize {
        match self.config.observation {
            ObservationKind::Scene => SceneDescriptor::FEATURES,
            ObservationKind::Pixels => self.config.frame.width as usize * self.config.frame.height as usize * 3,
        }
    }

    fn action_count(&self) -> usize {
        self.config.trigger.action_count()
    }

    fn action_from_code(&self, code: u32) -> Result<Action, EnvError> {
        Action::from_code(code, self.config.trigger)
    }
}
