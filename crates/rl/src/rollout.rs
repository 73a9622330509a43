//! Rollout: drive a [`PickPlaceEnv`] with a policy and summarise the episode.

use crate::action::{Action, TriggerMode};
use crate::config::EnvConfig;
use crate::env::{Env, PickPlaceEnv};
use crate::episode::TerminationReason;
use crate::error::EnvError;
use crate::reward::RuleId;
use crate::scene::{RenderMode, SceneDescriptor};
use crate::task::TaskState;
use physics::{ArmPose, TwoLinkArm, Vec2};
use serde::Serialize;
use tracing::info;

/// Chooses an action from the current scene.
pub trait Policy {
    fn act(&mut self, scene: &SceneDescriptor, config: &EnvConfig) -> Action;
}

/// Uniformly random over the configured action space.
pub struct RandomPolicy {
    rng: fastrand::Rng,
}

impl RandomPolicy {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { rng: fastrand::Rng::with_seed(seed) }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _scene: &SceneDescriptor, config: &EnvConfig) -> Action {
        Action::ALL[self.rng.usize(..config.trigger.action_count())]
    }
}

/// One-step lookahead toward whichever object matters in the current state.
///
/// In explicit mode it presses pick or place as soon as the tip is in contact.
/// When no move brings the tip closer it falls back to a random move to get
/// out of the local minimum.
pub struct GreedyPolicy {
    rng: fastrand::Rng,
}

impl GreedyPolicy {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { rng: fastrand::Rng::with_seed(seed) }
    }
}

impl Policy for GreedyPolicy {
    fn act(&mut self, scene: &SceneDescriptor, config: &EnvConfig) -> Action {
        let (goal, radius, trigger) = match scene.task_state {
            TaskState::Holding => (scene.destination, scene.destination_radius, Action::Place),
            TaskState::Idle | TaskState::Placed => (scene.target, scene.target_radius, Action::Pick),
        };
        let current = scene.end_effector.distance(goal);
        if config.trigger == TriggerMode::Explicit && current < radius {
            return trigger;
        }

        let arm = TwoLinkArm::new(config.arm);
        let distance_after = |action: Action| {
            let (d1, d2) = action.direction();
            let pose = ArmPose::new(
                scene.arm_pose.angle1 + d1 * config.step_degrees,
                scene.arm_pose.angle2 + d2 * config.step_degrees,
            );
            arm.end_effector_at(pose).distance(goal)
        };
        let best = Action::MOVES
            .into_iter()
            .map(|action| (action, distance_after(action)))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        match best {
            Some((action, distance)) if distance < current => action,
            _ => Action::MOVES[self.rng.usize(..Action::MOVES.len())],
        }
    }
}

/// Rollout settings.
#[derive(Clone, Copy, Debug)]
pub struct RolloutOptions {
    pub seed: Option<u64>,
    /// Episodes that have not terminated after this many steps are cut off.
    pub max_steps: usize,
    /// Call `render(Human)` after every step.
    pub render: bool,
}

impl Default for RolloutOptions {
    fn default() -> Self {
        Self { seed: None, max_steps: 1_000, render: false }
    }
}

/// One recorded step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StepRecord {
    pub action: Action,
    pub rule: Option<RuleId>,
    pub reward: f64,
    pub end_effector: Vec2,
}

/// What happened in one episode.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub steps: Vec<StepRecord>,
    pub total_reward: f64,
    pub score: f64,
    pub picks: usize,
    pub places: usize,
    pub termination: Option<TerminationReason>,
}

impl EpisodeSummary {
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Reset `env` and run `policy` until termination or `max_steps`.
///
/// # Errors
///
/// Propagates environment errors, e.g. a policy choosing an action outside
/// the action space.
pub fn run_episode(
    env: &mut PickPlaceEnv,
    policy: &mut dyn Policy,
    options: RolloutOptions,
) -> Result<EpisodeSummary, EnvError> {
    env.reset(options.seed);
    if options.render {
        env.render(RenderMode::Human)?;
    }

    let mut summary = EpisodeSummary {
        steps: Vec::with_capacity(options.max_steps.min(4_096)),
        total_reward: 0.0,
        score: 0.0,
        picks: 0,
        places: 0,
        termination: None,
    };
    for _ in 0..options.max_steps {
        let action = policy.act(&env.scene(), env.config());
        let result = env.step(action)?;
        if options.render {
            env.render(RenderMode::Human)?;
        }

        match result.info.rule {
            Some(RuleId::PickSuccess) => summary.picks += 1,
            Some(RuleId::PlaceSuccess) => summary.places += 1,
            _ => {}
        }
        summary.total_reward += result.reward;
        summary.steps.push(StepRecord {
            action,
            rule: result.info.rule,
            reward: result.reward,
            end_effector: env.arm().end_effector(),
        });
        if result.terminated || result.truncated {
            break;
        }
    }
    summary.score = env.score();
    summary.termination = env.termination();

    info!(
        steps = summary.len(),
        score = summary.score,
        picks = summary.picks,
        places = summary.places,
        termination = ?summary.termination,
        "episode finished"
    );
    Ok(summary)
}
