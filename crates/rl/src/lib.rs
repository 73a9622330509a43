#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]
//! # Pick-and-Place Environment
//!
//! A Gym-style reinforcement learning environment in which a planar two-link
//! arm picks a target object and drops it on a destination.
//!
//! ## Key Components
//!
//! -   **[`Env`]:** the capability trait (`reset`, `step`, `render`, `close`)
//!     implemented by [`PickPlaceEnv`].
//! -   **Task machine:** [`TaskStateMachine`] tracks `Idle → Holding → Placed`
//!     and never skips a state.
//! -   **Reward shaping:** [`RewardShaper`] scores every step with exactly one
//!     rule from an ordered cascade, reading its numbers from a
//!     [`MagnitudeTable`].
//! -   **Episodes:** [`EpisodeController`] keeps the score, the stagnation
//!     timer and the termination decision.
//! -   **Profiles:** [`Profile::Arcade`] and [`Profile::Shaped`] are complete
//!     [`EnvConfig`]s; custom ones load from JSON.
//!
//! ## Usage
//!
//! ```rust
//! use rl::{Action, Env, PickPlaceEnv, Profile};
//!
//! let mut env = PickPlaceEnv::new(Profile::Shaped.config()).unwrap();
//! let (obs, _info) = env.reset(Some(7));
//! assert_eq!(obs.to_vec().len(), env.observation_size());
//!
//! let step = env.step(Action::IncreaseAngle1).unwrap();
//! assert!(!step.truncated);
//! ```

pub mod action;
pub mod check;
pub mod clock;
pub mod config;
pub mod env;
pub mod episode;
pub mod error;
pub mod reward;
pub mod rollout;
pub mod scene;
pub mod task;

pub use action::{Action, TriggerMode};
pub use check::{check_env, CheckError};
pub use clock::{Clock, StepClock, WallClock};
pub use config::{EnvConfig, FrameSize, ObservationKind, PlacePolicy, Profile, StagnationConfig, Thresholds};
pub use env::{Env, Info, PickPlaceEnv, StepResult};
pub use episode::{EpisodeController, Outcome, TerminationReason};
pub use error::{ConfigError, EnvError};
pub use reward::{BandMagnitudes, MagnitudeTable, RewardShaper, RuleId, Shaped, StepContext};
pub use rollout::{run_episode, EpisodeSummary, GreedyPolicy, Policy, RandomPolicy, RolloutOptions, StepRecord};
pub use scene::{Frame, NullRenderer, Observation, RenderMode, SceneDescriptor, SceneRenderer};
pub use task::{TaskState, TaskStateMachine, Transition};
