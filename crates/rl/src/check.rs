//! Contract checks for an environment configuration.
//!
//! [`check_env`] builds fresh environments from a config and exercises the
//! driver-facing contract: initialization order, observation size, action
//! bounds, render modes and seeded determinism.

use crate::config::EnvConfig;
use crate::env::{Env, PickPlaceEnv};
use crate::error::{ConfigError, EnvError};
use thiserror::Error;
use tracing::debug;

/// Steps taken by the determinism check.
const DETERMINISM_STEPS: usize = 200;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("check `{check}` failed: {detail}")]
    Failed { check: &'static str, detail: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn fail(check: &'static str, detail: impl Into<String>) -> CheckError {
    CheckError::Failed { check, detail: detail.into() }
}

/// Run every check against `config`, returning the names of the checks that
/// passed.
///
/// # Errors
///
/// The first failing check, or the config's own validation error.
pub fn check_env(config: &EnvConfig, seed: u64) -> Result<Vec<&'static str>, CheckError> {
    let mut passed = Vec::new();

    let mut env = PickPlaceEnv::new(config.clone())?;
    match env.step_discrete(0) {
        Err(EnvError::NotInitialized) => passed.push("step_before_reset"),
        other => return Err(fail("step_before_reset", format!("got {other:?}"))),
    }
    match env.render_named("rgb_array") {
        Err(EnvError::NotInitialized) => passed.push("render_before_reset"),
        other => return Err(fail("render_before_reset", format!("got {:?}", other.map(|f| f.map(|f| f.shape()))))),
    }

    let (observation, info) = env.reset(Some(seed));
    let len = observation.to_vec().len();
    if len != env.observation_size() {
        return Err(fail("observation_size", format!("{len} != {}", env.observation_size())));
    }
    if info.rule.is_some() || info.score.abs() > 0.0 {
        return Err(fail("reset_info", format!("{info:?}")));
    }
    passed.push("observation_size");

    let count = u32::try_from(env.action_count()).map_err(|e| fail("action_space", e.to_string()))?;
    for code in 0..count {
        env.step_discrete(code).map_err(|e| fail("action_space", format!("code {code}: {e}")))?;
    }
    match env.step_discrete(count) {
        Err(EnvError::InvalidAction(c)) if c == count => passed.push("action_space"),
        other => return Err(fail("action_space", format!("code {count} gave {:?}", other.map(|r| r.reward)))),
    }

    match env.render_named("depth") {
        Err(EnvError::UnsupportedRenderMode(_)) => {}
        other => return Err(fail("render_modes", format!("unknown mode gave {:?}", other.is_ok()))),
    }
    let frame = env
        .render_named("rgb_array")
        .map_err(|e| fail("render_modes", e.to_string()))?
        .ok_or_else(|| fail("render_modes", "rgb_array returned no frame"))?;
    let expected = [config.frame.height as usize, config.frame.width as usize, 3];
    if frame.shape() != expected || frame.data.len() != expected.iter().product::<usize>() {
        return Err(fail("render_modes", format!("frame shape {:?}", frame.shape())));
    }
    passed.push("render_modes");

    determinism(config, seed)?;
    passed.push("determinism");

    env.close();
    match env.step_discrete(0) {
        Err(EnvError::NotInitialized) => passed.push("step_after_close"),
        other => return Err(fail("step_after_close", format!("got {:?}", other.map(|r| r.reward)))),
    }

    debug!(?passed, "environment checks passed");
    Ok(passed)
}

/// Two environments with the same seed and actions must agree step for step.
fn determinism(config: &EnvConfig, seed: u64) -> Result<(), CheckError> {
    let mut a = PickPlaceEnv::new(config.clone())?;
    let mut b = PickPlaceEnv::new(config.clone())?;
    let (obs_a, _) = a.reset(Some(seed));
    let (obs_b, _) = b.reset(Some(seed));
    if obs_a != obs_b {
        return Err(fail("determinism", "initial observations differ"));
    }

    let actions = fastrand::Rng::with_seed(seed);
    let count = u32::try_from(a.action_count()).map_err(|e| fail("determinism", e.to_string()))?;
    for step in 0..DETERMINISM_STEPS {
        let code = actions.u32(..count);
        let ra = a.step_discrete(code).map_err(|e| fail("determinism", e.to_string()))?;
        let rb = b.step_discrete(code).map_err(|e| fail("determinism", e.to_string()))?;
        if !ra.reward.is_finite() {
            return Err(fail("determinism", format!("non-finite reward at step {step}")));
        }
        if ra != rb {
            return Err(fail("determinism", format!("diverged at step {step}")));
        }
        if ra.terminated {
            break;
        }
    }
    Ok(())
}
