//! Non-interactive commands.

use crate::{EnvArgs, PolicyArg, RolloutArgs};
use anyhow::{Context, Result};
use rl::{run_episode, EnvConfig, GreedyPolicy, PickPlaceEnv, Policy, RandomPolicy, RolloutOptions};
use std::path::Path;

/// Resolve the configuration: a JSON file wins over the named profile.
pub fn load_config(args: &EnvArgs) -> Result<EnvConfig> {
    match &args.config {
        Some(path) => EnvConfig::from_json_file(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(rl::Profile::from(args.profile).config()),
    }
}

/// Build the environment, attaching a PNG-writing canvas when `frames` is set.
pub fn build_env(config: EnvConfig, frames: Option<&Path>) -> Result<PickPlaceEnv> {
    let env = PickPlaceEnv::new(config).context("building environment")?;
    match frames {
        None => Ok(env),
        Some(dir) => attach_canvas(env, dir),
    }
}

#[cfg(feature = "render")]
fn attach_canvas(env: PickPlaceEnv, dir: &Path) -> Result<PickPlaceEnv> {
    let frame = env.config().frame;
    let canvas = render::Canvas::new(frame.width, frame.height).with_output_dir(dir);
    tracing::info!("writing frames to {}", dir.display());
    Ok(env.with_renderer(Box::new(canvas)))
}

#[cfg(not(feature = "render"))]
fn attach_canvas(_env: PickPlaceEnv, dir: &Path) -> Result<PickPlaceEnv> {
    anyhow::bail!("cannot write frames to {}: built without the `render` feature", dir.display())
}

pub fn rollout(args: &RolloutArgs) -> Result<()> {
    let config = load_config(&args.env)?;
    let mut env = build_env(config, args.frames.as_deref())?;

    let mut returns = Vec::new();
    for episode in 0..args.episodes {
        let seed = args.env.seed.wrapping_add(episode);
        let mut policy: Box<dyn Policy> = match args.policy {
            PolicyArg::Random => Box::new(RandomPolicy::new(seed)),
            PolicyArg::Greedy => Box::new(GreedyPolicy::new(seed)),
        };
        let options = RolloutOptions { seed: Some(seed), max_steps: args.max_steps, render: args.frames.is_some() };
        let summary = run_episode(&mut env, policy.as_mut(), options)
            .with_context(|| format!("episode {episode}"))?;
        println!(
            "episode {episode}: steps={} score={:.2} picks={} places={} termination={}",
            summary.len(),
            summary.score,
            summary.picks,
            summary.places,
            summary.termination.map_or_else(|| "none".to_owned(), |t| format!("{t:?}")),
        );
        returns.push(summary.total_reward);
    }

    if !returns.is_empty() {
        #[allow(clippy::cast_precision_loss)]
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        println!("mean return over {} episodes: {mean:.2}", returns.len());
    }
    Ok(())
}

pub fn check(args: &EnvArgs) -> Result<()> {
    let config = load_config(args)?;
    let passed = rl::check_env(&config, args.seed)?;
    for name in passed {
        println!("ok  {name}");
    }
    Ok(())
}

pub fn print_profile(args: &EnvArgs) -> Result<()> {
    let config = load_config(args)?;
    println!("{}", config.to_json_string()?);
    Ok(())
}
