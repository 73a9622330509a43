//! Line-oriented version of the keyboard game.
//!
//! Each input line is read as a sequence of keys; every key is one step. The
//! stagnation timer follows the wall clock.

use crate::app::{build_env, load_config};
use crate::PlayArgs;
use anyhow::{Context, Result};
use rl::{Action, Env, EnvError, PickPlaceEnv, RenderMode, WallClock};
use std::io::{self, BufRead, Write};
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Key {
    Act(Action),
    Quit,
}

fn key(c: char) -> Option<Key> {
    let action = match c.to_ascii_lowercase() {
        'a' => Action::DecreaseAngle1,
        'd' => Action::IncreaseAngle1,
        'w' => Action::IncreaseAngle2,
        's' => Action::DecreaseAngle2,
        'c' => Action::Pick,
        'v' => Action::Place,
        'q' => return Some(Key::Quit),
        _ => return None,
    };
    Some(Key::Act(action))
}

fn status(env: &PickPlaceEnv) -> String {
    let scene = env.scene();
    format!(
        "score {:>8.1} | {:?} | tip ({:.0}, {:.0}) | target ({:.0}, {:.0}) | box ({:.0}, {:.0}) | time left {:.1}s",
        scene.score,
        scene.task_state,
        scene.end_effector.x,
        scene.end_effector.y,
        scene.target.x,
        scene.target.y,
        scene.destination.x,
        scene.destination.y,
        scene.time_left.unwrap_or(0.0),
    )
}

pub fn run(args: &PlayArgs) -> Result<()> {
    let config = load_config(&args.env)?;
    let mut env = build_env(config, args.frames.as_deref())?.with_clock(Box::new(WallClock::new()));
    env.reset(Some(args.env.seed));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "a/d: joint 1, w/s: joint 2, c: pick, v: place, q: quit")?;
    writeln!(out, "{}", status(&env))?;

    for line in io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        for c in line.chars() {
            let action = match key(c) {
                Some(Key::Act(action)) => action,
                Some(Key::Quit) => return Ok(()),
                None => continue,
            };
            let result = match env.step(action) {
                Ok(result) => result,
                Err(EnvError::InvalidAction(code)) => {
                    warn!("key {c:?} (action {code}) is not available in this profile");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            if args.frames.is_some() {
                env.render(RenderMode::Human)?;
            }
            if result.terminated {
                writeln!(out, "{}", status(&env))?;
                writeln!(out, "game over: {:?}", result.info.termination)?;
                return Ok(());
            }
        }
        writeln!(out, "{}", status(&env))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(key('a'), Some(Key::Act(Action::DecreaseAngle1)));
        assert_eq!(key('D'), Some(Key::Act(Action::IncreaseAngle1)));
        assert_eq!(key('w'), Some(Key::Act(Action::IncreaseAngle2)));
        assert_eq!(key('s'), Some(Key::Act(Action::DecreaseAngle2)));
        assert_eq!(key('c'), Some(Key::Act(Action::Pick)));
        assert_eq!(key('v'), Some(Key::Act(Action::Place)));
        assert_eq!(key('q'), Some(Key::Quit));
        assert_eq!(key(' '), None);
    }
}
