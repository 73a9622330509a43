//! # pickplace
//!
//! Command-line driver for the pick-and-place environment: run policies,
//! play the arcade game from a terminal, check environment contracts and
//! dump profiles.

mod app;
mod play;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(name = "pickplace", about = "Two-link arm pick-and-place simulator", version)]
struct Cli {
    /// Verbosity: -v for debug, -vv for trace.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a policy for a number of episodes and summarise the returns.
    Rollout(RolloutArgs),
    /// Play interactively: a/d turn the first joint, w/s the second, c picks, v places, q quits.
    Play(PlayArgs),
    /// Exercise the environment contract for a configuration.
    Check(EnvArgs),
    /// Print a configuration as JSON.
    Profile(EnvArgs),
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ProfileArg {
    Arcade,
    Shaped,
}

impl From<ProfileArg> for rl::Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Arcade => rl::Profile::Arcade,
            ProfileArg::Shaped => rl::Profile::Shaped,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum PolicyArg {
    Random,
    Greedy,
}

#[derive(Debug, Args)]
pub struct EnvArgs {
    /// Built-in profile the configuration starts from.
    #[arg(long, value_enum, default_value_t = ProfileArg::Shaped)]
    pub profile: ProfileArg,

    /// JSON configuration file; replaces the profile.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seed for object placement.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}

#[derive(Debug, Args)]
pub struct RolloutArgs {
    #[command(flatten)]
    pub env: EnvArgs,

    #[arg(long, default_value_t = 1)]
    pub episodes: u64,

    #[arg(long, value_enum, default_value_t = PolicyArg::Greedy)]
    pub policy: PolicyArg,

    /// Steps after which an unfinished episode is cut off.
    #[arg(long, default_value_t = 5_000)]
    pub max_steps: usize,

    /// Write every frame as a PNG into this directory.
    #[arg(long)]
    pub frames: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PlayArgs {
    #[command(flatten)]
    pub env: EnvArgs,

    /// Write a PNG of the scene after every key into this directory.
    #[arg(long)]
    pub frames: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Command::Rollout(args) => app::rollout(&args),
        Command::Play(args) => play::run(&args),
        Command::Check(args) => app::check(&args),
        Command::Profile(args) => app::print_profile(&args),
    }
}
