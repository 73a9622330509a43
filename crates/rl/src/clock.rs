//! Time sources for the stagnation timer.
//!
//! The environment reads time only through [`Clock`]. [`StepClock`] advances a
//! fixed amount per step and makes episodes reproducible from a seed and an
//! action sequence; [`WallClock`] follows real time for interactive play.

use std::time::Instant;

pub trait Clock: Send {
    /// Seconds since the last [`Clock::restart`].
    fn now(&self) -> f64;

    /// Called once at the start of every step.
    fn tick(&mut self);

    /// Called on every reset.
    fn restart(&mut self);
}

/// Simulated time: every step lasts `seconds_per_step`.
#[derive(Clone, Debug)]
pub struct StepClock {
    seconds_per_step: f64,
    ticks: u64,
}

impl StepClock {
    #[must_use]
    pub fn new(seconds_per_step: f64) -> Self {
        Self { seconds_per_step, ticks: 0 }
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Clock for StepClock {
    #[allow(clippy::cast_precision_loss)]
    fn now(&self) -> f64 {
        self.ticks as f64 * self.seconds_per_step
    }

    fn tick(&mut self) {
        self.ticks += 1;
    }

    fn restart(&mut self) {
        self.ticks = 0;
    }
}

/// Real time measured from the last restart.
#[derive(Clone, Debug)]
pub struct WallClock {
    origin: Instant,
}

impl WallClock {
    #[must_use]
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn tick(&mut self) {}

    fn restart(&mut self) {
        self.origin = Instant::now();
    }
}
