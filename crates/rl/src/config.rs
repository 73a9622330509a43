//! Environment configuration and difficulty profiles.
//!
//! Every numeric knob of the task lives in [`EnvConfig`]. The two built-in
//! [`Profile`]s reproduce the interactive game and the training environment;
//! anything else can be loaded from JSON, with missing fields taken from the
//! default profile.

use crate::action::TriggerMode;
use crate::error::ConfigError;
use crate::reward::{BandMagnitudes, MagnitudeTable};
use physics::{ArmConfig, ProximityBands};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// What happens after a successful place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacePolicy {
    /// `Placed` ends the episode as a success.
    EndEpisode,
    /// A new target appears and the arm goes back to `Idle`.
    NextCycle,
}

/// Form of the observation returned by `reset` and `step`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    Scene,
    Pixels,
}

/// Stagnation timer settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagnationConfig {
    /// Seconds without a pick or place before the timer expires.
    pub timer_limit: f64,
    /// Expiries tolerated; one more ends the episode.
    pub max_expiries: u32,
}

impl Default for StagnationConfig {
    fn default() -> Self {
        Self { timer_limit: 15.0, max_expiries: 4 }
    }
}

/// Score thresholds that end an episode. `None` disables the check.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Thresholds {
    /// Episode is won once the score reaches this value.
    pub win: Option<f64>,
    /// Episode is lost once the score falls below this value.
    pub loss: Option<f64>,
}

/// Pixel size of rendered frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl Default for FrameSize {
    fn default() -> Self {
        Self { width: 800, height: 600 }
    }
}

/// Full environment configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    pub arm: ArmConfig,
    /// Bands measured against the target (the object to pick).
    pub target_bands: ProximityBands,
    /// Bands measured against the destination (the drop-off zone).
    pub destination_bands: ProximityBands,
    pub magnitudes: MagnitudeTable,
    pub stagnation: StagnationConfig,
    pub thresholds: Thresholds,
    pub trigger: TriggerMode,
    pub place_policy: PlacePolicy,
    pub observation: ObservationKind,
    pub frame: FrameSize,
    /// Degrees a joint turns per move action.
    pub step_degrees: f64,
    /// Simulated duration of one step for the step-counted clock.
    pub seconds_per_step: f64,
    /// Objects spawn within this distance of the base along each axis.
    pub spawn_extent: f64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Profile::Shaped.config()
    }
}

impl EnvConfig {
    /// Parse a JSON document; absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or a configuration rejected by [`EnvConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or is invalid.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures (non-finite floats).
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check internal consistency.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_owned()));
        // Written so that NaN fails every check.
        let positive = |x: f64| x > 0.0 && x.is_finite();
        if !(positive(self.arm.link1) && positive(self.arm.link2)) {
            return invalid("link lengths must be positive");
        }
        if !self.target_bands.is_ordered() || !self.destination_bands.is_ordered() {
            return invalid("proximity bands must satisfy 0 <= very_near <= near <= far");
        }
        if !positive(self.stagnation.timer_limit) {
            return invalid("stagnation.timer_limit must be positive");
        }
        if !positive(self.step_degrees) {
            return invalid("step_degrees must be positive");
        }
        if !positive(self.seconds_per_step) {
            return invalid("seconds_per_step must be positive");
        }
        if !(self.spawn_extent >= 0.0 && self.spawn_extent.is_finite()) {
            return invalid("spawn_extent must not be negative");
        }
        // Every corner of the spawn square has to be reachable.
        if self.spawn_extent * std::f64::consts::SQRT_2 > self.arm.reach() {
            return invalid("spawn_extent puts objects out of the arm's reach");
        }
        if self.frame.width == 0 || self.frame.height == 0 {
            return invalid("frame size must be non-zero");
        }
        let base = self.arm.base;
        let inside_x = (0.0..=f64::from(self.frame.width)).contains(&base.x);
        let inside_y = (0.0..=f64::from(self.frame.height)).contains(&base.y);
        if !(inside_x && inside_y) {
            return invalid("arm base must lie inside the frame");
        }
        let thresholds = [self.thresholds.win, self.thresholds.loss];
        if thresholds.iter().flatten().any(|t| !t.is_finite()) {
            return invalid("thresholds must be finite");
        }
        if let (Some(win), Some(loss)) = (self.thresholds.win, self.thresholds.loss) {
            if win <= loss {
                return invalid("thresholds.win must be above thresholds.loss");
            }
        }
        let m = &self.magnitudes;
        if !(m.fallback_relevant_weight >= 0.0 && m.fallback_irrelevant_weight.is_finite()) {
            return invalid("fallback weights must be finite and non-negative");
        }
        if m.fallback_irrelevant_weight < m.fallback_relevant_weight {
            return invalid("fallback_irrelevant_weight must not be below fallback_relevant_weight");
        }
        Ok(())
    }
}

/// Built-in difficulty profiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// The keyboard game: explicit pick/place keys, small scores, endless cycles.
    Arcade,
    /// The training environment: implicit triggers and dense shaping.
    Shaped,
}

impl Profile {
    #[must_use]
    pub fn config(self) -> EnvConfig {
        match self {
            Profile::Arcade => arcade(),
            Profile::Shaped => shaped(),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Profile::Arcade => "arcade",
            Profile::Shaped => "shaped",
        }
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arcade" => Ok(Profile::Arcade),
            "shaped" => Ok(Profile::Shaped),
            other => Err(ConfigError::UnknownProfile(other.to_owned())),
        }
    }
}

fn arcade() -> EnvConfig {
    EnvConfig {
        arm: ArmConfig::default(),
        target_bands: ProximityBands::default(),
        // The drop-off box is more forgiving than the apple.
        destination_bands: ProximityBands { contact_radius: 30.0, ..ProximityBands::default() },
        magnitudes: MagnitudeTable {
            pick_success: 10.0,
            wrong_object_contact: -10.0,
            place_success: 10.0,
            place_failure: -10.0,
            invalid_transition: -10.0,
            missed_grasp: -10.0,
            approach_target: BandMagnitudes::ZERO,
            drift_to_destination: BandMagnitudes::ZERO,
            approach_destination: BandMagnitudes::ZERO,
            drift_to_target: BandMagnitudes::ZERO,
            fallback_relevant_weight: 0.0,
            fallback_irrelevant_weight: 0.0,
            stagnation_penalty: -5.0,
            exhaustion_penalty: 0.0,
        },
        stagnation: StagnationConfig { timer_limit: 30.0, max_expiries: 4 },
        thresholds: Thresholds { win: Some(100.0), loss: Some(-30.0) },
        trigger: TriggerMode::Explicit,
        place_policy: PlacePolicy::NextCycle,
        observation: ObservationKind::Scene,
        frame: FrameSize::default(),
        step_degrees: 1.0,
        seconds_per_step: 1.0 / 60.0,
        spawn_extent: 100.0,
    }
}

fn shaped() -> EnvConfig {
    let approach = BandMagnitudes { contact: 0.0, very_near: 30.0, near: 20.0, far: 10.0 };
    let drift = BandMagnitudes { contact: -700.0, very_near: -500.0, near: -400.0, far: -300.0 };
    EnvConfig {
        arm: ArmConfig::default(),
        target_bands: ProximityBands::default(),
        destination_bands: ProximityBands::default(),
        magnitudes: MagnitudeTable {
            pick_success: 1_000.0,
            wrong_object_contact: -300.0,
            place_success: 100_000.0,
            place_failure: -300.0,
            invalid_transition: -300.0,
            missed_grasp: -10.0,
            approach_target: approach,
            drift_to_destination: drift,
            approach_destination: approach,
            drift_to_target: drift,
            fallback_relevant_weight: 1.0,
            fallback_irrelevant_weight: 1.5,
            stagnation_penalty: -500.0,
            exhaustion_penalty: -2_000.0,
        },
        stagnation: StagnationConfig { timer_limit: 15.0, max_expiries: 4 },
        // Accumulated fallback penalties would cross any fixed floor within a
        // few steps, so the episode is bounded by stagnation instead.
        thresholds: Thresholds { win: Some(10_000.0), loss: None },
        trigger: TriggerMode::Implicit,
        place_policy: PlacePolicy::EndEpisode,
        observation: ObservationKind::Scene,
        frame: FrameSize::default(),
        step_degrees: 5.0,
        seconds_per_step: 1.0 / 60.0,
        spawn_extent: 100.0,
    }
}
