use rl::{
    Action, BandMagnitudes, ConfigError, Env, EnvConfig, EnvError, ObservationKind, PickPlaceEnv, Profile,
    StagnationConfig, TerminationReason, Thresholds,
};

/// No shaping at all: every ordinary move is worth exactly zero, so only the
/// stagnation timer moves the score.
fn timer_only(limit: f64, max_expiries: u32) -> EnvConfig {
    let mut config = Profile::Shaped.config();
    config.seconds_per_step = 1.0;
    config.stagnation = StagnationConfig { timer_limit: limit, max_expiries };
    config.thresholds = Thresholds::default();
    let m = &mut config.magnitudes;
    m.approach_target = BandMagnitudes::ZERO;
    m.drift_to_destination = BandMagnitudes::ZERO;
    m.approach_destination = BandMagnitudes::ZERO;
    m.drift_to_target = BandMagnitudes::ZERO;
    m.fallback_relevant_weight = 0.0;
    m.fallback_irrelevant_weight = 0.0;
    m.stagnation_penalty = -5.0;
    m.exhaustion_penalty = -100.0;
    config
}

#[test]
fn stagnation_expires_every_limit_and_exhausts() {
    let mut env = PickPlaceEnv::new(timer_only(3.0, 4)).unwrap();
    env.reset(Some(0));

    let mut expiries = Vec::new();
    let mut rewards = Vec::new();
    let mut last = None;
    for step in 1..=16 {
        // Wiggle near the zero pose, far from anything that spawns.
        let action = if step % 2 == 1 { Action::IncreaseAngle1 } else { Action::DecreaseAngle1 };
        let result = env.step(action).unwrap();
        if result.info.stagnation_expired {
            expiries.push(step);
        }
        rewards.push(result.reward);
        if step < 16 {
            assert!(!result.terminated, "terminated early at step {step}");
        }
        last = Some(result);
    }

    assert_eq!(expiries, vec![4, 7, 10, 13, 16]);
    assert_eq!(rewards[3], -5.0);
    assert_eq!(rewards[15], -105.0);
    assert_eq!(rewards[4], 0.0);

    let last = last.unwrap();
    assert!(last.terminated);
    assert_eq!(last.info.termination, Some(TerminationReason::StagnationExhausted));
    assert_eq!(env.score(), -125.0);
    assert_eq!(env.stagnation_count(), 0);
}

#[test]
fn stagnation_expires_on_the_step_the_limit_is_reached() {
    let mut config = timer_only(15.0, 4);
    config.seconds_per_step = Profile::Shaped.config().seconds_per_step;
    let mut env = PickPlaceEnv::new(config).unwrap();
    env.reset(Some(0));

    let mut expiries = Vec::new();
    for step in 1..=2_701 {
        let action = if step % 2 == 1 { Action::IncreaseAngle1 } else { Action::DecreaseAngle1 };
        if env.step(action).unwrap().info.stagnation_expired {
            expiries.push(step);
        }
    }
    // The timer starts on step 1, and 15 s is 900 steps of 1/60 s.
    assert_eq!(expiries, vec![901, 1_801, 2_701]);
}

/// Shrink the scene so a tiny frame still holds the base and spawn area.
fn small_frame(mut config: EnvConfig, width: u32, height: u32) -> EnvConfig {
    config.frame.width = width;
    config.frame.height = height;
    config.arm.base = physics::Vec2::new(f64::from(width) / 2.0, f64::from(height) / 2.0);
    config.spawn_extent = 5.0;
    config
}

#[test]
fn time_left_counts_down_from_limit() {
    let mut env = PickPlaceEnv::new(timer_only(10.0, 4)).unwrap();
    env.reset(Some(0));
    env.step(Action::IncreaseAngle1).unwrap();
    let result = env.step(Action::DecreaseAngle1).unwrap();
    let scene = result.observation.as_scene().copied().unwrap();
    assert_eq!(scene.elapsed, 2.0);
    assert_eq!(scene.time_left, Some(9.0));
}

#[test]
fn step_before_reset_is_rejected() {
    let mut env = PickPlaceEnv::new(Profile::Arcade.config()).unwrap();
    assert_eq!(env.step(Action::IncreaseAngle1).unwrap_err(), EnvError::NotInitialized);
    assert_eq!(env.render_named("human").unwrap_err(), EnvError::NotInitialized);

    env.reset(None);
    env.step(Action::IncreaseAngle1).unwrap();
    env.close();
    assert_eq!(env.step_discrete(0).unwrap_err(), EnvError::NotInitialized);
}

#[test]
fn out_of_space_actions_are_rejected() {
    let mut env = PickPlaceEnv::new(Profile::Shaped.config()).unwrap();
    env.reset(Some(5));
    assert_eq!(env.step_discrete(4).unwrap_err(), EnvError::InvalidAction(4));
    assert_eq!(env.step(Action::Place).unwrap_err(), EnvError::InvalidAction(5));
    assert_eq!(env.step_discrete(17).unwrap_err(), EnvError::InvalidAction(17));
    // Rejected actions do not advance the episode.
    assert_eq!(env.steps(), 0);
}

#[test]
fn render_modes() {
    let config = small_frame(Profile::Arcade.config(), 32, 24);
    config.validate().unwrap();
    let mut env = PickPlaceEnv::new(config).unwrap();
    env.reset(Some(2));
    assert_eq!(env.render_named("human").unwrap(), None);
    let frame = env.render_named("rgb_array").unwrap().unwrap();
    assert_eq!(frame.shape(), [24, 32, 3]);
    assert_eq!(
        env.render_named("ascii").unwrap_err(),
        EnvError::UnsupportedRenderMode("ascii".to_owned())
    );
}

#[test]
fn pixel_observations_match_observation_size() {
    let mut config = small_frame(Profile::Shaped.config(), 40, 30);
    config.observation = ObservationKind::Pixels;
    let mut env = PickPlaceEnv::new(config).unwrap();
    let (obs, _) = env.reset(Some(0));
    assert!(obs.as_scene().is_none());
    assert_eq!(env.observation_size(), 40 * 30 * 3);
    assert_eq!(obs.to_vec().len(), env.observation_size());
}

#[test]
fn config_json_overrides_defaults() -> anyhow::Result<()> {
    let config = EnvConfig::from_json_str(r#"{ "step_degrees": 2.5, "trigger": "explicit" }"#)?;
    assert_eq!(config.step_degrees, 2.5);
    assert_eq!(config.trigger, rl::TriggerMode::Explicit);
    assert_eq!(config.magnitudes, Profile::Shaped.config().magnitudes);

    let arcade = Profile::Arcade.config();
    let text = arcade.to_json_string()?;
    assert_eq!(EnvConfig::from_json_str(&text)?, arcade);
    Ok(())
}

#[test]
fn config_json_rejects_bad_input() {
    assert!(matches!(EnvConfig::from_json_str("{ not json"), Err(ConfigError::Parse(_))));
    assert!(matches!(
        EnvConfig::from_json_str(r#"{ "step_degrees": 0 }"#),
        Err(ConfigError::Invalid(_))
    ));
    assert!(matches!(
        EnvConfig::from_json_str(r#"{ "target_bands": { "very_near": 12, "near": 10 } }"#),
        Err(ConfigError::Invalid(_))
    ));
    assert!(matches!(
        EnvConfig::from_json_file("/definitely/not/here.json"),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn environment_checker_passes_builtin_profiles() -> anyhow::Result<()> {
    for profile in [Profile::Arcade, Profile::Shaped] {
        let passed = rl::check_env(&profile.config(), 13)?;
        assert!(passed.contains(&"determinism"), "{profile:?}: {passed:?}");
        assert!(passed.contains(&"step_after_close"), "{profile:?}: {passed:?}");
        assert_eq!(passed.len(), 7);
    }
    Ok(())
}
