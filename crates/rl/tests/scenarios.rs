use physics::{ArmPose, Band, Vec2};
use rl::{
    Action, Env, EnvConfig, PickPlaceEnv, PlacePolicy, Profile, RuleId, StepResult, TaskState, TerminationReason,
    Thresholds, TriggerMode,
};

const EPS: f64 = 1e-9;

/// Shaped profile without timers or score thresholds getting in the way.
fn quiet_shaped() -> EnvConfig {
    let mut config = Profile::Shaped.config();
    config.stagnation.timer_limit = 1e9;
    config.thresholds = Thresholds::default();
    config
}

/// Grid pose (in multiples of the step angle) whose tip is closest to `goal`.
fn nearest_grid_pose(env: &PickPlaceEnv, goal: Vec2) -> (i64, i64, f64) {
    let step = env.config().step_degrees;
    #[allow(clippy::cast_possible_truncation)]
    let n = (360.0 / step).round() as i64;
    let mut best = (0, 0, f64::INFINITY);
    for k1 in 0..n {
        for k2 in 0..n {
            #[allow(clippy::cast_precision_loss)]
            let pose = ArmPose::new(k1 as f64 * step, k2 as f64 * step);
            let d = env.arm().end_effector_at(pose).distance(goal);
            if d < best.2 {
                best = (k1, k2, d);
            }
        }
    }
    best
}

/// Move joint by joint to the grid pose `(k1, k2)`, stopping early when a
/// step is scored by `stop`.
fn drive_to(env: &mut PickPlaceEnv, k1: i64, k2: i64, stop: RuleId) -> Option<StepResult> {
    let step = env.config().step_degrees;
    loop {
        let pose = env.arm().pose();
        #[allow(clippy::cast_possible_truncation)]
        let (c1, c2) = ((pose.angle1 / step).round() as i64, (pose.angle2 / step).round() as i64);
        let action = if c1 < k1 {
            Action::IncreaseAngle1
        } else if c1 > k1 {
            Action::DecreaseAngle1
        } else if c2 < k2 {
            Action::IncreaseAngle2
        } else if c2 > k2 {
            Action::DecreaseAngle2
        } else {
            return None;
        };
        let result = env.step(action).unwrap();
        if result.info.rule == Some(stop) {
            return Some(result);
        }
    }
}

/// Drive into contact with `goal`, returning the step scored by `stop`.
fn reach(env: &mut PickPlaceEnv, goal: Vec2, radius: f64, stop: RuleId) -> Option<StepResult> {
    let (k1, k2, d) = nearest_grid_pose(env, goal);
    assert!(d < radius, "no grid pose reaches {goal:?} (best {d})");
    drive_to(env, k1, k2, stop)
}

#[test]
fn same_seed_gives_same_layout() {
    let mut a = PickPlaceEnv::new(Profile::Shaped.config()).unwrap();
    let mut b = PickPlaceEnv::new(Profile::Shaped.config()).unwrap();
    let (obs_a, _) = a.reset(Some(42));
    let (obs_b, _) = b.reset(Some(42));
    assert_eq!(obs_a, obs_b);
    assert_eq!(a.target(), b.target());
    assert_eq!(a.destination(), b.destination());

    for p in [a.target(), a.destination()] {
        assert!((300.0..=500.0).contains(&p.x), "{p:?}");
        assert!((200.0..=400.0).contains(&p.y), "{p:?}");
        assert_eq!(p.x.fract(), 0.0);
        assert_eq!(p.y.fract(), 0.0);
    }
}

#[test]
fn seed_one_layout_is_pinned() {
    for profile in [Profile::Shaped, Profile::Arcade] {
        let mut env = PickPlaceEnv::new(profile.config()).unwrap();
        env.reset(Some(1));
        assert_eq!(env.destination(), Vec2::new(477.0, 222.0), "{profile:?}");
        assert_eq!(env.target(), Vec2::new(336.0, 400.0), "{profile:?}");
    }
}

#[test]
fn reset_starts_from_zero_pose_and_score() {
    let mut env = PickPlaceEnv::new(Profile::Shaped.config()).unwrap();
    let (obs, info) = env.reset(Some(1));
    let scene = obs.as_scene().unwrap();
    assert_eq!(scene.arm_pose, ArmPose::default());
    assert!((scene.end_effector.x - 600.0).abs() < EPS);
    assert!((scene.end_effector.y - 300.0).abs() < EPS);
    assert_eq!(scene.task_state, TaskState::Idle);
    assert_eq!(scene.time_left, None);
    assert_eq!(info.rule, None);
    assert_eq!(info.score, 0.0);

    let features = obs.to_vec();
    assert_eq!(features.len(), env.observation_size());
    assert_eq!(&features[..4], &[0.0, 0.0, 600.0, 300.0]);
    #[allow(clippy::cast_possible_truncation)]
    let expected = [env.target().x as f32, env.target().y as f32, env.destination().x as f32];
    assert_eq!(&features[4..7], &expected);
    assert_eq!(&features[8..10], &[0.0, 0.0]);
}

#[test]
fn four_increments_follow_closed_form() {
    let mut env = PickPlaceEnv::new(Profile::Shaped.config()).unwrap();
    env.reset(Some(42));
    let mut last = None;
    for _ in 0..4 {
        last = Some(env.step(Action::IncreaseAngle1).unwrap());
    }
    let last = last.unwrap();
    let scene = *last.observation.as_scene().unwrap();
    assert_eq!(scene.arm_pose, ArmPose::new(20.0, 0.0));

    let rad = 20f64.to_radians();
    let expected = Vec2::new(400.0 + 100.0 * rad.cos() + 100.0, 300.0 - 100.0 * rad.sin());
    assert!((scene.end_effector.x - expected.x).abs() < EPS);
    assert!((scene.end_effector.y - expected.y).abs() < EPS);
    assert!((last.info.target.distance - expected.distance(env.target())).abs() < EPS);
    assert!(last.reward.is_finite());
    assert!(!last.terminated);
    assert!(!last.truncated);
}

#[test]
fn implicit_pick_then_place_ends_episode() {
    let mut env = PickPlaceEnv::new(quiet_shaped()).unwrap();
    env.reset(Some(7));
    let first_target = env.target();
    let radius = env.config().target_bands.contact_radius;

    let picked = reach(&mut env, first_target, radius, RuleId::PickSuccess).expect("pick never happened");
    assert_eq!(env.task_state(), TaskState::Holding);
    assert_eq!(picked.reward, 1_000.0);
    assert_eq!(picked.info.target.band, Band::Contact);
    assert!((picked.info.target.distance - env.arm().end_effector().distance(first_target)).abs() < EPS);
    assert!(!picked.terminated);
    assert_ne!(env.target(), first_target);
    let scene = *picked.observation.as_scene().unwrap();
    assert_eq!(scene.held, Some(first_target));
    assert_eq!(scene.task_state.flags(), (true, false));

    let destination = env.destination();
    let radius = env.config().destination_bands.contact_radius;
    let target_before_place = env.target();
    let placed = reach(&mut env, destination, radius, RuleId::PlaceSuccess).expect("place never happened");
    assert_eq!(env.task_state(), TaskState::Placed);
    assert_eq!(placed.reward, 100_000.0);
    assert_eq!(placed.info.destination.band, Band::Contact);
    assert!(placed.terminated);
    assert_eq!(placed.info.termination, Some(TerminationReason::Success));
    assert_ne!(env.target(), target_before_place);
    assert_eq!(placed.observation.as_scene().unwrap().held, None);

    // Stepping on keeps the episode terminated.
    let after = env.step(Action::DecreaseAngle2).unwrap();
    assert!(after.terminated);
    assert_eq!(env.task_state(), TaskState::Placed);
}

#[test]
fn explicit_cycle_rearms_under_next_cycle() {
    let mut config = Profile::Arcade.config();
    config.stagnation.timer_limit = 1e9;
    let mut env = PickPlaceEnv::new(config).unwrap();
    env.reset(Some(11));
    let target = env.target();

    // Passing over the target without pressing pick scores nothing.
    let (k1, k2, _) = nearest_grid_pose(&env, target);
    assert!(drive_to(&mut env, k1, k2, RuleId::PickSuccess).is_none());
    assert_eq!(env.task_state(), TaskState::Idle);
    assert_eq!(env.score(), 0.0);

    let picked = env.step(Action::Pick).unwrap();
    assert_eq!(picked.info.rule, Some(RuleId::PickSuccess));
    assert_eq!(picked.reward, 10.0);
    assert_eq!(env.task_state(), TaskState::Holding);

    let destination = env.destination();
    let (k1, k2, _) = nearest_grid_pose(&env, destination);
    drive_to(&mut env, k1, k2, RuleId::PlaceSuccess);
    let placed = env.step(Action::Place).unwrap();
    assert_eq!(placed.info.rule, Some(RuleId::PlaceSuccess));
    assert_eq!(placed.reward, 10.0);
    assert!(!placed.terminated);
    assert_eq!(env.task_state(), TaskState::Idle);
    assert_eq!(env.score(), 20.0);
}

#[test]
fn place_while_idle_is_penalised_without_transition() {
    let mut env = PickPlaceEnv::new(Profile::Arcade.config()).unwrap();
    env.reset(Some(3));
    let result = env.step(Action::Place).unwrap();
    assert_eq!(result.info.rule, Some(RuleId::InvalidTransition));
    assert!(result.reward < 0.0);
    assert_eq!(env.task_state(), TaskState::Idle);

    let result = env.step(Action::Pick).unwrap();
    assert_eq!(result.info.rule, Some(RuleId::MissedGrasp));
    assert!(result.reward < 0.0);
    assert_eq!(env.task_state(), TaskState::Idle);
}

#[test]
fn placed_is_never_reached_from_idle() {
    let mut config = Profile::Arcade.config();
    config.place_policy = PlacePolicy::EndEpisode;
    config.thresholds = Thresholds::default();
    config.step_degrees = 15.0;
    let mut env = PickPlaceEnv::new(config).unwrap();
    let actions = fastrand::Rng::with_seed(99);

    for episode in 0..20 {
        env.reset(Some(episode));
        for _ in 0..500 {
            let before = env.task_state();
            let result = env.step(Action::ALL[actions.usize(..6)]).unwrap();
            let after = env.task_state();
            if before == TaskState::Idle {
                assert_ne!(after, TaskState::Placed);
            }
            if after == TaskState::Placed {
                assert_eq!(before, TaskState::Holding);
            }
            if result.terminated {
                break;
            }
        }
    }
}

#[test]
fn implicit_mode_has_four_actions() {
    let mut env = PickPlaceEnv::new(Profile::Shaped.config()).unwrap();
    assert_eq!(env.config().trigger, TriggerMode::Implicit);
    assert_eq!(env.action_count(), 4);
    env.reset(None);
    for code in 0..4 {
        env.step_discrete(code).unwrap();
    }
}
