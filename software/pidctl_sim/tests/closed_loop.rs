use pidctl::{Controller, DeadbandPolicy, PidConfig};
use pidctl_sim::{FirstOrderPlant, IntegratorPlant, Runner, Sample, Scenario, SetpointChange};

fn target_at(at_step: usize, target: f64) -> SetpointChange {
    SetpointChange { at_step, target }
}

fn max_abs_error(samples: &[Sample]) -> f64 {
    samples
        .iter()
        .map(|s| (s.target - s.measurement).abs())
        .fold(0.0, f64::max)
}

#[test]
fn pi_control_settles_first_order_plant() {
    let controller = Controller::new(2.0, 1.0, 0.0, 0.1, 0.0, 100.0, 0.0).unwrap();
    let plant = Box::new(FirstOrderPlant::new(1.0, 5.0));
    let mut runner = Runner::new(controller, plant).with_schedule(vec![target_at(0, 50.0)]);

    let samples = runner.run(2000).unwrap();
    assert!(samples.iter().all(|s| (0.0..=100.0).contains(&s.output)));
    assert!(max_abs_error(&samples[1500..]) < 0.05);

    // Holding the setpoint takes output equal to the integral term alone
    let last = samples.last().unwrap();
    assert!((last.output - 50.0).abs() < 0.1, "{last:?}");
}

#[test]
fn integral_stays_bounded_during_sustained_saturation() {
    let controller = Controller::new(1.0, 1.0, 0.0, 0.1, 0.0, 100.0, 0.0).unwrap();
    let plant = Box::new(FirstOrderPlant::new(1.0, 1.0));
    // The plant can only reach 100, so 500 is unreachable
    let mut runner = Runner::new(controller, plant)
        .with_schedule(vec![target_at(0, 500.0), target_at(500, 50.0)]);

    let saturated = runner.run(500).unwrap();
    assert!(saturated.iter().all(|s| s.output == 100.0));
    for s in &saturated[200..] {
        // Back-solved so that p + i reproduces the bound with p near 400
        assert!((s.accumulated_error + 300.0).abs() < 1e-3, "{s:?}");
    }

    // Without anti-windup the integral would be near 400 * 50s here, and the
    // output would stay pinned at the upper bound long after the setpoint drop
    let recovery = runner.run(2500).unwrap();
    assert!(recovery[0].output < 100.0);
    assert!(recovery.iter().all(|s| s.output < 100.0));
    assert!(max_abs_error(&recovery[2000..]) < 0.05);
}

#[test]
fn hold_policy_limit_cycle_stays_near_deadband() {
    let controller = Controller::new(0.5, 0.0, 0.0, 0.1, -10.0, 10.0, 0.5).unwrap();
    let plant = Box::new(IntegratorPlant::new(1.0));
    let mut runner = Runner::new(controller, plant).with_schedule(vec![target_at(0, 20.0)]);

    let samples = runner.run(3000).unwrap();
    assert!(max_abs_error(&samples[2500..]) < 1.0);
}

#[test]
fn zero_and_reset_policy_parks_the_output() {
    let controller = Controller::from_config(PidConfig {
        gain_p: 0.5,
        gain_i: 0.0,
        gain_d: 0.0,
        sample_interval: 0.1,
        output_min: -10.0,
        output_max: 10.0,
        deadband: 0.5,
        deadband_policy: DeadbandPolicy::ZeroAndReset,
    })
    .unwrap();
    let plant = Box::new(IntegratorPlant::new(1.0));
    let mut runner = Runner::new(controller, plant).with_schedule(vec![target_at(0, 20.0)]);

    let samples = runner.run(3000).unwrap();
    let tail = &samples[2500..];
    assert!(tail.iter().all(|s| s.output == 0.0));
    assert!(max_abs_error(tail) <= 0.5);
}

#[test]
fn reset_between_runs_suppresses_derivative_kick() {
    let controller = Controller::new(1.0, 0.0, 5.0, 0.1, -1e3, 1e3, 0.0).unwrap();
    let plant = Box::new(IntegratorPlant::new(1.0));
    let mut runner = Runner::new(controller, plant).with_schedule(vec![target_at(0, 10.0)]);

    runner.run(50).unwrap();
    runner.controller_mut().reset();
    let after = runner.run(2).unwrap();

    assert_eq!(after[0].d, 0.0);
    assert_eq!(after[0].accumulated_error, (10.0 - after[0].measurement) * 0.1);
    assert_eq!(runner.controller().target(), 10.0);
}

#[test]
fn scenario_file_round_trip_runs() {
    let dir = std::env::temp_dir().join(format!("pidctl_scenario_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("oven.json");

    let scenario = Scenario {
        name: "oven".into(),
        log_filter: None,
        controller: PidConfig {
            gain_p: 8.0,
            gain_i: 0.4,
            sample_interval: 0.5,
            deadband: 0.25,
            ..Default::default()
        },
        plant: Box::new(FirstOrderPlant::new(2.0, 40.0)),
        initial_value: 20.0,
        setpoints: vec![target_at(0, 80.0)],
        steps: 1200,
    };
    std::fs::write(&path, scenario.to_json_string().unwrap()).unwrap();

    let loaded = Scenario::load(&path).unwrap();
    std::fs::remove_dir_all(&dir).ok();

    let (mut runner, steps) = Runner::from_scenario(loaded).unwrap();
    let samples = runner.run(steps).unwrap();
    assert_eq!(samples.len(), 1200);
    assert_eq!(samples[0].measurement, 20.0);
    assert!((samples.last().unwrap().measurement - 80.0).abs() < 1.0);
}
