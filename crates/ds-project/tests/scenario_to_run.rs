//! End-to-end: scenario file -> registry -> simulator -> result.

use ds_core::State;
use ds_project::{load_yaml, presets, Registry, Scenario};
use ds_sim::{CancelToken, Simulator};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_file(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}_{nanos}.yaml"))
}

fn run_scenario(scenario: &Scenario) -> ds_core::RunResult {
    let registry = Registry::new();
    let mut system = registry.model(&scenario.model).expect("model");
    let controller = registry
        .controller(
            &scenario.controller,
            &scenario.controller_param_map(system.control_dim()),
        )
        .expect("controller");
    let integrator = registry.integrator(&scenario.integrator).expect("integrator");

    let x0 = scenario
        .init_state_vec()
        .map(State::from_vec)
        .or_else(|| system.default_state())
        .unwrap_or_else(|| State::zeros(system.state_dim()));

    let mut sim = Simulator::new(system, integrator, controller);
    for metric in registry.default_metrics() {
        sim.add_metric(metric);
    }
    sim.run(&CancelToken::new(), &x0, scenario.sim_config())
        .expect("run")
}

#[test]
fn yaml_scenario_drives_a_full_run() {
    let path = unique_temp_file("ds_scenario");
    std::fs::write(
        &path,
        "model: pendulum\nintegrator: rk4\ncontroller: pid\ndt: 0.01\nduration: 1.0\ninit_state:\n  theta: 0.3\ncontroller_params:\n  kp: 20.0\n",
    )
    .unwrap();

    let scenario = load_yaml(&path).unwrap();
    assert_eq!(scenario.model, "pendulum");
    assert_eq!(scenario.controller, "pid");

    let result = run_scenario(&scenario);
    assert_eq!(result.steps_taken, 100);
    assert!(result.metrics.contains_key("stability"));
    assert!(result.errors.is_empty());

    let _ = std::fs::remove_file(path);
}

#[test]
fn unknown_model_in_scenario_fails_cleanly() {
    let path = unique_temp_file("ds_scenario_bad");
    std::fs::write(&path, "model: perpetuum_mobile\n").unwrap();

    let scenario = load_yaml(&path).unwrap();
    assert!(Registry::new().model(&scenario.model).is_err());

    let _ = std::fs::remove_file(path);
}

#[test]
fn every_preset_builds_and_steps() {
    // Whole-catalogue smoke test at a shortened duration.
    for (model, name, mut scenario) in presets::all() {
        scenario.duration = 0.1;
        let result = run_scenario(&scenario);
        assert!(
            result.steps_taken > 0,
            "preset {model}/{name} took no steps"
        );
    }
}
