//! Canned scenarios per model.

use crate::schema::{InitState, Scenario};

/// Named presets: `(model, preset, scenario)`.
pub fn all() -> Vec<(&'static str, &'static str, Scenario)> {
    let mut presets = Vec::new();

    for (name, theta, omega, duration) in [
        ("small", 0.2, 0.0, 20.0),
        ("large", 2.5, 0.0, 20.0),
        ("spinning", 0.1, 8.0, 30.0),
    ] {
        let mut s = Scenario::new("pendulum");
        s.duration = duration;
        s.init_state = InitState {
            theta,
            omega,
            ..InitState::default()
        };
        presets.push(("pendulum", name, s));
    }

    for (name, theta, dt, duration) in [
        ("symmetric", 1.5, 0.005, 30.0),
        ("chaos", 3.0, 0.005, 60.0),
        ("gentle", 0.3, 0.01, 30.0),
    ] {
        let mut s = Scenario::new("double_pendulum");
        s.dt = dt;
        s.duration = duration;
        s.init_state = InitState {
            theta,
            theta2: theta,
            ..InitState::default()
        };
        presets.push(("double_pendulum", name, s));
    }

    for (name, theta, controller) in [
        ("balance", 0.1, "lqr"),
        ("recover", 0.5, "lqr"),
        ("freefall", 0.1, "none"),
    ] {
        let mut s = Scenario::new("cartpole");
        s.controller = controller.to_string();
        s.duration = if controller == "none" { 10.0 } else { 30.0 };
        s.init_state = InitState {
            theta,
            ..InitState::default()
        };
        presets.push(("cartpole", name, s));
    }

    for (name, pos, vel, duration) in [("bounce", 2.0, 0.0, 20.0), ("fast", 1.0, 5.0, 10.0)] {
        let mut s = Scenario::new("spring_mass");
        s.duration = duration;
        s.init_state = InitState {
            pos,
            vel,
            ..InitState::default()
        };
        presets.push(("spring_mass", name, s));
    }

    for (name, y, theta, controller, duration) in [
        ("hover", 5.0, 0.0, "lqr", 30.0),
        ("tilt", 5.0, 0.3, "none", 20.0),
        ("drop", 10.0, 0.0, "none", 5.0),
    ] {
        let mut s = Scenario::new("drone");
        s.controller = controller.to_string();
        s.duration = duration;
        if controller == "lqr" {
            s.controller_params.target = y;
        }
        s.init_state = InitState {
            y,
            theta,
            ..InitState::default()
        };
        presets.push(("drone", name, s));
    }

    presets
}

/// Look up one preset by model and name.
pub fn find(model: &str, name: &str) -> Option<Scenario> {
    all()
        .into_iter()
        .find(|(m, n, _)| *m == model && *n == name)
        .map(|(_, _, s)| s)
}
