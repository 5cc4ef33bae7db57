//! Long-horizon conservation checks for Hamiltonian models under the
//! symplectic steppers.

use ds_core::{Integrator, State, System};
use ds_integrators::{Leapfrog, Rk4, VelocityVerlet};
use ds_systems::{DoublePendulum, NBody, Pendulum, SpringMass};

fn max_relative_energy_drift(
    system: &mut dyn System,
    integrator: &mut dyn Integrator,
    x0: State,
    dt: f64,
    steps: usize,
) -> f64 {
    let e0 = system
        .as_hamiltonian()
        .map(|h| h.energy(&x0))
        .unwrap_or(0.0);
    assert!(e0.abs() > 0.0, "test system must start with nonzero energy");

    let u = vec![0.0; system.control_dim()];
    let mut x = x0;
    let mut worst: f64 = 0.0;
    for i in 0..steps {
        x = integrator
            .step(system, &x, &u, i as f64 * dt, dt)
            .expect("step failed");
        let e = system.as_hamiltonian().map(|h| h.energy(&x)).unwrap_or(0.0);
        worst = worst.max((e - e0).abs() / e0.abs());
    }
    worst
}

#[test]
fn verlet_bounds_undamped_pendulum_drift() {
    // duration = 100 / omega0 with omega0 = sqrt(g/L) ~= 3.13 rad/s.
    let dt = 0.001;
    let steps = (100.0 / 9.81f64.sqrt() / dt) as usize;
    let drift = max_relative_energy_drift(
        &mut Pendulum::undamped(),
        &mut VelocityVerlet::new(),
        State::from_vec(vec![0.5, 0.0]),
        dt,
        steps,
    );
    assert!(drift < 1e-3, "verlet drift {drift}");
}

#[test]
fn leapfrog_bounds_undamped_pendulum_drift() {
    let dt = 0.001;
    let steps = (100.0 / 9.81f64.sqrt() / dt) as usize;
    let drift = max_relative_energy_drift(
        &mut Pendulum::undamped(),
        &mut Leapfrog::new(),
        State::from_vec(vec![0.5, 0.0]),
        dt,
        steps,
    );
    assert!(drift < 1e-3, "leapfrog drift {drift}");
}

#[test]
fn undamped_spring_energy_under_verlet() {
    let mut spring = SpringMass::new();
    spring.damping[0] = 0.0;
    // omega0 = sqrt(k/m) ~= 3.16; run 100 / omega0 seconds.
    let dt = 0.001;
    let steps = (100.0 / 10.0f64.sqrt() / dt) as usize;
    let drift = max_relative_energy_drift(
        &mut spring,
        &mut VelocityVerlet::new(),
        State::from_vec(vec![1.0, 0.0]),
        dt,
        steps,
    );
    assert!(drift < 1e-3, "spring drift {drift}");
}

#[test]
fn nbody_momentum_invariant_under_leapfrog() {
    let mut nb = NBody::with_seed(100, 5);
    let mut leapfrog = Leapfrog::new();

    // Random cluster: positions spread out in the first half, gentle
    // velocities in the second.
    let x0: State = (0..400)
        .map(|i| {
            if i < 200 {
                ((i * 2654435761_usize) % 997) as f64 / 24.0 - 20.0
            } else {
                ((i * 40503_usize) % 211) as f64 / 500.0 - 0.2
            }
        })
        .collect();

    let (px0, py0) = nb.momentum(&x0);
    let p0 = (px0 * px0 + py0 * py0).sqrt();

    let mut x = x0;
    for i in 0..1000 {
        x = leapfrog.step(&mut nb, &x, &[], i as f64 * 0.005, 0.005).unwrap();
    }

    let (px, py) = nb.momentum(&x);
    let drift = ((px - px0).powi(2) + (py - py0).powi(2)).sqrt();
    assert!(
        drift < 1e-6 * p0.max(1.0),
        "momentum drift {drift} against initial {p0}"
    );
}

#[test]
fn double_pendulum_energy_under_rk4() {
    let drift = max_relative_energy_drift(
        &mut DoublePendulum::new(),
        &mut Rk4::new(),
        State::from_vec(vec![0.3, 0.3, 0.0, 0.0]),
        0.001,
        10_000,
    );
    assert!(drift < 1e-5, "double pendulum drift {drift}");
}

#[test]
fn rk4_tracks_harmonic_oscillator_tightly() {
    // x'' = -x integrated 10^4 steps stays within 1e-4 of the analytic
    // circle trajectory.
    struct Harmonic;
    impl System for Harmonic {
        fn state_dim(&self) -> usize {
            2
        }
        fn control_dim(&self) -> usize {
            0
        }
        fn derive(&mut self, x: &State, _u: &[f64], _t: f64) -> State {
            State::from_vec(vec![x[1], -x[0]])
        }
    }

    let mut rk4 = Rk4::new();
    let mut x = State::from_vec(vec![1.0, 0.0]);
    let dt = 0.01;
    for i in 0..10_000 {
        x = rk4.step(&mut Harmonic, &x, &[], i as f64 * dt, dt).unwrap();
    }
    let t = 10_000.0 * dt;
    let analytic = State::from_vec(vec![t.cos(), -t.sin()]);
    assert!(x.sub(&analytic).norm() < 1e-4);
}
