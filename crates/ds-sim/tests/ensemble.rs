//! Ensemble fan-out behaviour.

use ds_control::NoControl;
use ds_core::{SimConfig, State};
use ds_integrators::{Leapfrog, Rk4};
use ds_metrics::Stability;
use ds_sim::{CancelToken, Ensemble};
use ds_systems::{Lorenz, NBody};

fn nbody_ensemble(num_runs: usize, seed_start: u64) -> Ensemble {
    Ensemble::new(
        Box::new(|seed| Box::new(NBody::with_seed(24, seed))),
        Box::new(|| Box::new(Leapfrog::new())),
        Box::new(|| Box::new(NoControl::new(3))),
        num_runs,
        seed_start,
    )
}

#[test]
fn identical_seeds_reproduce_identical_results() {
    let cfg = SimConfig {
        dt: 0.01,
        duration: 0.2,
        ..SimConfig::default()
    };

    let a = nbody_ensemble(3, 100)
        .run(&CancelToken::new(), None, cfg)
        .unwrap();
    let b = nbody_ensemble(3, 100)
        .run(&CancelToken::new(), None, cfg)
        .unwrap();

    assert_eq!(a.len(), 3);
    for (ra, rb) in a.iter().zip(&b) {
        assert_eq!(ra.states, rb.states);
        assert_eq!(ra.steps_taken, rb.steps_taken);
    }
}

#[test]
fn distinct_seeds_produce_distinct_trajectories() {
    let cfg = SimConfig {
        dt: 0.01,
        duration: 0.2,
        ..SimConfig::default()
    };

    let results = nbody_ensemble(2, 7)
        .run(&CancelToken::new(), None, cfg)
        .unwrap();

    assert_ne!(
        results[0].final_state(),
        results[1].final_state(),
        "different galaxies must diverge"
    );
}

#[test]
fn distinct_seeds_diverge_for_chaotic_systems() {
    // Seeded jitter on the Lorenz initial condition: any difference blows
    // up within a few time units.
    let ensemble = Ensemble::new(
        Box::new(|seed| {
            let _ = seed;
            Box::new(Lorenz::new())
        }),
        Box::new(|| Box::new(Rk4::new())),
        Box::new(|| Box::new(NoControl::new(0))),
        2,
        1,
    );

    let cfg = SimConfig {
        dt: 0.01,
        duration: 20.0,
        ..SimConfig::default()
    };

    // x0 differs per trial through the seeded system default; emulate with
    // explicit per-trial jitter by running two one-trial ensembles.
    let mut results = Vec::new();
    for seed in [1u64, 2] {
        let jitter = seed as f64 * 1e-6;
        let x0 = State::from_vec(vec![1.0 + jitter, 1.0, 1.0]);
        results.extend(ensemble.run(&CancelToken::new(), Some(&x0), cfg).unwrap());
    }

    let a = results[0].final_state().unwrap();
    let c = results[2].final_state().unwrap();
    assert!(a.sub(c).norm() > 1.0, "chaotic runs failed to separate");
}

#[test]
fn metric_factories_apply_to_every_trial() {
    let mut ensemble = nbody_ensemble(2, 50);
    ensemble.add_metric_factory(Box::new(|| Box::new(Stability::new(1e6))));

    let cfg = SimConfig {
        dt: 0.01,
        duration: 0.1,
        ..SimConfig::default()
    };
    let results = ensemble.run(&CancelToken::new(), None, cfg).unwrap();

    for r in &results {
        assert!(r.metrics.contains_key("stability"));
    }
}

#[test]
fn canceled_token_cancels_all_trials() {
    let token = CancelToken::new();
    token.cancel();

    let cfg = SimConfig {
        dt: 0.01,
        duration: 1.0,
        ..SimConfig::default()
    };
    let results = nbody_ensemble(2, 9).run(&token, None, cfg).unwrap();

    for r in &results {
        assert_eq!(r.steps_taken, 0);
        assert_eq!(r.errors.len(), 1);
    }
}
