//! Energy metrics.

use ds_core::{Metric, State, System};

/// Mean pendulum-like mechanical energy over the observed samples, from the
/// `[theta, omega]` head of the state.
pub struct Energy {
    mass: f64,
    length: f64,
    gravity: f64,
    samples: usize,
    total: f64,
}

impl Energy {
    pub fn new(mass: f64, length: f64, gravity: f64) -> Self {
        Self {
            mass,
            length,
            gravity,
            samples: 0,
            total: 0.0,
        }
    }
}

impl Metric for Energy {
    fn name(&self) -> &str {
        "energy"
    }

    fn observe(&mut self, x: &State, _u: &[f64], _t: f64) {
        if x.len() < 2 {
            return;
        }
        let (theta, omega) = (x[0], x[1]);
        let ke = 0.5 * self.mass * self.length * self.length * omega * omega;
        let pe = self.mass * self.gravity * self.length * (1.0 - theta.cos());
        self.total += ke + pe;
        self.samples += 1;
    }

    fn value(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.total / self.samples as f64
    }

    fn reset(&mut self) {
        self.total = 0.0;
        self.samples = 0;
    }
}

/// Worst-case relative energy drift `max |E - E0| / |E0|` against the first
/// observed sample. Holds its own instance of the system to read energy
/// from; reports 0 when the system is not Hamiltonian.
pub struct EnergyDrift {
    system: Box<dyn System>,
    initial: f64,
    max_drift: f64,
    samples: usize,
}

impl EnergyDrift {
    pub fn new(system: Box<dyn System>) -> Self {
        Self {
            system,
            initial: 0.0,
            max_drift: 0.0,
            samples: 0,
        }
    }
}

impl Metric for EnergyDrift {
    fn name(&self) -> &str {
        "energy_drift"
    }

    fn observe(&mut self, x: &State, _u: &[f64], _t: f64) {
        let Some(h) = self.system.as_hamiltonian() else {
            return;
        };
        let energy = h.energy(x);

        if self.samples == 0 {
            self.initial = energy;
        }
        self.samples += 1;

        if self.initial != 0.0 {
            let drift = (energy - self.initial).abs() / self.initial.abs();
            self.max_drift = self.max_drift.max(drift);
        }
    }

    fn value(&self) -> f64 {
        self.max_drift
    }

    fn reset(&mut self) {
        self.initial = 0.0;
        self.max_drift = 0.0;
        self.samples = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ds_systems::{CartPole, Pendulum};

    #[test]
    fn mean_energy_of_constant_samples() {
        let mut m = Energy::new(1.0, 1.0, 9.81);
        let x = State::from_vec(vec![0.0, 1.0]);
        m.observe(&x, &[], 0.0);
        m.observe(&x, &[], 0.1);
        assert!((m.value() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn reset_matches_fresh_metric() {
        let x = State::from_vec(vec![0.3, 0.7]);

        let mut used = Energy::new(1.0, 1.0, 9.81);
        used.observe(&x, &[], 0.0);
        used.observe(&x, &[], 0.1);
        used.reset();
        used.observe(&x, &[], 0.0);

        let mut fresh = Energy::new(1.0, 1.0, 9.81);
        fresh.observe(&x, &[], 0.0);

        assert_eq!(used.value(), fresh.value());
    }

    #[test]
    fn drift_tracks_worst_excursion() {
        let mut m = EnergyDrift::new(Box::new(Pendulum::undamped()));
        m.observe(&State::from_vec(vec![0.5, 0.0]), &[], 0.0);
        // Same angle, extra speed: higher energy.
        m.observe(&State::from_vec(vec![0.5, 1.0]), &[], 0.1);
        let peak = m.value();
        assert!(peak > 0.0);
        // Returning to the initial energy must not lower the maximum.
        m.observe(&State::from_vec(vec![0.5, 0.0]), &[], 0.2);
        assert_eq!(m.value(), peak);
    }

    #[test]
    fn non_hamiltonian_system_reports_zero() {
        let mut m = EnergyDrift::new(Box::new(CartPole::new()));
        m.observe(&State::zeros(4), &[], 0.0);
        assert_eq!(m.value(), 0.0);
    }
}
