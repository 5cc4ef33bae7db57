//! Classical 4th-order Runge-Kutta.

use ds_core::{CoreResult, Integrator, State, System};

/// Four derivative evaluations at `(t, t+dt/2, t+dt/2, t+dt)` combined with
/// weights `(1, 2, 2, 1)/6`. Stage and scratch buffers are kept on the
/// stepper and resized only when the state dimension changes.
#[derive(Debug, Default)]
pub struct Rk4 {
    k1: Vec<f64>,
    k2: Vec<f64>,
    k3: Vec<f64>,
    k4: Vec<f64>,
    scratch: State,
}

impl Rk4 {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_scratch(&mut self, n: usize) {
        if self.k1.len() != n {
            self.k1 = vec![0.0; n];
            self.k2 = vec![0.0; n];
            self.k3 = vec![0.0; n];
            self.k4 = vec![0.0; n];
            self.scratch = State::zeros(n);
        }
    }
}

impl Integrator for Rk4 {
    fn step(
        &mut self,
        system: &mut dyn System,
        x: &State,
        u: &[f64],
        t: f64,
        dt: f64,
    ) -> CoreResult<State> {
        let n = x.len();
        self.ensure_scratch(n);

        let k1 = system.derive(x, u, t);
        self.k1.copy_from_slice(&k1);

        for i in 0..n {
            self.scratch[i] = x[i] + dt * 0.5 * self.k1[i];
        }
        let k2 = system.derive(&self.scratch, u, t + dt * 0.5);
        self.k2.copy_from_slice(&k2);

        for i in 0..n {
            self.scratch[i] = x[i] + dt * 0.5 * self.k2[i];
        }
        let k3 = system.derive(&self.scratch, u, t + dt * 0.5);
        self.k3.copy_from_slice(&k3);

        for i in 0..n {
            self.scratch[i] = x[i] + dt * self.k3[i];
        }
        let k4 = system.derive(&self.scratch, u, t + dt);
        self.k4.copy_from_slice(&k4);

        let dt6 = dt / 6.0;
        Ok((0..n)
            .map(|i| x[i] + dt6 * (self.k1[i] + 2.0 * self.k2[i] + 2.0 * self.k3[i] + self.k4[i]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Harmonic oscillator `x'' = -x` as a first-order pair.
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

    #[test]
    fn preserves_dimension() {
        let mut rk4 = Rk4::new();
        let x = State::from_vec(vec![1.0, 0.0]);
        let next = rk4.step(&mut Harmonic, &x, &[], 0.0, 0.01).unwrap();
        assert_eq!(next.len(), 2);
    }

    #[test]
    fn tracks_cosine_over_one_period() {
        use approx::assert_abs_diff_eq;

        let mut rk4 = Rk4::new();
        let mut x = State::from_vec(vec![1.0, 0.0]);
        let dt = 0.01;
        let steps = (2.0 * std::f64::consts::PI / dt) as usize;
        for i in 0..steps {
            x = rk4.step(&mut Harmonic, &x, &[], i as f64 * dt, dt).unwrap();
        }
        // Back near (1, 0) after a full period.
        assert_abs_diff_eq!(x[0], (steps as f64 * dt).cos(), epsilon = 1e-6);
    }

    #[test]
    fn scratch_resizes_between_systems() {
        struct Flat(usize);
        impl System for Flat {
            fn state_dim(&self) -> usize {
                self.0
            }
            fn control_dim(&self) -> usize {
                0
            }
            fn derive(&mut self, x: &State, _u: &[f64], _t: f64) -> State {
                State::zeros(x.len())
            }
        }

        let mut rk4 = Rk4::new();
        rk4.step(&mut Flat(2), &State::zeros(2), &[], 0.0, 0.1)
            .unwrap();
        let out = rk4
            .step(&mut Flat(5), &State::zeros(5), &[], 0.0, 0.1)
            .unwrap();
        assert_eq!(out.len(), 5);
    }
}
