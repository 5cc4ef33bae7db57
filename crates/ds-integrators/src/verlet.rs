//! Symplectic steppers for separable `[q, p]` state layouts.
//!
//! Both treat the first half of the state as positions and the second half
//! as velocities, so they require an even state length.

use ds_core::{CoreResult, DynError, Integrator, State, System};

fn check_even(n: usize) -> CoreResult<usize> {
    if n % 2 != 0 {
        return Err(DynError::DimensionMismatch {
            what: "symplectic integrators require an even state length",
        });
    }
    Ok(n / 2)
}

/// Velocity-Verlet: position update from current acceleration, velocity
/// update from the average of old and new accelerations.
#[derive(Debug, Default)]
pub struct VelocityVerlet {
    scratch: State,
}

impl VelocityVerlet {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Integrator for VelocityVerlet {
    fn step(
        &mut self,
        system: &mut dyn System,
        x: &State,
        u: &[f64],
        t: f64,
        dt: f64,
    ) -> CoreResult<State> {
        let n = x.len();
        let half = check_even(n)?;
        if self.scratch.len() != n {
            self.scratch = State::zeros(n);
        }

        let mut result = State::zeros(n);
        let dx = system.derive(x, u, t);
        let dt2 = dt * dt;

        // q' = q + p*dt + a*dt^2/2
        for i in 0..half {
            result[i] = x[i] + x[half + i] * dt + 0.5 * dx[half + i] * dt2;
        }

        // Acceleration at the new positions, old velocities.
        for i in 0..half {
            self.scratch[i] = result[i];
            self.scratch[half + i] = x[half + i];
        }
        let dx_new = system.derive(&self.scratch, u, t + dt);

        let half_dt = 0.5 * dt;
        for i in 0..half {
            result[half + i] = x[half + i] + (dx[half + i] + dx_new[half + i]) * half_dt;
        }

        Ok(result)
    }
}

/// Kick-drift-kick leapfrog.
#[derive(Debug, Default)]
pub struct Leapfrog {
    scratch: State,
}

impl Leapfrog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Integrator for Leapfrog {
    fn step(
        &mut self,
        system: &mut dyn System,
        x: &State,
        u: &[f64],
        t: f64,
        dt: f64,
    ) -> CoreResult<State> {
        let n = x.len();
        let half = check_even(n)?;
        if self.scratch.len() != n {
            self.scratch = State::zeros(n);
        }

        let mut result = State::zeros(n);
        let dx = system.derive(x, u, t);
        let half_dt = dt * 0.5;

        // Kick: half-step velocities.
        for i in 0..half {
            self.scratch[half + i] = x[half + i] + dx[half + i] * half_dt;
        }

        // Drift: full-step positions on half-step velocities.
        for i in 0..half {
            result[i] = x[i] + self.scratch[half + i] * dt;
            self.scratch[i] = result[i];
        }

        let dx_new = system.derive(&self.scratch, u, t + dt);

        // Kick: second half-step velocities.
        for i in 0..half {
            result[half + i] = self.scratch[half + i] + dx_new[half + i] * half_dt;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Spring `q'' = -q` in `[q, p]` layout.
    struct Spring;

    impl System for Spring {
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

    fn energy(x: &State) -> f64 {
        0.5 * (x[0] * x[0] + x[1] * x[1])
    }

    #[test]
    fn verlet_rejects_odd_lengths() {
        let mut verlet = VelocityVerlet::new();

        struct Odd;
        impl System for Odd {
            fn state_dim(&self) -> usize {
                3
            }
            fn control_dim(&self) -> usize {
                0
            }
            fn derive(&mut self, x: &State, _u: &[f64], _t: f64) -> State {
                State::zeros(x.len())
            }
        }

        let err = verlet
            .step(&mut Odd, &State::zeros(3), &[], 0.0, 0.1)
            .unwrap_err();
        assert!(matches!(err, DynError::DimensionMismatch { .. }));
    }

    #[test]
    fn verlet_conserves_spring_energy() {
        let mut verlet = VelocityVerlet::new();
        let mut x = State::from_vec(vec![1.0, 0.0]);
        let e0 = energy(&x);
        let dt = 0.01;
        // 100 / omega0 with omega0 = 1.
        for i in 0..10_000 {
            x = verlet.step(&mut Spring, &x, &[], i as f64 * dt, dt).unwrap();
            assert!((energy(&x) - e0).abs() / e0 < 1e-3);
        }
    }

    #[test]
    fn leapfrog_conserves_spring_energy() {
        let mut leapfrog = Leapfrog::new();
        let mut x = State::from_vec(vec![1.0, 0.0]);
        let e0 = energy(&x);
        let dt = 0.01;
        for i in 0..10_000 {
            x = leapfrog
                .step(&mut Spring, &x, &[], i as f64 * dt, dt)
                .unwrap();
            assert!((energy(&x) - e0).abs() / e0 < 1e-3);
        }
    }

    #[test]
    fn leapfrog_rejects_odd_lengths() {
        let mut leapfrog = Leapfrog::new();

        struct Odd;
        impl System for Odd {
            fn state_dim(&self) -> usize {
                1
            }
            fn control_dim(&self) -> usize {
                0
            }
            fn derive(&mut self, x: &State, _u: &[f64], _t: f64) -> State {
                State::zeros(x.len())
            }
        }

        assert!(leapfrog
            .step(&mut Odd, &State::zeros(1), &[], 0.0, 0.1)
            .is_err());
    }
}
