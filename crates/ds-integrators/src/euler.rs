//! Explicit Euler.

use ds_core::{CoreResult, Integrator, State, System};

/// `x' = x + dt * f(x, u, t)`. One derivative evaluation per step.
#[derive(Debug, Default, Clone)]
pub struct Euler;

impl Euler {
    pub fn new() -> Self {
        Euler
    }
}

impl Integrator for Euler {
    fn step(
        &mut self,
        system: &mut dyn System,
        x: &State,
        u: &[f64],
        t: f64,
        dt: f64,
    ) -> CoreResult<State> {
        let dx = system.derive(x, u, t);
        Ok(x.iter()
            .zip(dx.iter())
            .map(|(xi, di)| xi + dt * di)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ds_core::Control;

    struct Decay;

    impl System for Decay {
        fn state_dim(&self) -> usize {
            1
        }
        fn control_dim(&self) -> usize {
            0
        }
        fn derive(&mut self, x: &State, _u: &[f64], _t: f64) -> State {
            State::from_vec(vec![-x[0]])
        }
    }

    #[test]
    fn single_step_decay() {
        let mut euler = Euler::new();
        let x = State::from_vec(vec![1.0]);
        let u = Control::new();
        let next = euler.step(&mut Decay, &x, &u, 0.0, 0.1).unwrap();
        assert!((next[0] - 0.9).abs() < 1e-12);
    }

    #[test]
    fn empty_state_passes_through() {
        let mut euler = Euler::new();

        struct Empty;
        impl System for Empty {
            fn state_dim(&self) -> usize {
                0
            }
            fn control_dim(&self) -> usize {
                0
            }
            fn derive(&mut self, _x: &State, _u: &[f64], _t: f64) -> State {
                State::zeros(0)
            }
        }

        let next = euler
            .step(&mut Empty, &State::zeros(0), &[], 0.0, 0.1)
            .unwrap();
        assert!(next.is_empty());
    }
}
