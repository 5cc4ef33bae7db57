//! Dormand-Prince 5(4) embedded pair.

use ds_core::{AdaptiveIntegrator, AdaptiveStep, CoreResult, Integrator, State, System};

// Canonical Dormand-Prince tableau. These constants are an interface
// contract: the embedded 4th-order weights below are expressed as the
// difference against the 5th-order row, which is what feeds the error
// estimate directly.
const A2: f64 = 1.0 / 5.0;
const A3: f64 = 3.0 / 10.0;
const A4: f64 = 4.0 / 5.0;
const A5: f64 = 8.0 / 9.0;

const B21: f64 = 1.0 / 5.0;
const B31: f64 = 3.0 / 40.0;
const B32: f64 = 9.0 / 40.0;
const B41: f64 = 44.0 / 45.0;
const B42: f64 = -56.0 / 15.0;
const B43: f64 = 32.0 / 9.0;
const B51: f64 = 19372.0 / 6561.0;
const B52: f64 = -25360.0 / 2187.0;
const B53: f64 = 64448.0 / 6561.0;
const B54: f64 = -212.0 / 729.0;
const B61: f64 = 9017.0 / 3168.0;
const B62: f64 = -355.0 / 33.0;
const B63: f64 = 46732.0 / 5247.0;
const B64: f64 = 49.0 / 176.0;
const B65: f64 = -5103.0 / 18656.0;

const C1: f64 = 35.0 / 384.0;
const C3: f64 = 500.0 / 1113.0;
const C4: f64 = 125.0 / 192.0;
const C5: f64 = -2187.0 / 6784.0;
const C6: f64 = 11.0 / 84.0;

const DC1: f64 = C1 - 5179.0 / 57600.0;
const DC3: f64 = C3 - 7571.0 / 16695.0;
const DC4: f64 = C4 - 393.0 / 640.0;
const DC5: f64 = C5 - -92097.0 / 339200.0;
const DC6: f64 = C6 - 187.0 / 2100.0;
const DC7: f64 = -1.0 / 40.0;

/// Seven derivative evaluations yielding a 5th-order estimate plus an
/// embedded 4th-order error estimate for step control.
#[derive(Debug)]
pub struct Rk45 {
    safety: f64,
    min_scale: f64,
    max_scale: f64,
    stage: State,
}

impl Rk45 {
    pub fn new() -> Self {
        Self {
            safety: 0.9,
            min_scale: 0.2,
            max_scale: 10.0,
            stage: State::zeros(0),
        }
    }
}

impl Default for Rk45 {
    fn default() -> Self {
        Self::new()
    }
}

impl Integrator for Rk45 {
    /// Non-adaptive wrapper: runs the embedded pair at a fixed tolerance of
    /// 1e-6 and discards the step-size proposal.
    fn step(
        &mut self,
        system: &mut dyn System,
        x: &State,
        u: &[f64],
        t: f64,
        dt: f64,
    ) -> CoreResult<State> {
        Ok(self.step_adaptive(system, x, u, t, dt, 1e-6)?.state)
    }

    fn as_adaptive(&mut self) -> Option<&mut dyn AdaptiveIntegrator> {
        Some(self)
    }
}

impl AdaptiveIntegrator for Rk45 {
    fn step_adaptive(
        &mut self,
        system: &mut dyn System,
        x: &State,
        u: &[f64],
        t: f64,
        dt: f64,
        tol: f64,
    ) -> CoreResult<AdaptiveStep> {
        let n = x.len();
        if self.stage.len() != n {
            self.stage = State::zeros(n);
        }

        let k1 = system.derive(x, u, t);

        for i in 0..n {
            self.stage[i] = x[i] + dt * B21 * k1[i];
        }
        let k2 = system.derive(&self.stage, u, t + A2 * dt);

        for i in 0..n {
            self.stage[i] = x[i] + dt * (B31 * k1[i] + B32 * k2[i]);
        }
        let k3 = system.derive(&self.stage, u, t + A3 * dt);

        for i in 0..n {
            self.stage[i] = x[i] + dt * (B41 * k1[i] + B42 * k2[i] + B43 * k3[i]);
        }
        let k4 = system.derive(&self.stage, u, t + A4 * dt);

        for i in 0..n {
            self.stage[i] = x[i] + dt * (B51 * k1[i] + B52 * k2[i] + B53 * k3[i] + B54 * k4[i]);
        }
        let k5 = system.derive(&self.stage, u, t + A5 * dt);

        for i in 0..n {
            self.stage[i] = x[i]
                + dt * (B61 * k1[i] + B62 * k2[i] + B63 * k3[i] + B64 * k4[i] + B65 * k5[i]);
        }
        let k6 = system.derive(&self.stage, u, t + dt);

        let x_new: State = (0..n)
            .map(|i| {
                x[i] + dt * (C1 * k1[i] + C3 * k3[i] + C4 * k4[i] + C5 * k5[i] + C6 * k6[i])
            })
            .collect();

        let k7 = system.derive(&x_new, u, t + dt);

        let mut err_max: f64 = 0.0;
        for i in 0..n {
            let err_est = dt
                * (DC1 * k1[i]
                    + DC3 * k3[i]
                    + DC4 * k4[i]
                    + DC5 * k5[i]
                    + DC6 * k6[i]
                    + DC7 * k7[i]);
            let scale = x[i].abs() + (dt * k1[i]).abs() + 1e-10;
            err_max = err_max.max(err_est.abs() / scale);
        }

        let err_ratio = err_max / tol;
        let dt_next = if err_ratio > 1.0 {
            // Rejected quality: shrink for the retry.
            dt * self.min_scale.max(self.safety * err_ratio.powf(-0.25))
        } else if err_ratio > 0.0 {
            dt * self.max_scale.min(self.safety * err_ratio.powf(-0.2))
        } else {
            dt * self.max_scale
        };

        Ok(AdaptiveStep {
            state: x_new,
            dt_next,
            error: err_max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn error_estimate_shrinks_with_dt() {
        let mut rk45 = Rk45::new();
        let x = State::from_vec(vec![1.0, 0.0]);

        let coarse = rk45
            .step_adaptive(&mut Harmonic, &x, &[], 0.0, 0.5, 1e-6)
            .unwrap();
        let fine = rk45
            .step_adaptive(&mut Harmonic, &x, &[], 0.0, 0.01, 1e-6)
            .unwrap();
        assert!(fine.error < coarse.error);
    }

    #[test]
    fn proposes_growth_when_error_is_small() {
        let mut rk45 = Rk45::new();
        let x = State::from_vec(vec![1.0, 0.0]);
        let step = rk45
            .step_adaptive(&mut Harmonic, &x, &[], 0.0, 1e-4, 1e-6)
            .unwrap();
        assert!(step.dt_next > 1e-4);
        assert!(step.dt_next <= 1e-4 * 10.0);
    }

    #[test]
    fn proposes_shrink_when_tolerance_exceeded() {
        let mut rk45 = Rk45::new();
        let x = State::from_vec(vec![1.0, 0.0]);
        let step = rk45
            .step_adaptive(&mut Harmonic, &x, &[], 0.0, 1.0, 1e-12)
            .unwrap();
        assert!(step.error > 1e-12);
        assert!(step.dt_next < 1.0);
        assert!(step.dt_next >= 0.2);
    }

    #[test]
    fn long_run_stays_on_the_circle() {
        let mut rk45 = Rk45::new();
        let mut x = State::from_vec(vec![1.0, 0.0]);
        let dt = 0.01;
        for i in 0..10_000 {
            x = rk45.step(&mut Harmonic, &x, &[], i as f64 * dt, dt).unwrap();
        }
        let radius = x.norm();
        assert!((radius - 1.0).abs() < 1e-6);
    }
}
