//! PID controller on the first state component.

use ds_core::{Configurable, Control, Controller, CoreResult, DynError, State};
use std::collections::BTreeMap;

/// Classic PID acting on `x[0]` against a scalar target.
///
/// The first call records the error and returns the proportional term only;
/// subsequent calls accumulate the integral and differentiate against the
/// previous error. A non-positive `dt` between calls falls back to the
/// proportional term without touching the accumulated state.
#[derive(Debug, Clone)]
pub struct Pid {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub target: f64,
    integral: f64,
    prev_err: f64,
    prev_t: f64,
    first: bool,
}

impl Pid {
    pub fn new(kp: f64, ki: f64, kd: f64, target: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            target,
            integral: 0.0,
            prev_err: 0.0,
            prev_t: 0.0,
            first: true,
        }
    }
}

impl Controller for Pid {
    fn compute(&mut self, x: &State, t: f64) -> Control {
        if x.len() < 2 {
            return vec![0.0];
        }

        let err = self.target - x[0];

        if self.first {
            self.prev_err = err;
            self.prev_t = t;
            self.first = false;
            return vec![self.kp * err];
        }

        let dt = t - self.prev_t;
        if dt > 0.0 {
            self.integral += err * dt;
            let derivative = (err - self.prev_err) / dt;

            let u = self.kp * err + self.ki * self.integral + self.kd * derivative;

            self.prev_err = err;
            self.prev_t = t;

            return vec![u];
        }
        vec![self.kp * err]
    }

    fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_err = 0.0;
        self.prev_t = 0.0;
        self.first = true;
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Configurable for Pid {
    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("Kp".into(), self.kp),
            ("Ki".into(), self.ki),
            ("Kd".into(), self.kd),
            ("Target".into(), self.target),
        ])
    }

    fn set_param(&mut self, name: &str, value: f64) -> CoreResult<()> {
        match name {
            "Kp" => self.kp = value,
            "Ki" => self.ki = value,
            "Kd" => self.kd = value,
            "Target" => self.target = value,
            _ => {
                return Err(DynError::UnknownParam {
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_is_proportional_only() {
        let mut pid = Pid::new(2.0, 1.0, 1.0, 1.0);
        let u = pid.compute(&State::from_vec(vec![0.0, 0.0]), 0.0);
        assert_eq!(u, vec![2.0]);
    }

    #[test]
    fn integral_accumulates_constant_error() {
        let mut pid = Pid::new(1.0, 1.0, 0.0, 1.0);
        let x = State::from_vec(vec![0.0, 0.0]);
        pid.compute(&x, 0.0);
        for i in 1..=10 {
            pid.compute(&x, i as f64 * 0.1);
        }
        // Error 1.0 for 1 second: integral term adds about 1.0.
        let u = pid.compute(&x, 1.1);
        assert!(u[0] > 1.9);
    }

    #[test]
    fn zero_dt_falls_back_to_proportional() {
        let mut pid = Pid::new(1.0, 100.0, 100.0, 1.0);
        let x = State::from_vec(vec![0.0, 0.0]);
        pid.compute(&x, 1.0);
        let u = pid.compute(&x, 1.0);
        assert_eq!(u, vec![1.0]);
        // Repeated stalls must not corrupt the accumulated state.
        let moving = pid.compute(&x, 1.1);
        assert!(moving[0].is_finite());
    }

    #[test]
    fn reset_restores_first_call_semantics() {
        let mut pid = Pid::new(1.0, 1.0, 1.0, 1.0);
        let x = State::from_vec(vec![0.0, 0.0]);
        pid.compute(&x, 0.0);
        pid.compute(&x, 0.5);
        pid.reset();
        let after = pid.compute(&x, 2.0);
        // Same output as a fresh controller's first call.
        assert_eq!(after, vec![1.0]);
    }

    #[test]
    fn short_state_yields_zero_control() {
        let mut pid = Pid::new(1.0, 1.0, 1.0, 1.0);
        assert_eq!(pid.compute(&State::from_vec(vec![0.5]), 0.0), vec![0.0]);
    }

    #[test]
    fn params_round_trip() {
        let mut pid = Pid::new(1.0, 2.0, 3.0, 4.0);
        pid.set_param("Kp", 10.0).unwrap();
        assert_eq!(pid.params()["Kp"], 10.0);
        assert!(pid.set_param("Kq", 0.0).is_err());
    }
}
