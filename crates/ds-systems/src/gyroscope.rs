//! Spinning top via Euler's rigid-body equations.

use ds_core::{Configurable, CoreResult, DynError, Hamiltonian, State, System, GRAVITY};
use std::collections::BTreeMap;

/// State `[w1, w2, w3, theta, phi, psi]`: body-frame angular velocities
/// followed by Euler angles. The sin(theta) in the kinematic map is floored
/// to avoid the gimbal singularity.
#[derive(Debug, Clone)]
pub struct Gyroscope {
    pub i1: f64,
    pub i2: f64,
    pub i3: f64,
    pub gravity: f64,
    pub mass: f64,
    pub length: f64,
}

impl Gyroscope {
    pub fn new() -> Self {
        Self {
            i1: 1.0,
            i2: 1.0,
            i3: 2.0,
            gravity: GRAVITY,
            mass: 1.0,
            length: 0.5,
        }
    }
}

impl Default for Gyroscope {
    fn default() -> Self {
        Self::new()
    }
}

impl System for Gyroscope {
    fn state_dim(&self) -> usize {
        6
    }

    fn control_dim(&self) -> usize {
        0
    }

    fn derive(&mut self, s: &State, _u: &[f64], _t: f64) -> State {
        if s.len() < 6 {
            return State::zeros(6);
        }
        let (w1, w2, w3, theta) = (s[0], s[1], s[2], s[3]);
        let mut sin_t = theta.sin();
        let cos_t = theta.cos();
        if sin_t.abs() < 1e-10 {
            sin_t = 1e-10;
        }

        let dw1 = ((self.i2 - self.i3) / self.i1) * w2 * w3
            + (self.mass * self.gravity * self.length * sin_t) / self.i1;
        let dw2 = ((self.i3 - self.i1) / self.i2) * w3 * w1;
        let dw3 = ((self.i1 - self.i2) / self.i3) * w1 * w2;

        State::from_vec(vec![dw1, dw2, dw3, w1, w2 / sin_t, w3 - w2 * cos_t / sin_t])
    }

    fn default_state(&mut self) -> Option<State> {
        // Fast spin about the symmetry axis, small initial tilt.
        Some(State::from_vec(vec![0.0, 0.0, 10.0, 0.3, 0.0, 0.0]))
    }

    fn as_hamiltonian(&self) -> Option<&dyn Hamiltonian> {
        Some(self)
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Hamiltonian for Gyroscope {
    fn energy(&self, s: &State) -> f64 {
        if s.len() < 6 {
            return 0.0;
        }
        let (w1, w2, w3, theta) = (s[0], s[1], s[2], s[3]);
        0.5 * (self.i1 * w1 * w1 + self.i2 * w2 * w2 + self.i3 * w3 * w3)
            + self.mass * self.gravity * self.length * theta.cos()
    }
}

impl Configurable for Gyroscope {
    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("I1".into(), self.i1),
            ("I2".into(), self.i2),
            ("I3".into(), self.i3),
            ("gravity".into(), self.gravity),
            ("mass".into(), self.mass),
            ("length".into(), self.length),
        ])
    }

    fn set_param(&mut self, name: &str, value: f64) -> CoreResult<()> {
        match name {
            "I1" => self.i1 = value,
            "I2" => self.i2 = value,
            "I3" => self.i3 = value,
            "gravity" => self.gravity = value,
            "mass" => self.mass = value,
            "length" => self.length = value,
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
    fn symmetric_spin_has_no_euler_coupling() {
        let mut g = Gyroscope::new();
        // Pure spin about axis 3 with i1 == i2: dw3 = 0, dw2 = 0.
        let dx = g.derive(&State::from_vec(vec![0.0, 0.0, 10.0, 0.3, 0.0, 0.0]), &[], 0.0);
        assert_eq!(dx[1], 0.0);
        assert_eq!(dx[2], 0.0);
        // Gravity torque tips axis 1.
        assert!(dx[0] > 0.0);
    }

    #[test]
    fn spin_rate_enters_psi_kinematics() {
        let mut g = Gyroscope::new();
        let dx = g.derive(&State::from_vec(vec![0.0, 0.0, 5.0, 0.5, 0.0, 0.0]), &[], 0.0);
        assert!((dx[5] - 5.0).abs() < 1e-12);
    }
}
