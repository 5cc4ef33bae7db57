//! Two pendulums joined by a torsional spring.

use ds_core::{Configurable, CoreResult, DynError, State, System, GRAVITY};
use std::collections::BTreeMap;

/// State `[theta1, omega1, theta2, omega2]`. The linear coupling term
/// transfers energy back and forth between the bobs.
#[derive(Debug, Clone)]
pub struct CoupledPendulums {
    pub length: f64,
    pub gravity: f64,
    pub coupling: f64,
    pub mass: f64,
}

impl CoupledPendulums {
    pub fn new() -> Self {
        Self {
            length: 1.0,
            gravity: GRAVITY,
            coupling: 20.0,
            mass: 1.0,
        }
    }
}

impl Default for CoupledPendulums {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CoupledPendulums {
    fn state_dim(&self) -> usize {
        4
    }

    fn control_dim(&self) -> usize {
        0
    }

    fn derive(&mut self, s: &State, _u: &[f64], _t: f64) -> State {
        let (theta1, omega1, theta2, omega2) = (s[0], s[1], s[2], s[3]);

        let coupling = self.coupling * (theta2 - theta1) / self.mass;

        let alpha1 = -self.gravity / self.length * theta1.sin() + coupling / self.length;
        let alpha2 = -self.gravity / self.length * theta2.sin() - coupling / self.length;

        State::from_vec(vec![omega1, alpha1, omega2, alpha2])
    }

    fn default_state(&mut self) -> Option<State> {
        // One bob displaced: beats emerge as energy migrates.
        Some(State::from_vec(vec![0.5, 0.0, 0.0, 0.0]))
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Configurable for CoupledPendulums {
    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("l".into(), self.length),
            ("g".into(), self.gravity),
            ("k".into(), self.coupling),
        ])
    }

    fn set_param(&mut self, name: &str, value: f64) -> CoreResult<()> {
        match name {
            "l" => self.length = value,
            "g" => self.gravity = value,
            "k" => self.coupling = value,
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
    fn coupling_forces_are_opposite() {
        let mut cp = CoupledPendulums::new();
        let dx = cp.derive(&State::from_vec(vec![0.0, 0.0, 0.1, 0.0]), &[], 0.0);
        // Spring pulls bob 1 toward bob 2 and pushes bob 2 back.
        assert!(dx[1] > 0.0);
        assert!(dx[3] < 0.0);
    }

    #[test]
    fn symmetric_displacement_has_no_coupling() {
        let mut cp = CoupledPendulums::new();
        let dx = cp.derive(&State::from_vec(vec![0.2, 0.0, 0.2, 0.0]), &[], 0.0);
        assert!((dx[1] - dx[3]).abs() < 1e-12);
    }
}
