//! Single damped pendulum.

use ds_core::{Configurable, CoreResult, DynError, Hamiltonian, State, System, GRAVITY};
use std::collections::BTreeMap;

/// State `[theta, omega]`, control `[torque]`.
#[derive(Debug, Clone)]
pub struct Pendulum {
    pub mass: f64,
    pub length: f64,
    pub damping: f64,
    pub gravity: f64,
}

impl Pendulum {
    pub fn new() -> Self {
        Self {
            mass: 1.0,
            length: 1.0,
            damping: 0.1,
            gravity: GRAVITY,
        }
    }

    /// Frictionless variant, useful for conservation checks.
    pub fn undamped() -> Self {
        Self {
            damping: 0.0,
            ..Self::new()
        }
    }
}

impl Default for Pendulum {
    fn default() -> Self {
        Self::new()
    }
}

impl System for Pendulum {
    fn state_dim(&self) -> usize {
        2
    }

    fn control_dim(&self) -> usize {
        1
    }

    fn derive(&mut self, x: &State, u: &[f64], _t: f64) -> State {
        let theta = x[0];
        let omega = x[1];
        let torque = u.first().copied().unwrap_or(0.0);

        let alpha = (-self.damping * omega - self.mass * self.gravity * self.length * theta.sin()
            + torque)
            / (self.mass * self.length * self.length);

        State::from_vec(vec![omega, alpha])
    }

    fn as_hamiltonian(&self) -> Option<&dyn Hamiltonian> {
        Some(self)
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Hamiltonian for Pendulum {
    fn energy(&self, x: &State) -> f64 {
        let v = self.length * x[1];
        let ke = 0.5 * self.mass * v * v;
        let pe = self.mass * self.gravity * self.length * (1.0 - x[0].cos());
        ke + pe
    }
}

impl Configurable for Pendulum {
    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("mass".into(), self.mass),
            ("length".into(), self.length),
            ("damping".into(), self.damping),
            ("gravity".into(), self.gravity),
        ])
    }

    fn set_param(&mut self, name: &str, value: f64) -> CoreResult<()> {
        match name {
            "mass" => self.mass = value,
            "length" => self.length = value,
            "damping" => self.damping = value,
            "gravity" => self.gravity = value,
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
    fn rest_at_bottom_is_equilibrium() {
        let mut p = Pendulum::new();
        let dx = p.derive(&State::zeros(2), &[0.0], 0.0);
        assert_eq!(dx.as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn restoring_torque_opposes_displacement() {
        let mut p = Pendulum::undamped();
        let dx = p.derive(&State::from_vec(vec![0.3, 0.0]), &[0.0], 0.0);
        assert!(dx[1] < 0.0);
    }

    #[test]
    fn energy_at_rest_is_zero() {
        let p = Pendulum::new();
        assert_eq!(p.energy(&State::zeros(2)), 0.0);
    }

    #[test]
    fn unknown_param_is_rejected() {
        let mut p = Pendulum::new();
        assert!(p.set_param("mass", 2.0).is_ok());
        assert!(p.set_param("bogus", 1.0).is_err());
        assert_eq!(p.params()["mass"], 2.0);
    }
}
