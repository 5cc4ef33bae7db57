//! Particle in a bistable quartic potential.

use ds_core::{Configurable, CoreResult, DynError, Hamiltonian, State, System};
use std::collections::BTreeMap;

/// State `[x, v]`, control `[external force]`. Potential
/// `V(x) = A (x^2 - B)^2` with minima at `x = +-sqrt(B)`.
#[derive(Debug, Clone)]
pub struct DoubleWell {
    pub a: f64,
    pub b: f64,
    pub mass: f64,
    pub damping: f64,
}

impl DoubleWell {
    pub fn new() -> Self {
        Self {
            a: 1.0,
            b: 1.0,
            mass: 1.0,
            damping: 0.1,
        }
    }
}

impl Default for DoubleWell {
    fn default() -> Self {
        Self::new()
    }
}

impl System for DoubleWell {
    fn state_dim(&self) -> usize {
        2
    }

    fn control_dim(&self) -> usize {
        1
    }

    fn derive(&mut self, s: &State, u: &[f64], _t: f64) -> State {
        if s.len() < 2 {
            return State::zeros(2);
        }
        let (x, v) = (s[0], s[1]);
        let ef = u.first().copied().unwrap_or(0.0);
        State::from_vec(vec![
            v,
            (-4.0 * self.a * x * (x * x - self.b) - self.damping * v + ef) / self.mass,
        ])
    }

    fn default_state(&mut self) -> Option<State> {
        // Slightly above the right-hand minimum.
        Some(State::from_vec(vec![self.b.sqrt() + 0.1, 0.0]))
    }

    fn as_hamiltonian(&self) -> Option<&dyn Hamiltonian> {
        Some(self)
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Hamiltonian for DoubleWell {
    fn energy(&self, s: &State) -> f64 {
        if s.len() < 2 {
            return 0.0;
        }
        let (x, v) = (s[0], s[1]);
        0.5 * self.mass * v * v + self.a * (x * x - self.b).powi(2)
    }
}

impl Configurable for DoubleWell {
    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("A".into(), self.a),
            ("B".into(), self.b),
            ("mass".into(), self.mass),
            ("damping".into(), self.damping),
        ])
    }

    fn set_param(&mut self, name: &str, value: f64) -> CoreResult<()> {
        match name {
            "A" => self.a = value,
            "B" => self.b = value,
            "mass" => self.mass = value,
            "damping" => self.damping = value,
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
    fn wells_are_equilibria() {
        let mut dw = DoubleWell::new();
        for x in [-1.0, 1.0] {
            let dx = dw.derive(&State::from_vec(vec![x, 0.0]), &[0.0], 0.0);
            assert!(dx[1].abs() < 1e-12, "x={x}: {}", dx[1]);
        }
    }

    #[test]
    fn hilltop_is_unstable() {
        let mut dw = DoubleWell::new();
        let dx = dw.derive(&State::from_vec(vec![0.01, 0.0]), &[0.0], 0.0);
        // Pushed away from the barrier at x = 0.
        assert!(dx[1] > 0.0);
    }

    #[test]
    fn well_energy_is_zero_at_minimum() {
        let dw = DoubleWell::new();
        assert!(dw.energy(&State::from_vec(vec![1.0, 0.0])).abs() < 1e-12);
    }
}
