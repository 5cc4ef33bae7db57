//! Canonical chaotic flows and nonlinear oscillators.

use ds_core::{Configurable, CoreResult, DynError, Hamiltonian, State, System};
use std::collections::BTreeMap;

/// Lorenz system. State `[x, y, z]`.
#[derive(Debug, Clone)]
pub struct Lorenz {
    pub sigma: f64,
    pub rho: f64,
    pub beta: f64,
}

impl Lorenz {
    pub fn new() -> Self {
        Self {
            sigma: 10.0,
            rho: 28.0,
            beta: 8.0 / 3.0,
        }
    }
}

impl Default for Lorenz {
    fn default() -> Self {
        Self::new()
    }
}

impl System for Lorenz {
    fn state_dim(&self) -> usize {
        3
    }

    fn control_dim(&self) -> usize {
        0
    }

    fn derive(&mut self, s: &State, _u: &[f64], _t: f64) -> State {
        State::from_vec(vec![
            self.sigma * (s[1] - s[0]),
            s[0] * (self.rho - s[2]) - s[1],
            s[0] * s[1] - self.beta * s[2],
        ])
    }

    fn default_state(&mut self) -> Option<State> {
        Some(State::from_vec(vec![1.0, 1.0, 1.0]))
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Configurable for Lorenz {
    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("sigma".into(), self.sigma),
            ("rho".into(), self.rho),
            ("beta".into(), self.beta),
        ])
    }

    fn set_param(&mut self, name: &str, value: f64) -> CoreResult<()> {
        match name {
            "sigma" => self.sigma = value,
            "rho" => self.rho = value,
            "beta" => self.beta = value,
            _ => {
                return Err(DynError::UnknownParam {
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }
}

/// Rossler system. State `[x, y, z]`.
#[derive(Debug, Clone)]
pub struct Rossler {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Rossler {
    pub fn new() -> Self {
        Self {
            a: 0.2,
            b: 0.2,
            c: 5.7,
        }
    }
}

impl Default for Rossler {
    fn default() -> Self {
        Self::new()
    }
}

impl System for Rossler {
    fn state_dim(&self) -> usize {
        3
    }

    fn control_dim(&self) -> usize {
        0
    }

    fn derive(&mut self, s: &State, _u: &[f64], _t: f64) -> State {
        State::from_vec(vec![
            -s[1] - s[2],
            s[0] + self.a * s[1],
            self.b + s[2] * (s[0] - self.c),
        ])
    }

    fn default_state(&mut self) -> Option<State> {
        Some(State::from_vec(vec![1.0, 1.0, 1.0]))
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Configurable for Rossler {
    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("a".into(), self.a),
            ("b".into(), self.b),
            ("c".into(), self.c),
        ])
    }

    fn set_param(&mut self, name: &str, value: f64) -> CoreResult<()> {
        match name {
            "a" => self.a = value,
            "b" => self.b = value,
            "c" => self.c = value,
            _ => {
                return Err(DynError::UnknownParam {
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }
}

/// Van der Pol oscillator. State `[x, y]` with `y = dx/dt`:
///
///   dx/dt = y
///   dy/dt = mu (1 - x^2) y - x
#[derive(Debug, Clone)]
pub struct VanDerPol {
    pub mu: f64,
}

impl VanDerPol {
    pub fn new() -> Self {
        // Classic value for a pronounced limit cycle.
        Self { mu: 1.0 }
    }
}

impl Default for VanDerPol {
    fn default() -> Self {
        Self::new()
    }
}

impl System for VanDerPol {
    fn state_dim(&self) -> usize {
        2
    }

    fn control_dim(&self) -> usize {
        0
    }

    fn derive(&mut self, s: &State, _u: &[f64], _t: f64) -> State {
        let (x, y) = (s[0], s[1]);
        State::from_vec(vec![y, self.mu * (1.0 - x * x) * y - x])
    }

    fn default_state(&mut self) -> Option<State> {
        Some(State::from_vec(vec![2.0, 0.0]))
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Configurable for VanDerPol {
    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([("mu".into(), self.mu)])
    }

    fn set_param(&mut self, name: &str, value: f64) -> CoreResult<()> {
        if name == "mu" {
            self.mu = value;
            Ok(())
        } else {
            Err(DynError::UnknownParam {
                name: name.to_string(),
            })
        }
    }
}

/// Duffing forced oscillator. State `[x, v, phi]` where `phi` carries the
/// drive phase so the system stays autonomous.
#[derive(Debug, Clone)]
pub struct Duffing {
    pub alpha: f64,
    pub beta: f64,
    pub delta: f64,
    pub gamma: f64,
    pub omega: f64,
}

impl Duffing {
    pub fn new() -> Self {
        Self {
            alpha: -1.0,
            beta: 1.0,
            delta: 0.3,
            gamma: 0.5,
            omega: 1.2,
        }
    }
}

impl Default for Duffing {
    fn default() -> Self {
        Self::new()
    }
}

impl System for Duffing {
    fn state_dim(&self) -> usize {
        3
    }

    fn control_dim(&self) -> usize {
        0
    }

    fn derive(&mut self, s: &State, _u: &[f64], _t: f64) -> State {
        if s.len() < 3 {
            return State::zeros(3);
        }
        let (x, v, phi) = (s[0], s[1], s[2]);
        State::from_vec(vec![
            v,
            -self.delta * v - self.alpha * x - self.beta * x * x * x + self.gamma * phi.cos(),
            self.omega,
        ])
    }

    fn default_state(&mut self) -> Option<State> {
        Some(State::from_vec(vec![1.0, 0.0, 0.0]))
    }

    fn as_hamiltonian(&self) -> Option<&dyn Hamiltonian> {
        Some(self)
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Hamiltonian for Duffing {
    /// Energy of the unforced, undamped skeleton.
    fn energy(&self, s: &State) -> f64 {
        if s.len() < 2 {
            return 0.0;
        }
        let (x, v) = (s[0], s[1]);
        0.5 * v * v + 0.5 * self.alpha * x * x + 0.25 * self.beta * x * x * x * x
    }
}

impl Configurable for Duffing {
    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("alpha".into(), self.alpha),
            ("beta".into(), self.beta),
            ("delta".into(), self.delta),
            ("gamma".into(), self.gamma),
            ("omega".into(), self.omega),
        ])
    }

    fn set_param(&mut self, name: &str, value: f64) -> CoreResult<()> {
        match name {
            "alpha" => self.alpha = value,
            "beta" => self.beta = value,
            "delta" => self.delta = value,
            "gamma" => self.gamma = value,
            "omega" => self.omega = value,
            _ => {
                return Err(DynError::UnknownParam {
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }
}
