//! 1-D wave equation on a fixed string, finite differences.

use ds_core::{Configurable, CoreResult, DynError, Hamiltonian, State, System};
use std::collections::BTreeMap;

/// State `[u_0..u_{N-1}, v_0..v_{N-1}]` (displacements then velocities).
/// Endpoints are pinned; interior points follow `u_tt = c^2 u_xx - d u_t`.
#[derive(Debug, Clone)]
pub struct Wave {
    pub n: usize,
    pub length: f64,
    pub wave_speed: f64,
    pub damping: f64,
    dx: f64,
}

impl Wave {
    pub fn new(n: usize) -> Self {
        let n = n.max(3);
        Self {
            n,
            length: 1.0,
            wave_speed: 1.0,
            damping: 0.01,
            dx: 1.0 / (n - 1) as f64,
        }
    }
}

impl System for Wave {
    fn state_dim(&self) -> usize {
        2 * self.n
    }

    fn control_dim(&self) -> usize {
        0
    }

    fn derive(&mut self, s: &State, _u: &[f64], _t: f64) -> State {
        let n = self.n;
        if s.len() < 2 * n {
            return State::zeros(2 * n);
        }
        let mut deriv = State::zeros(2 * n);
        let c2 = self.wave_speed * self.wave_speed;
        let h2 = self.dx * self.dx;

        for i in 0..n {
            deriv[i] = s[n + i];
            if i == 0 || i == n - 1 {
                deriv[n + i] = -self.damping * s[n + i];
            } else {
                deriv[n + i] =
                    c2 * (s[i - 1] - 2.0 * s[i] + s[i + 1]) / h2 - self.damping * s[n + i];
            }
        }
        deriv
    }

    /// Triangular pluck at the midpoint.
    fn default_state(&mut self) -> Option<State> {
        let mut s = State::zeros(2 * self.n);
        let c = self.n / 2;
        let amp = 0.5;
        for i in 0..self.n {
            if i <= c {
                s[i] = amp * i as f64 / c as f64;
            } else {
                s[i] = amp * (self.n - 1 - i) as f64 / (self.n - 1 - c) as f64;
            }
        }
        Some(s)
    }

    fn as_hamiltonian(&self) -> Option<&dyn Hamiltonian> {
        Some(self)
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Hamiltonian for Wave {
    fn energy(&self, s: &State) -> f64 {
        let n = self.n;
        if s.len() < 2 * n {
            return 0.0;
        }
        let c2 = self.wave_speed * self.wave_speed;
        let mut ke = 0.0;
        let mut pe = 0.0;
        for i in 0..n {
            let v = s[n + i];
            ke += 0.5 * v * v;
            if i < n - 1 {
                let dudx = (s[i + 1] - s[i]) / self.dx;
                pe += 0.5 * c2 * dudx * dudx;
            }
        }
        ke + pe
    }
}

impl Configurable for Wave {
    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("waveSpeed".into(), self.wave_speed),
            ("damping".into(), self.damping),
            ("length".into(), self.length),
        ])
    }

    fn set_param(&mut self, name: &str, value: f64) -> CoreResult<()> {
        match name {
            "waveSpeed" => self.wave_speed = value,
            "damping" => self.damping = value,
            "length" => {
                self.length = value;
                self.dx = value / (self.n - 1) as f64;
            }
            _ => {
                return Err(DynError::UnknownParam {
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }
}
