//! Chain of masses between fixed walls; a discrete wave medium.

use ds_core::{Configurable, CoreResult, DynError, State, System};
use std::collections::BTreeMap;

/// State `[x1, v1, x2, v2, ..., xN, vN]` (displacement, velocity pairs).
#[derive(Debug, Clone)]
pub struct MassChain {
    pub n: usize,
    pub stiffness: f64,
    pub mass: f64,
    pub damping: f64,
}

impl MassChain {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            stiffness: 100.0,
            mass: 1.0,
            damping: 0.1,
        }
    }
}

impl System for MassChain {
    fn state_dim(&self) -> usize {
        self.n * 2
    }

    fn control_dim(&self) -> usize {
        0
    }

    fn derive(&mut self, s: &State, _u: &[f64], _t: f64) -> State {
        let mut deriv = State::zeros(self.n * 2);

        for i in 0..self.n {
            let x = s[i * 2];
            let v = s[i * 2 + 1];

            // Springs to the neighbours, walls at both ends.
            let left = if i > 0 { s[(i - 1) * 2] } else { 0.0 };
            let right = if i < self.n - 1 { s[(i + 1) * 2] } else { 0.0 };

            let mut force = self.stiffness * (left - x) + self.stiffness * (right - x);
            force -= self.damping * v;

            deriv[i * 2] = v;
            deriv[i * 2 + 1] = force / self.mass;
        }

        deriv
    }

    /// Initial pulse on the first two masses.
    fn default_state(&mut self) -> Option<State> {
        let mut state = State::zeros(self.n * 2);
        if self.n > 0 {
            state[0] = 1.0;
        }
        if self.n > 2 {
            state[2] = 0.5;
        }
        Some(state)
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Configurable for MassChain {
    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("k".into(), self.stiffness),
            ("damping".into(), self.damping),
        ])
    }

    fn set_param(&mut self, name: &str, value: f64) -> CoreResult<()> {
        match name {
            "k" => self.stiffness = value,
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
