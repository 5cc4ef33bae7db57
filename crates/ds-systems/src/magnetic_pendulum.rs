//! Pendulum bob over a ring of magnets; the classic fractal-basin system.

use ds_core::{Configurable, CoreResult, DynError, Hamiltonian, State, System};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy)]
pub struct Magnet {
    pub x: f64,
    pub y: f64,
    pub strength: f64,
}

/// State `[x, y, vx, vy]` in the horizontal plane. The restoring pull is a
/// linearised pendulum; each magnet attracts with a softened inverse-power
/// law through the vertical gap `height`.
#[derive(Debug, Clone)]
pub struct MagneticPendulum {
    pub magnets: Vec<Magnet>,
    pub height: f64,
    pub damping: f64,
    pub gravity: f64,
    pub magnet_power: f64,
}

impl MagneticPendulum {
    /// Three unit magnets on a ring of radius 1.5.
    pub fn new() -> Self {
        let r = 1.5;
        let magnets = (0..3)
            .map(|i| {
                let angle = i as f64 * 2.0 * std::f64::consts::PI / 3.0;
                Magnet {
                    x: r * angle.cos(),
                    y: r * angle.sin(),
                    strength: 1.0,
                }
            })
            .collect();
        Self {
            magnets,
            height: 0.5,
            damping: 0.2,
            gravity: 0.5,
            magnet_power: 3.0,
        }
    }

    /// Index of the magnet nearest to the bob, or `None` for an empty ring.
    pub fn closest_magnet(&self, s: &State) -> Option<usize> {
        if s.len() < 2 {
            return None;
        }
        let (x, y) = (s[0], s[1]);
        self.magnets
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da = (a.x - x).powi(2) + (a.y - y).powi(2);
                let db = (b.x - x).powi(2) + (b.y - y).powi(2);
                da.total_cmp(&db)
            })
            .map(|(i, _)| i)
    }
}

impl Default for MagneticPendulum {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MagneticPendulum {
    fn state_dim(&self) -> usize {
        4
    }

    fn control_dim(&self) -> usize {
        0
    }

    fn derive(&mut self, s: &State, _u: &[f64], _t: f64) -> State {
        if s.len() < 4 {
            return State::zeros(4);
        }
        let (x, y, vx, vy) = (s[0], s[1], s[2], s[3]);
        let mut fx = -self.gravity * x - self.damping * vx;
        let mut fy = -self.gravity * y - self.damping * vy;

        for mag in &self.magnets {
            let dx = mag.x - x;
            let dy = mag.y - y;
            let dist = (dx * dx + dy * dy + self.height * self.height)
                .sqrt()
                .max(0.1);
            let f = mag.strength / dist.powf(self.magnet_power);
            let hd = (dx * dx + dy * dy).sqrt();
            if hd > 1e-10 {
                fx += f * dx / hd;
                fy += f * dy / hd;
            }
        }

        State::from_vec(vec![vx, vy, fx, fy])
    }

    fn default_state(&mut self) -> Option<State> {
        Some(State::from_vec(vec![0.5, 0.3, 0.0, 0.0]))
    }

    fn as_hamiltonian(&self) -> Option<&dyn Hamiltonian> {
        Some(self)
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Hamiltonian for MagneticPendulum {
    fn energy(&self, s: &State) -> f64 {
        if s.len() < 4 {
            return 0.0;
        }
        let (x, y, vx, vy) = (s[0], s[1], s[2], s[3]);
        let pe = 0.5 * self.gravity * (x * x + y * y);
        let mut mag_pe = 0.0;
        for mag in &self.magnets {
            let dx = mag.x - x;
            let dy = mag.y - y;
            let d = (dx * dx + dy * dy + self.height * self.height).sqrt();
            if d > 1e-10 {
                mag_pe -= mag.strength / d.powf(self.magnet_power - 1.0);
            }
        }
        0.5 * (vx * vx + vy * vy) + pe + mag_pe
    }
}

impl Configurable for MagneticPendulum {
    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("height".into(), self.height),
            ("damping".into(), self.damping),
            ("gravity".into(), self.gravity),
            ("magnetPower".into(), self.magnet_power),
        ])
    }

    fn set_param(&mut self, name: &str, value: f64) -> CoreResult<()> {
        match name {
            "height" => self.height = value,
            "damping" => self.damping = value,
            "gravity" => self.gravity = value,
            "magnetPower" => self.magnet_power = value,
            _ => {
                return Err(DynError::UnknownParam {
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }
}
