//! Gravitational three-body problem.

use ds_core::{Configurable, CoreResult, DynError, State, System};
use std::collections::BTreeMap;

/// State `[x1, y1, vx1, vy1, x2, y2, vx2, vy2, x3, y3, vx3, vy3]`.
/// Distances are softened to avoid the collision singularity.
#[derive(Debug, Clone)]
pub struct ThreeBody {
    pub m1: f64,
    pub m2: f64,
    pub m3: f64,
    pub g: f64,
    pub softening: f64,
}

impl ThreeBody {
    pub fn new() -> Self {
        Self {
            m1: 1.0,
            m2: 1.0,
            m3: 1.0,
            g: 1.0,
            softening: 0.1,
        }
    }
}

impl Default for ThreeBody {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ThreeBody {
    fn state_dim(&self) -> usize {
        12
    }

    fn control_dim(&self) -> usize {
        0
    }

    fn derive(&mut self, s: &State, _u: &[f64], _t: f64) -> State {
        let (x1, y1, vx1, vy1) = (s[0], s[1], s[2], s[3]);
        let (x2, y2, vx2, vy2) = (s[4], s[5], s[6], s[7]);
        let (x3, y3, vx3, vy3) = (s[8], s[9], s[10], s[11]);
        let eps2 = self.softening * self.softening;

        let r12 = ((x2 - x1).powi(2) + (y2 - y1).powi(2) + eps2).sqrt();
        let r13 = ((x3 - x1).powi(2) + (y3 - y1).powi(2) + eps2).sqrt();
        let r23 = ((x3 - x2).powi(2) + (y3 - y2).powi(2) + eps2).sqrt();

        let (c12, c13, c23) = (r12 * r12 * r12, r13 * r13 * r13, r23 * r23 * r23);

        let ax1 = self.g * self.m2 * (x2 - x1) / c12 + self.g * self.m3 * (x3 - x1) / c13;
        let ay1 = self.g * self.m2 * (y2 - y1) / c12 + self.g * self.m3 * (y3 - y1) / c13;

        let ax2 = self.g * self.m1 * (x1 - x2) / c12 + self.g * self.m3 * (x3 - x2) / c23;
        let ay2 = self.g * self.m1 * (y1 - y2) / c12 + self.g * self.m3 * (y3 - y2) / c23;

        let ax3 = self.g * self.m1 * (x1 - x3) / c13 + self.g * self.m2 * (x2 - x3) / c23;
        let ay3 = self.g * self.m1 * (y1 - y3) / c13 + self.g * self.m2 * (y2 - y3) / c23;

        State::from_vec(vec![
            vx1, vy1, ax1, ay1, vx2, vy2, ax2, ay2, vx3, vy3, ax3, ay3,
        ])
    }

    /// Approximate figure-eight choreography initial conditions.
    fn default_state(&mut self) -> Option<State> {
        Some(State::from_vec(vec![
            -1.0, 0.0, 0.347, 0.532, // body 1
            1.0, 0.0, 0.347, 0.532, // body 2
            0.0, 0.0, -0.694, -1.064, // body 3
        ]))
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Configurable for ThreeBody {
    fn params(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("m1".into(), self.m1),
            ("m2".into(), self.m2),
            ("m3".into(), self.m3),
            ("g".into(), self.g),
        ])
    }

    fn set_param(&mut self, name: &str, value: f64) -> CoreResult<()> {
        match name {
            "m1" => self.m1 = value,
            "m2" => self.m2 = value,
            "m3" => self.m3 = value,
            "g" => self.g = value,
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
    fn symmetric_triangle_pulls_inward() {
        let mut tb = ThreeBody::new();
        let x = State::from_vec(vec![
            1.0, 0.0, 0.0, 0.0, //
            -0.5, 0.866, 0.0, 0.0, //
            -0.5, -0.866, 0.0, 0.0,
        ]);
        let dx = tb.derive(&x, &[], 0.0);
        // Body 1 sits on +x; the other two pull it toward the origin.
        assert!(dx[2] < 0.0);
        assert!(dx[3].abs() < 1e-9);
    }

    #[test]
    fn figure_eight_momentum_is_near_zero() {
        let mut tb = ThreeBody::new();
        let x = tb.default_state().unwrap();
        let px = tb.m1 * x[2] + tb.m2 * x[6] + tb.m3 * x[10];
        let py = tb.m1 * x[3] + tb.m2 * x[7] + tb.m3 * x[11];
        assert!(px.abs() < 1e-9);
        assert!(py.abs() < 1e-9);
    }
}
