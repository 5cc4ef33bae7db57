//! Planar double pendulum, full nonlinear equations.

use ds_core::{Hamiltonian, State, System, GRAVITY};

/// State `[theta1, theta2, omega1, omega2]`, control `[torque on bob 1]`.
#[derive(Debug, Clone)]
pub struct DoublePendulum {
    pub m1: f64,
    pub m2: f64,
    pub l1: f64,
    pub l2: f64,
    pub gravity: f64,
}

impl DoublePendulum {
    pub fn new() -> Self {
        Self {
            m1: 1.0,
            m2: 1.0,
            l1: 1.0,
            l2: 1.0,
            gravity: GRAVITY,
        }
    }
}

impl Default for DoublePendulum {
    fn default() -> Self {
        Self::new()
    }
}

impl System for DoublePendulum {
    fn state_dim(&self) -> usize {
        4
    }

    fn control_dim(&self) -> usize {
        1
    }

    fn derive(&mut self, x: &State, u: &[f64], _t: f64) -> State {
        let (theta1, theta2, omega1, omega2) = (x[0], x[1], x[2], x[3]);
        let (m1, m2, l1, l2, g) = (self.m1, self.m2, self.l1, self.l2, self.gravity);

        let delta = theta2 - theta1;
        let (sin_d, cos_d) = delta.sin_cos();
        let tau = u.first().copied().unwrap_or(0.0);

        let den1 = (m1 + m2) * l1 - m2 * l1 * cos_d * cos_d;
        let den2 = (l2 / l1) * den1;

        let alpha1 = (m2 * l1 * omega1 * omega1 * sin_d * cos_d
            + m2 * g * theta2.sin() * cos_d
            + m2 * l2 * omega2 * omega2 * sin_d
            - (m1 + m2) * g * theta1.sin()
            + tau)
            / den1;

        let alpha2 = (-m2 * l2 * omega2 * omega2 * sin_d * cos_d
            + (m1 + m2) * g * theta1.sin() * cos_d
            - (m1 + m2) * l1 * omega1 * omega1 * sin_d
            - (m1 + m2) * g * theta2.sin())
            / den2;

        State::from_vec(vec![omega1, omega2, alpha1, alpha2])
    }

    fn default_state(&mut self) -> Option<State> {
        Some(State::from_vec(vec![0.5, 0.5, 0.0, 0.0]))
    }

    fn as_hamiltonian(&self) -> Option<&dyn Hamiltonian> {
        Some(self)
    }
}

impl Hamiltonian for DoublePendulum {
    fn energy(&self, x: &State) -> f64 {
        let (theta1, theta2, omega1, omega2) = (x[0], x[1], x[2], x[3]);
        let (m1, m2, l1, l2, g) = (self.m1, self.m2, self.l1, self.l2, self.gravity);

        let v1_sq = l1 * l1 * omega1 * omega1;
        let v2_sq = l1 * l1 * omega1 * omega1
            + l2 * l2 * omega2 * omega2
            + 2.0 * l1 * l2 * omega1 * omega2 * (theta1 - theta2).cos();

        let ke = 0.5 * m1 * v1_sq + 0.5 * m2 * v2_sq;
        let y1 = -l1 * theta1.cos();
        let y2 = y1 - l2 * theta2.cos();
        let pe = m1 * g * y1 + m2 * g * y2;

        ke + pe
    }
}
