//! Cart-pole (inverted pendulum on a cart).

use ds_core::{State, System, GRAVITY};

/// Standard Barto-Sutton dynamics. State `[x, x_dot, theta, omega]` with
/// theta measured from the upright position; control `[force on cart]`.
#[derive(Debug, Clone)]
pub struct CartPole {
    pub cart_mass: f64,
    pub pole_mass: f64,
    pub pole_length: f64,
    pub gravity: f64,
}

impl CartPole {
    pub fn new() -> Self {
        Self {
            cart_mass: 1.0,
            pole_mass: 0.1,
            pole_length: 1.0,
            gravity: GRAVITY,
        }
    }
}

impl Default for CartPole {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CartPole {
    fn state_dim(&self) -> usize {
        4
    }

    fn control_dim(&self) -> usize {
        1
    }

    fn derive(&mut self, x: &State, u: &[f64], _t: f64) -> State {
        let vel = x[1];
        let theta = x[2];
        let omega = x[3];
        let force = u.first().copied().unwrap_or(0.0);

        let mc = self.cart_mass;
        let mp = self.pole_mass;
        let l = self.pole_length;
        let g = self.gravity;

        let (sin_t, cos_t) = theta.sin_cos();

        let temp = (force + mp * l * omega * sin_t) / (mc + mp);
        let theta_acc =
            (g * sin_t - cos_t * temp) / (l * (4.0 / 3.0 - mp * cos_t * cos_t / (mc + mp)));
        let x_acc = temp - mp * l * theta_acc * cos_t / (mc + mp);

        State::from_vec(vec![vel, x_acc, omega, theta_acc])
    }
}
