//! Planar quadrotor.

use ds_core::{Hamiltonian, State, System, GRAVITY};

/// State `[x, y, theta, vx, vy, omega]`, control `[thrust_left,
/// thrust_right]`. Thrusts are clipped to be non-negative; translation sees
/// linear drag, rotation sees its own drag coefficient.
#[derive(Debug, Clone)]
pub struct Drone {
    pub mass: f64,
    pub inertia: f64,
    pub arm_length: f64,
    pub gravity: f64,
    pub drag: f64,
    pub angular_drag: f64,
}

impl Drone {
    pub fn new() -> Self {
        Self {
            mass: 1.0,
            inertia: 0.1,
            arm_length: 0.25,
            gravity: GRAVITY,
            drag: 0.1,
            angular_drag: 0.05,
        }
    }

    /// Per-rotor thrust that exactly cancels gravity.
    pub fn hover_thrust(&self) -> f64 {
        self.mass * self.gravity / 2.0
    }
}

impl Default for Drone {
    fn default() -> Self {
        Self::new()
    }
}

impl System for Drone {
    fn state_dim(&self) -> usize {
        6
    }

    fn control_dim(&self) -> usize {
        2
    }

    fn derive(&mut self, x: &State, u: &[f64], _t: f64) -> State {
        let (theta, vx, vy, omega) = (x[2], x[3], x[4], x[5]);

        let (thrust_l, thrust_r) = match u {
            [l, r, ..] => (*l, *r),
            [total] => (total / 2.0, total / 2.0),
            [] => (0.0, 0.0),
        };
        let thrust_l = thrust_l.max(0.0);
        let thrust_r = thrust_r.max(0.0);

        let total_thrust = thrust_l + thrust_r;
        let torque = (thrust_r - thrust_l) * self.arm_length;

        let (sin, cos) = theta.sin_cos();
        let fx = -total_thrust * sin - self.drag * vx;
        let fy = total_thrust * cos - self.mass * self.gravity - self.drag * vy;

        let ax = fx / self.mass;
        let ay = fy / self.mass;
        let alpha = (torque - self.angular_drag * omega) / self.inertia;

        State::from_vec(vec![vx, vy, omega, ax, ay, alpha])
    }

    fn as_hamiltonian(&self) -> Option<&dyn Hamiltonian> {
        Some(self)
    }
}

impl Hamiltonian for Drone {
    fn energy(&self, x: &State) -> f64 {
        let (y, vx, vy, omega) = (x[1], x[3], x[4], x[5]);
        let ke = 0.5 * self.mass * (vx * vx + vy * vy);
        let ke_rot = 0.5 * self.inertia * omega * omega;
        let pe = self.mass * self.gravity * y;
        ke + ke_rot + pe
    }
}
