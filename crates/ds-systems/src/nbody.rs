//! Softened gravitational n-body system with a galaxy initial-condition
//! generator.

use ds_core::{Hamiltonian, State, System};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Exp1, StandardNormal};

/// Body count at or above which forces go through the compute backend.
const BACKEND_CUTOFF: usize = 32;

/// State layout `[x_0, y_0, .., x_{n-1}, y_{n-1}, vx_0, vy_0, ..]`:
/// positions in the first half, velocities in the second, so the symplectic
/// steppers' position/velocity split lines up with the physics. Control is
/// an optional 3-vector `[cursor_x, cursor_y, strength]` adding a softened
/// inverse-square pull toward the cursor.
pub struct NBody {
    pub num_bodies: usize,
    pub masses: Vec<f64>,
    pub g: f64,
    pub softening: f64,
    seed: u64,
    positions: Vec<f64>,
}

impl NBody {
    pub fn new(n: usize) -> Self {
        Self::with_seed(n, 42)
    }

    /// The seed fully determines the generated galaxy.
    pub fn with_seed(n: usize, seed: u64) -> Self {
        Self {
            num_bodies: n,
            masses: vec![1.0; n],
            g: 1.0,
            softening: 0.01,
            seed,
            positions: vec![0.0; n * 2],
        }
    }

    fn accelerations(&mut self, x: &State) -> (Vec<f64>, Vec<f64>) {
        let n = self.num_bodies;
        self.positions.copy_from_slice(&x[..n * 2]);

        if n >= BACKEND_CUTOFF {
            ds_compute::backend().nbody_forces(&self.positions, &self.masses, self.g, self.softening)
        } else {
            self.accelerations_serial(x)
        }
    }

    fn accelerations_serial(&self, x: &State) -> (Vec<f64>, Vec<f64>) {
        let n = self.num_bodies;
        let mut ax = vec![0.0; n];
        let mut ay = vec![0.0; n];
        let eps2 = self.softening * self.softening;

        for i in 0..n {
            let (xi, yi) = (x[i * 2], x[i * 2 + 1]);
            for j in 0..n {
                if i == j {
                    continue;
                }
                let rx = x[j * 2] - xi;
                let ry = x[j * 2 + 1] - yi;
                let r2 = rx * rx + ry * ry + eps2;
                let inv = 1.0 / r2.sqrt();
                let inv3 = inv * inv * inv;
                let f = self.g * self.masses[j] * inv3;
                ax[i] += f * rx;
                ay[i] += f * ry;
            }
        }
        (ax, ay)
    }

    /// Total linear momentum `(px, py)`.
    pub fn momentum(&self, x: &State) -> (f64, f64) {
        let base = self.num_bodies * 2;
        let mut px = 0.0;
        let mut py = 0.0;
        for i in 0..self.num_bodies {
            px += self.masses[i] * x[base + i * 2];
            py += self.masses[i] * x[base + i * 2 + 1];
        }
        (px, py)
    }

    /// Total angular momentum about the origin.
    pub fn angular_momentum(&self, x: &State) -> f64 {
        let base = self.num_bodies * 2;
        (0..self.num_bodies)
            .map(|i| {
                let (xi, yi) = (x[i * 2], x[i * 2 + 1]);
                let (vx, vy) = (x[base + i * 2], x[base + i * 2 + 1]);
                self.masses[i] * (xi * vy - yi * vx)
            })
            .sum()
    }
}

impl System for NBody {
    fn state_dim(&self) -> usize {
        self.num_bodies * 4
    }

    fn control_dim(&self) -> usize {
        3
    }

    fn derive(&mut self, x: &State, u: &[f64], _t: f64) -> State {
        let n = self.num_bodies;
        let base = n * 2;
        let mut dx = State::zeros(x.len());

        let (ax, ay) = self.accelerations(x);

        let (cursor_x, cursor_y, cursor_str) = match u {
            [cx, cy, s] => (*cx, *cy, *s),
            _ => (0.0, 0.0, 0.0),
        };

        for i in 0..n {
            dx[i * 2] = x[base + i * 2];
            dx[i * 2 + 1] = x[base + i * 2 + 1];

            let (mut ix, mut iy) = (0.0, 0.0);
            if cursor_str != 0.0 {
                let (xi, yi) = (x[i * 2], x[i * 2 + 1]);
                let rx = cursor_x - xi;
                let ry = cursor_y - yi;
                let dist2 = rx * rx + ry * ry + 5.0;
                let dist = dist2.sqrt();
                let f = cursor_str * 20.0 / (dist * dist2);
                ix = f * rx;
                iy = f * ry;
            }

            dx[base + i * 2] = ax[i] + ix;
            dx[base + i * 2 + 1] = ay[i] + iy;
        }

        dx
    }

    /// Galaxy generator: supermassive central body, dense bulge, spiral
    /// disk, scattered halo. A stability pre-pass then sets each body on a
    /// circular orbit against the actual generated mass distribution, plus
    /// a population-dependent velocity dispersion.
    fn default_state(&mut self) -> Option<State> {
        let n = self.num_bodies;
        let base = n * 2;
        let mut state = State::zeros(n * 4);
        let mut rng = StdRng::seed_from_u64(self.seed);

        let n_bulge = (n as f64 * 0.10) as usize;
        let n_halo = (n as f64 * 0.05) as usize;
        let n_disk = n.saturating_sub(n_bulge + n_halo);

        // Supermassive anchor at the origin.
        if n > 0 {
            self.masses[0] = 500_000.0;
        }

        let mut idx = 1;

        // Bulge: compact and spherical.
        for _ in 0..n_bulge {
            if idx >= n {
                break;
            }
            let normal: f64 = rng.sample(StandardNormal);
            let r = normal.abs() * 20.0;
            let theta = rng.gen::<f64>() * 2.0 * std::f64::consts::PI;
            state[idx * 2] = r * theta.cos();
            state[idx * 2 + 1] = r * theta.sin();
            idx += 1;
        }

        // Disk: two spiral arms with exponential density falloff.
        let arms = 2.0;
        let arm_twist = 5.0;
        for i in 0..n_disk {
            if idx >= n {
                break;
            }
            let normal: f64 = rng.sample(StandardNormal);
            let exp: f64 = rng.sample(Exp1);
            let r = (20.0 + normal.abs() * 100.0 + exp * 30.0).min(300.0);

            let base_angle = ((i % arms as usize) as f64 / arms) * 2.0 * std::f64::consts::PI;
            let angle = base_angle + arm_twist * (r / 20.0).ln() + (rng.gen::<f64>() - 0.5) * 0.5;

            state[idx * 2] = r * angle.cos();
            state[idx * 2 + 1] = r * angle.sin();
            idx += 1;
        }

        // Halo: distant and scattered.
        for _ in 0..n_halo {
            if idx >= n {
                break;
            }
            let normal: f64 = rng.sample(StandardNormal);
            let r = 100.0 + normal.abs() * 200.0;
            let theta = rng.gen::<f64>() * 2.0 * std::f64::consts::PI;
            state[idx * 2] = r * theta.cos();
            state[idx * 2 + 1] = r * theta.sin();
            idx += 1;
        }

        // Stability pre-pass: evaluate the actual acceleration field of the
        // generated configuration and set circular-orbit velocities against
        // it, so the disk does not collapse in the first few steps.
        tracing::info!(bodies = n, "computing initial gravity for galaxy stability");
        let (ax, ay) = self.accelerations(&state);

        for i in 1..n {
            let (xi, yi) = (state[i * 2], state[i * 2 + 1]);
            let dist = (xi * xi + yi * yi).sqrt();
            if dist < 0.1 {
                continue;
            }

            let a_mag = (ax[i] * ax[i] + ay[i] * ay[i]).sqrt();
            let v = (a_mag * dist).sqrt();

            let (ux, uy) = (xi / dist, yi / dist);

            // Tangent (-y, x): counter-clockwise rotation.
            state[base + i * 2] = -v * uy;
            state[base + i * 2 + 1] = v * ux;

            // Velocity dispersion ("temperature") per population.
            let dispersion = if i < n_bulge {
                v * 0.4
            } else if i > n - n_halo {
                v * 0.5
            } else {
                v * 0.05
            };

            state[base + i * 2] += (rng.gen::<f64>() - 0.5) * dispersion;
            state[base + i * 2 + 1] += (rng.gen::<f64>() - 0.5) * dispersion;
        }

        Some(state)
    }

    fn as_hamiltonian(&self) -> Option<&dyn Hamiltonian> {
        Some(self)
    }
}

impl Hamiltonian for NBody {
    fn energy(&self, x: &State) -> f64 {
        let n = self.num_bodies;
        let base = n * 2;
        let mut ke = 0.0;
        let mut pe = 0.0;
        let eps2 = self.softening * self.softening;

        for i in 0..n {
            let (vx, vy) = (x[base + i * 2], x[base + i * 2 + 1]);
            ke += 0.5 * self.masses[i] * (vx * vx + vy * vy);

            for j in (i + 1)..n {
                let rx = x[j * 2] - x[i * 2];
                let ry = x[j * 2 + 1] - x[i * 2 + 1];
                let r = (rx * rx + ry * ry + eps2).sqrt();
                pe -= self.g * self.masses[i] * self.masses[j] / r;
            }
        }

        ke + pe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ds_core::Integrator;
    use ds_integrators::Leapfrog;

    fn random_cluster(n: usize, seed: u64) -> State {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = State::zeros(n * 4);
        for i in 0..n * 2 {
            state[i] = rng.gen_range(-20.0..20.0);
            state[n * 2 + i] = rng.gen_range(-0.5..0.5);
        }
        state
    }

    #[test]
    fn two_bodies_attract() {
        let mut nb = NBody::new(2);
        // Positions (-1, 0) and (1, 0), both at rest.
        let x = State::from_vec(vec![-1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let dx = nb.derive(&x, &[], 0.0);
        assert!(dx[4] > 0.0, "left body pulled right");
        assert!(dx[6] < 0.0, "right body pulled left");
    }

    #[test]
    fn momentum_conserved_without_control() {
        let mut nb = NBody::new(100);
        let mut leapfrog = Leapfrog::new();
        let x0 = random_cluster(100, 3);
        let (px0, py0) = nb.momentum(&x0);

        let mut x = x0;
        let dt = 0.005;
        for i in 0..1_000 {
            x = leapfrog.step(&mut nb, &x, &[], i as f64 * dt, dt).unwrap();
        }

        let (px, py) = nb.momentum(&x);
        let drift = ((px - px0).powi(2) + (py - py0).powi(2)).sqrt();
        let scale = (px0 * px0 + py0 * py0).sqrt();
        assert!(drift < 1e-6 * scale.max(1.0), "momentum drift {drift}");
    }

    #[test]
    fn galaxy_is_seed_deterministic() {
        let a = NBody::with_seed(64, 7).default_state().unwrap();
        let b = NBody::with_seed(64, 7).default_state().unwrap();
        let c = NBody::with_seed(64, 8).default_state().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn galaxy_prepass_sets_orbital_velocities() {
        let state = NBody::with_seed(64, 42).default_state().unwrap();
        let base = 64 * 2;
        let moving = (1..64)
            .filter(|&i| {
                let v = (state[base + i * 2].powi(2) + state[base + i * 2 + 1].powi(2)).sqrt();
                v > 1.0
            })
            .count();
        assert!(moving > 48, "only {moving}/63 bodies got orbital speed");
    }

    #[test]
    fn cursor_control_pulls_bodies() {
        let mut nb = NBody::new(1);
        let x = State::from_vec(vec![0.0, 0.0, 0.0, 0.0]);
        let dx = nb.derive(&x, &[10.0, 0.0, 1.0], 0.0);
        assert!(dx[2] > 0.0);
    }
}
