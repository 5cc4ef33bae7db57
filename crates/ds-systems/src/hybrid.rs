//! Coupled stars + gas system: n-body gravity shared across both
//! populations, SPH pressure/viscosity among the gas.

use crate::nbody::NBody;
use crate::spatial_hash::SpatialHash;
use crate::sph::{poly6, spiky_grad, visc_lap};
use ds_core::{State, System};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Exp1, StandardNormal};

/// State layout: the star block `[x, y, vx, vy] * n_stars` followed by the
/// gas block `[x, y, vx, vy] * n_gas`. Control `[cursor_x, cursor_y,
/// strength, bass]`; the optional fourth component modulates `G` so the
/// whole structure breathes with an external amplitude signal.
pub struct Hybrid {
    pub stars: NBody,
    pub gas_n: usize,
    pub gas_h: f64,
    pub gas_rho0: f64,
    pub gas_stiffness: f64,
    pub gas_viscosity: f64,
    pub gas_mass: f64,
    grid: SpatialHash,
    all_positions: Vec<f64>,
    all_masses: Vec<f64>,
    rho: Vec<f64>,
    pressure: Vec<f64>,
}

impl Hybrid {
    pub fn new(n_stars: usize, n_gas: usize) -> Self {
        let gas_h = 2.0;
        Self {
            stars: NBody::new(n_stars),
            gas_n: n_gas,
            gas_h,
            gas_rho0: 1.0,
            gas_stiffness: 50.0,
            gas_viscosity: 0.1,
            gas_mass: 1.0,
            grid: SpatialHash::new(gas_h),
            all_positions: vec![0.0; (n_stars + n_gas) * 2],
            all_masses: vec![0.0; n_stars + n_gas],
            rho: vec![0.0; n_gas],
            pressure: vec![0.0; n_gas],
        }
    }

    fn cursor_force(x: f64, y: f64, cursor: (f64, f64, f64)) -> (f64, f64) {
        let (cx, cy, strength) = cursor;
        if strength == 0.0 {
            return (0.0, 0.0);
        }
        let rx = cx - x;
        let ry = cy - y;
        let dist2 = rx * rx + ry * ry + 5.0;
        let dist = dist2.sqrt();
        let f = strength * 20.0 / (dist * dist2);
        (f * rx, f * ry)
    }
}

impl System for Hybrid {
    fn state_dim(&self) -> usize {
        (self.stars.num_bodies + self.gas_n) * 4
    }

    fn control_dim(&self) -> usize {
        3
    }

    fn derive(&mut self, x: &State, u: &[f64], _t: f64) -> State {
        let n_stars = self.stars.num_bodies;
        let n_gas = self.gas_n;
        let mut deriv = State::zeros(x.len());

        let star_state = &x[..n_stars * 4];
        let gas_state = &x[n_stars * 4..];

        // Combined buffers for the shared gravity kernel.
        for i in 0..n_stars {
            self.all_masses[i] = self.stars.masses[i];
            self.all_positions[i * 2] = star_state[i * 4];
            self.all_positions[i * 2 + 1] = star_state[i * 4 + 1];
        }
        for i in 0..n_gas {
            self.all_masses[n_stars + i] = self.gas_mass;
            self.all_positions[(n_stars + i) * 2] = gas_state[i * 4];
            self.all_positions[(n_stars + i) * 2 + 1] = gas_state[i * 4 + 1];
        }

        // Amplitude-reactive gravity: the bass term pumps G on the beat.
        let base_g = self.stars.g;
        let current_g = match u {
            [_, _, _, bass, ..] => base_g * (1.0 + bass * 2.0),
            _ => base_g,
        };

        let (gx, gy) = ds_compute::backend().nbody_forces(
            &self.all_positions,
            &self.all_masses,
            current_g,
            self.stars.softening,
        );

        // SPH among the gas only.
        self.grid
            .rebuild((0..n_gas).map(|i| (gas_state[i * 4], gas_state[i * 4 + 1])));

        let h2 = self.gas_h * self.gas_h;
        for i in 0..n_gas {
            let (xi, yi) = (gas_state[i * 4], gas_state[i * 4 + 1]);
            let mut rho = 0.0;
            self.grid.for_neighbors(xi, yi, |j| {
                let dx = xi - gas_state[j * 4];
                let dy = yi - gas_state[j * 4 + 1];
                let r2 = dx * dx + dy * dy;
                if r2 < h2 {
                    rho += self.gas_mass * poly6(r2, h2);
                }
            });
            self.rho[i] = rho;
            self.pressure[i] = self.gas_stiffness * (rho - self.gas_rho0);
        }

        let mut sph_fx = vec![0.0; n_gas];
        let mut sph_fy = vec![0.0; n_gas];
        for i in 0..n_gas {
            let (xi, yi) = (gas_state[i * 4], gas_state[i * 4 + 1]);
            let (vxi, vyi) = (gas_state[i * 4 + 2], gas_state[i * 4 + 3]);
            let mut fx = 0.0;
            let mut fy = 0.0;

            self.grid.for_neighbors(xi, yi, |j| {
                if i == j {
                    return;
                }
                let dx = xi - gas_state[j * 4];
                let dy = yi - gas_state[j * 4 + 1];
                let dist = (dx * dx + dy * dy).sqrt();
                if dist < self.gas_h {
                    let fp = -self.gas_mass * (self.pressure[i] + self.pressure[j])
                        / (2.0 * self.rho[j])
                        * spiky_grad(dist, self.gas_h);
                    fx += fp * dx / dist;
                    fy += fp * dy / dist;

                    let fv = self.gas_viscosity * self.gas_mass * visc_lap(dist, self.gas_h)
                        / self.rho[j];
                    fx += fv * (gas_state[j * 4 + 2] - vxi);
                    fy += fv * (gas_state[j * 4 + 3] - vyi);
                }
            });

            sph_fx[i] = fx;
            sph_fy[i] = fy;
        }

        let cursor = match u {
            [cx, cy, s, ..] => (*cx, *cy, *s),
            _ => (0.0, 0.0, 0.0),
        };

        // Stars: gravity + cursor.
        for i in 0..n_stars {
            deriv[i * 4] = star_state[i * 4 + 2];
            deriv[i * 4 + 1] = star_state[i * 4 + 3];

            let (cfx, cfy) = Self::cursor_force(star_state[i * 4], star_state[i * 4 + 1], cursor);
            deriv[i * 4 + 2] = gx[i] + cfx;
            deriv[i * 4 + 3] = gy[i] + cfy;
        }

        // Gas: gravity + SPH + cursor + domain walls at +-300.
        for i in 0..n_gas {
            let idx = n_stars * 4 + i * 4;
            let (xi, yi) = (gas_state[i * 4], gas_state[i * 4 + 1]);

            deriv[idx] = gas_state[i * 4 + 2];
            deriv[idx + 1] = gas_state[i * 4 + 3];

            let mut fx = gx[n_stars + i] + sph_fx[i] / self.rho[i];
            let mut fy = gy[n_stars + i] + sph_fy[i] / self.rho[i];

            let (cfx, cfy) = Self::cursor_force(xi, yi, cursor);
            fx += cfx;
            fy += cfy;

            if xi < -300.0 {
                fx += 100.0;
            }
            if xi > 300.0 {
                fx -= 100.0;
            }
            if yi < -300.0 {
                fy += 100.0;
            }
            if yi > 300.0 {
                fy -= 100.0;
            }

            deriv[idx + 2] = fx;
            deriv[idx + 3] = fy;
        }

        deriv
    }

    /// Stars from the galaxy generator; gas as a diffuse orbiting disk.
    fn default_state(&mut self) -> Option<State> {
        // The n-body generator lays positions and velocities out in blocks;
        // repack per body for this system's interleaved layout.
        let star_block = self.stars.default_state()?;
        let n_stars = self.stars.num_bodies;
        let mut star_state = State::zeros(n_stars * 4);
        for i in 0..n_stars {
            star_state[i * 4] = star_block[i * 2];
            star_state[i * 4 + 1] = star_block[i * 2 + 1];
            star_state[i * 4 + 2] = star_block[n_stars * 2 + i * 2];
            star_state[i * 4 + 3] = star_block[n_stars * 2 + i * 2 + 1];
        }
        let mut gas_state = State::zeros(self.gas_n * 4);
        let mut rng = StdRng::seed_from_u64(1337);

        for i in 0..self.gas_n {
            let normal: f64 = rng.sample(StandardNormal);
            let exp: f64 = rng.sample(Exp1);
            let r = (20.0 + normal.abs() * 100.0 + exp * 30.0).min(300.0);
            let angle = rng.gen::<f64>() * 2.0 * std::f64::consts::PI;

            gas_state[i * 4] = r * angle.cos();
            gas_state[i * 4 + 1] = r * angle.sin();

            // Orbital speed against the central mass.
            let v = (self.stars.g * 500_000.0 / r).sqrt();
            gas_state[i * 4 + 2] = -v * angle.sin();
            gas_state[i * 4 + 3] = v * angle.cos();
        }

        let mut full = Vec::with_capacity(star_state.len() + gas_state.len());
        full.extend_from_slice(&star_state);
        full.extend_from_slice(&gas_state);
        Some(State::from_vec(full))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_layout_concatenates_populations() {
        let mut h = Hybrid::new(8, 100);
        assert_eq!(h.state_dim(), (8 + 100) * 4);
        let x0 = h.default_state().unwrap();
        assert_eq!(x0.len(), h.state_dim());
    }

    #[test]
    fn bass_amplifies_gravity() {
        let mut h = Hybrid::new(4, 100);
        let x0 = h.default_state().unwrap();
        let quiet = h.derive(&x0, &[0.0, 0.0, 0.0, 0.0], 0.0);
        let loud = h.derive(&x0, &[0.0, 0.0, 0.0, 1.0], 0.0);

        // Star accelerations scale with G; pick the star with the largest
        // quiet-state pull to dodge near-zero components.
        let (mut best, mut mag) = (0, 0.0);
        for i in 0..4 {
            let m = quiet[i * 4 + 2].abs();
            if m > mag {
                mag = m;
                best = i;
            }
        }
        assert!(loud[best * 4 + 2].abs() > quiet[best * 4 + 2].abs());
    }
}
