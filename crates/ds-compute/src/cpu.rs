//! Multi-threaded CPU backend.

use crate::ComputeBackend;
use rayon::prelude::*;

/// Threshold below which the serial half-matrix path wins.
const PARALLEL_CUTOFF: usize = 16;

/// Worker-pool backend. Each worker accumulates into a private acceleration
/// pair; the driver sums the pairs afterwards, so the inner loop carries no
/// atomics and no shared writes.
pub struct CpuBackend {
    workers: usize,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self {
            workers: rayon::current_num_threads(),
        }
    }

    fn nbody_serial(pos: &[f64], masses: &[f64], g: f64, eps: f64, ax: &mut [f64], ay: &mut [f64]) {
        let n = masses.len();
        let eps2 = eps * eps;

        for i in 0..n {
            let (xi, yi) = (pos[i * 2], pos[i * 2 + 1]);
            // Newton's third law: visit each pair once.
            for j in (i + 1)..n {
                let rx = pos[j * 2] - xi;
                let ry = pos[j * 2 + 1] - yi;
                let r2 = rx * rx + ry * ry + eps2;
                let r_inv = 1.0 / r2.sqrt();
                let r3_inv = r_inv * r_inv * r_inv;

                let fij = g * masses[j] * r3_inv;
                ax[i] += fij * rx;
                ay[i] += fij * ry;

                let fji = g * masses[i] * r3_inv;
                ax[j] -= fji * rx;
                ay[j] -= fji * ry;
            }
        }
    }

    fn nbody_parallel(
        &self,
        pos: &[f64],
        masses: &[f64],
        g: f64,
        eps: f64,
        ax: &mut [f64],
        ay: &mut [f64],
    ) {
        let n = masses.len();
        let eps2 = eps * eps;
        let chunk = n.div_ceil(self.workers);

        let partials: Vec<(Vec<f64>, Vec<f64>)> = (0..self.workers)
            .into_par_iter()
            .map(|w| {
                let start = w * chunk;
                let end = ((w + 1) * chunk).min(n);
                let mut lax = vec![0.0; n];
                let mut lay = vec![0.0; n];

                for i in start..end {
                    let (xi, yi) = (pos[i * 2], pos[i * 2 + 1]);
                    let mut fx = 0.0;
                    let mut fy = 0.0;

                    for j in 0..n {
                        if i == j {
                            continue;
                        }
                        let rx = pos[j * 2] - xi;
                        let ry = pos[j * 2 + 1] - yi;
                        let r2 = rx * rx + ry * ry + eps2;
                        let r_inv = 1.0 / r2.sqrt();
                        let r3_inv = r_inv * r_inv * r_inv;
                        let f = g * masses[j] * r3_inv;
                        fx += f * rx;
                        fy += f * ry;
                    }
                    lax[i] = fx;
                    lay[i] = fy;
                }
                (lax, lay)
            })
            .collect();

        for (lax, lay) in &partials {
            for i in 0..n {
                ax[i] += lax[i];
                ay[i] += lay[i];
            }
        }
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn available(&self) -> bool {
        true
    }

    fn nbody_forces(
        &self,
        positions: &[f64],
        masses: &[f64],
        g: f64,
        softening: f64,
    ) -> (Vec<f64>, Vec<f64>) {
        let n = masses.len();
        let mut ax = vec![0.0; n];
        let mut ay = vec![0.0; n];

        if n < PARALLEL_CUTOFF {
            Self::nbody_serial(positions, masses, g, softening, &mut ax, &mut ay);
        } else {
            self.nbody_parallel(positions, masses, g, softening, &mut ax, &mut ay);
        }
        (ax, ay)
    }

    fn matvec(&self, mat: &[Vec<f64>], vec: &[f64]) -> Vec<f64> {
        let row_product = |row: &Vec<f64>| -> f64 {
            row.iter().zip(vec.iter()).map(|(m, v)| m * v).sum()
        };

        if mat.len() < PARALLEL_CUTOFF {
            mat.iter().map(row_product).collect()
        } else {
            mat.par_iter().map(row_product).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn brute_force(pos: &[f64], masses: &[f64], g: f64, eps: f64) -> (Vec<f64>, Vec<f64>) {
        let n = masses.len();
        let mut ax = vec![0.0; n];
        let mut ay = vec![0.0; n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let rx = pos[j * 2] - pos[i * 2];
                let ry = pos[j * 2 + 1] - pos[i * 2 + 1];
                let r2 = rx * rx + ry * ry + eps * eps;
                let f = g * masses[j] / (r2 * r2.sqrt());
                ax[i] += f * rx;
                ay[i] += f * ry;
            }
        }
        (ax, ay)
    }

    fn random_bodies(n: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let pos: Vec<f64> = (0..n * 2).map(|_| rng.gen_range(-10.0..10.0)).collect();
        let masses: Vec<f64> = (0..n).map(|_| rng.gen_range(0.5..2.0)).collect();
        (pos, masses)
    }

    #[test]
    fn serial_path_matches_brute_force() {
        use approx::assert_abs_diff_eq;

        let (pos, masses) = random_bodies(8, 7);
        let backend = CpuBackend::new();
        let (ax, ay) = backend.nbody_forces(&pos, &masses, 1.0, 0.01);
        let (rx, ry) = brute_force(&pos, &masses, 1.0, 0.01);
        for i in 0..8 {
            assert_abs_diff_eq!(ax[i], rx[i], epsilon = 1e-10);
            assert_abs_diff_eq!(ay[i], ry[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn parallel_path_matches_brute_force() {
        let (pos, masses) = random_bodies(200, 11);
        let backend = CpuBackend::new();
        let (ax, ay) = backend.nbody_forces(&pos, &masses, 1.0, 0.05);
        let (rx, ry) = brute_force(&pos, &masses, 1.0, 0.05);
        for i in 0..200 {
            assert!((ax[i] - rx[i]).abs() < 1e-9);
            assert!((ay[i] - ry[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn matvec_truncates_to_shorter_length() {
        let backend = CpuBackend::new();
        let mat = vec![vec![1.0, 2.0, 3.0], vec![4.0]];
        let out = backend.matvec(&mat, &[1.0, 1.0]);
        assert_eq!(out, vec![3.0, 4.0]);
    }
}
