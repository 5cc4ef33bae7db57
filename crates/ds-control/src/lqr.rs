//! Linear-quadratic regulator with precomputed gain matrices.

use ds_core::{Control, Controller, State};
use nalgebra::{DMatrix, DVector};

/// `u_i = -sum_j K[i][j] (x[j] - target[j])`, with sums truncated to the
/// shorter of the gain row and the state, so one gain set tolerates
/// differently-sized states.
#[derive(Debug, Clone)]
pub struct Lqr {
    k: DMatrix<f64>,
    target: DVector<f64>,
}

impl Lqr {
    pub fn new(k: DMatrix<f64>, target: DVector<f64>) -> Self {
        Self { k, target }
    }

    pub fn from_rows(rows: &[&[f64]], target: &[f64]) -> Self {
        let nrows = rows.len();
        let ncols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let mut k = DMatrix::zeros(nrows, ncols);
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                k[(i, j)] = v;
            }
        }
        Self::new(k, DVector::from_column_slice(target))
    }

    /// Gains for settling the single pendulum at the target angle.
    pub fn pendulum() -> Self {
        Self::from_rows(&[&[31.62, 10.0]], &[0.0, 0.0])
    }

    /// Gains for the cart-pole balance task. With the force convention of
    /// the cart-pole equations (positive force decreases the pole angle),
    /// every entry is negative: the cart chases the lean.
    pub fn cartpole() -> Self {
        Self::from_rows(&[&[-1.0, -1.73, -35.36, -8.94]], &[0.0; 4])
    }

    /// Altitude-hold gains for the planar drone.
    pub fn drone(target_y: f64) -> Self {
        Self::from_rows(
            &[
                &[0.0, 5.0, -10.0, 0.0, 3.5, -2.0],
                &[0.0, 5.0, 10.0, 0.0, 3.5, 2.0],
            ],
            &[0.0, target_y, 0.0, 0.0, 0.0, 0.0],
        )
    }

    pub fn double_pendulum() -> Self {
        Self::from_rows(&[&[50.0, 40.0, 15.0, 10.0]], &[0.0; 4])
    }

    pub fn spring_mass() -> Self {
        Self::from_rows(&[&[10.0, 6.32]], &[0.0, 0.0])
    }
}

impl Controller for Lqr {
    fn compute(&mut self, x: &State, _t: f64) -> Control {
        let mut u = vec![0.0; self.k.nrows()];
        for (i, out) in u.iter_mut().enumerate() {
            let cols = self.k.ncols().min(x.len());
            for j in 0..cols {
                let target = if j < self.target.len() {
                    self.target[j]
                } else {
                    0.0
                };
                *out -= self.k[(i, j)] * (x[j] - target);
            }
        }
        u
    }
}
