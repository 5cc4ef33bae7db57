//! ds-integrators: time steppers conforming to the `Integrator` contract.
//!
//! - [`Euler`]: 1st order, one derivative evaluation; baseline.
//! - [`Rk4`]: classical 4th order; the general-purpose default.
//! - [`Rk45`]: Dormand-Prince 5(4) embedded pair with step control.
//! - [`VelocityVerlet`], [`Leapfrog`]: 2nd-order symplectic, for `[q, p]`
//!   layouts where long-term energy behaviour outranks per-step accuracy.

mod euler;
mod rk4;
mod rk45;
mod verlet;

pub use euler::Euler;
pub use rk4::Rk4;
pub use rk45::Rk45;
pub use verlet::{Leapfrog, VelocityVerlet};
