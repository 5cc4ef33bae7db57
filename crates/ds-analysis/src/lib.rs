//! ds-analysis: derivative tools that repeatedly drive an integrator.

mod bifurcation;
mod lyapunov;
mod phase;
mod spectrum;

pub use bifurcation::{bifurcation_diagram, BifurcationPoint};
pub use lyapunov::{lyapunov_exponent, lyapunov_spectrum};
pub use phase::{phase_portrait, poincare_section, PhasePortrait, PoincareSection};
pub use spectrum::power_spectrum;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("input length {0} is not a power of two")]
    NotPowerOfTwo(usize),
    #[error("system does not expose tunable parameters")]
    NotConfigurable,
    #[error("state index {index} out of range for dimension {dim}")]
    IndexOutOfRange { index: usize, dim: usize },
    #[error(transparent)]
    Core(#[from] ds_core::DynError),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
