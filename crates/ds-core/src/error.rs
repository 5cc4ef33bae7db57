//! Error types shared across the engine.

use thiserror::Error;

pub type CoreResult<T> = Result<T, DynError>;

/// Closed set of engine errors. Variants raised inside the simulation loop
/// carry the step index and simulation time at which they occurred.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DynError {
    #[error("invalid config: {what}")]
    InvalidConfig { what: &'static str },

    #[error("dimension mismatch: {what}")]
    DimensionMismatch { what: &'static str },

    #[error("invalid state (NaN or Inf) at step {step} (t={time:.4})")]
    InvalidState { step: usize, time: f64 },

    #[error("unstable at step {step} (t={time:.4}): {what}")]
    Unstable {
        step: usize,
        time: f64,
        what: &'static str,
    },

    #[error("adaptive step {dt:.3e} below minimum {min_dt:.3e} at t={time:.4}")]
    StepTooSmall { dt: f64, min_dt: f64, time: f64 },

    #[error("unknown parameter: {name}")]
    UnknownParam { name: String },

    #[error("run canceled at step {step} (t={time:.4})")]
    Canceled { step: usize, time: f64 },
}
