//! ds-core: stable foundation for dynsim.
//!
//! Contains:
//! - state (flat f64 state/control vectors + arithmetic)
//! - traits (System, Integrator, Controller, Metric, Observer contracts)
//! - config (per-run timing and stepping options)
//! - result (recorded trajectories and harvested metrics)
//! - error (shared error types)

pub mod config;
pub mod error;
pub mod result;
pub mod state;
pub mod traits;

// Re-exports: nice ergonomics for downstream crates
pub use config::SimConfig;
pub use error::{CoreResult, DynError};
pub use result::RunResult;
pub use state::{Control, State};
pub use traits::{
    AdaptiveIntegrator, AdaptiveStep, Configurable, Controller, Hamiltonian, Integrator, Metric,
    Observer, System,
};

/// Floating point type used throughout the engine.
pub type Real = f64;

/// Standard gravitational acceleration (m/s^2).
pub const GRAVITY: Real = 9.81;
