//! Polymorphic contracts between the simulator and its collaborators.

use crate::error::CoreResult;
use crate::state::{Control, State};
use std::collections::BTreeMap;

/// A dynamical system `dx/dt = f(x, u, t)`.
///
/// `derive` takes `&mut self` so implementations may reuse scratch buffers
/// between calls; it must still be pure with respect to integration (same
/// inputs, same derivative).
pub trait System: Send {
    fn state_dim(&self) -> usize;
    fn control_dim(&self) -> usize;

    /// Compute the state derivative at `(x, u, t)`.
    fn derive(&mut self, x: &State, u: &[f64], t: f64) -> State;

    /// A ready-to-integrate initial condition, when the system provides one.
    /// Generators that need a stability pre-pass (e.g. the galaxy builder)
    /// run it here, before time zero.
    fn default_state(&mut self) -> Option<State> {
        None
    }

    /// Present when the system exposes a conserved total energy.
    fn as_hamiltonian(&self) -> Option<&dyn Hamiltonian> {
        None
    }

    /// Present when the system exposes live-tunable parameters.
    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        None
    }
}

/// Conserved total energy, used for drift metrics.
pub trait Hamiltonian {
    fn energy(&self, x: &State) -> f64;
}

/// Named tunable parameters for live adjustment and sweeps.
pub trait Configurable {
    fn params(&self) -> BTreeMap<String, f64>;

    /// Unknown names fail with [`crate::DynError::UnknownParam`].
    fn set_param(&mut self, name: &str, value: f64) -> CoreResult<()>;
}

/// One fixed-arithmetic time step.
///
/// Integrators own their scratch buffers, resized on first use and reused
/// afterwards; `step` never mutates its inputs.
pub trait Integrator: Send {
    fn step(
        &mut self,
        system: &mut dyn System,
        x: &State,
        u: &[f64],
        t: f64,
        dt: f64,
    ) -> CoreResult<State>;

    /// Downcast hook for steppers with embedded error estimation.
    fn as_adaptive(&mut self) -> Option<&mut dyn AdaptiveIntegrator> {
        None
    }
}

/// Outcome of an error-controlled step.
#[derive(Debug, Clone)]
pub struct AdaptiveStep {
    pub state: State,
    /// Suggested size for the next step, before clamping to `[min_dt, max_dt]`.
    pub dt_next: f64,
    /// Normalized local truncation error estimate.
    pub error: f64,
}

pub trait AdaptiveIntegrator: Integrator {
    fn step_adaptive(
        &mut self,
        system: &mut dyn System,
        x: &State,
        u: &[f64],
        t: f64,
        dt: f64,
        tol: f64,
    ) -> CoreResult<AdaptiveStep>;
}

/// Feedback policy `u = g(x, t)`.
pub trait Controller: Send {
    fn compute(&mut self, x: &State, t: f64) -> Control;

    /// Clear accumulated state (integral terms, first-call flags).
    fn reset(&mut self) {}

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        None
    }
}

/// Streaming observer reduced to one scalar at the end of a run.
///
/// Ordering per step: `reset` happens-before the first `observe`; `observe`
/// is called before the integrator advances the state; `value` is read after
/// the run completes.
pub trait Metric: Send {
    fn name(&self) -> &str;
    fn observe(&mut self, x: &State, u: &[f64], t: f64);
    fn value(&self) -> f64;
    fn reset(&mut self);
}

/// Per-step callback for external consumers (TUI, exporters). Called after
/// metric observation and before the integrator step; must not block the
/// simulation thread.
pub trait Observer {
    fn on_step(&mut self, x: &State, u: &[f64], t: f64);
}
