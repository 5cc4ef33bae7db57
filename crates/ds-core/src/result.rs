//! Recorded output of a simulation run.

use crate::error::DynError;
use crate::state::{Control, State};
use std::collections::BTreeMap;

/// Everything a run produced. On a clean run `states.len() == times.len()
/// == steps_taken + 1` and `controls.len() == steps_taken`; a cancelled or
/// invalid-state run returns the assembled prefix with the reason appended
/// to `errors`.
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    pub states: Vec<State>,
    pub controls: Vec<Control>,
    pub times: Vec<f64>,
    pub metrics: BTreeMap<String, f64>,
    /// `|E(end) - E(0)| / |E(0)|` for Hamiltonian systems, else 0.
    pub energy_drift: f64,
    pub steps_taken: usize,
    /// Recoverable errors accumulated during the run.
    pub errors: Vec<DynError>,
}

impl RunResult {
    /// Final recorded state, if any step was recorded.
    pub fn final_state(&self) -> Option<&State> {
        self.states.last()
    }

    /// Final recorded time (0.0 before any step).
    pub fn final_time(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }
}
