//! Null controller.

use ds_core::{Control, Controller, State};

/// Always returns a zero vector of the configured dimension.
#[derive(Debug, Clone)]
pub struct NoControl {
    dim: usize,
}

impl NoControl {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Controller for NoControl {
    fn compute(&mut self, _x: &State, _t: f64) -> Control {
        vec![0.0; self.dim]
    }
}
