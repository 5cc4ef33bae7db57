//! Control effort metric.

use ds_core::{Metric, State};

/// Mean L1 norm of the control vector across samples.
pub struct ControlEffort {
    sum: f64,
    samples: usize,
}

impl ControlEffort {
    pub fn new() -> Self {
        Self {
            sum: 0.0,
            samples: 0,
        }
    }
}

impl Default for ControlEffort {
    fn default() -> Self {
        Self::new()
    }
}

impl Metric for ControlEffort {
    fn name(&self) -> &str {
        "control_effort"
    }

    fn observe(&mut self, _x: &State, u: &[f64], _t: f64) {
        self.sum += u.iter().map(|v| v.abs()).sum::<f64>();
        self.samples += 1;
    }

    fn value(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.sum / self.samples as f64
    }

    fn reset(&mut self) {
        self.sum = 0.0;
        self.samples = 0;
    }
}
