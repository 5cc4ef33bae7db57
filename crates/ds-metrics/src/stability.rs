//! Boundedness metric.

use ds_core::{Metric, State};

/// Fraction of samples where every state component stays inside the
/// threshold. 1.0 means the trajectory never left the envelope.
pub struct Stability {
    threshold: f64,
    violations: usize,
    samples: usize,
}

impl Stability {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            violations: 0,
            samples: 0,
        }
    }
}

impl Metric for Stability {
    fn name(&self) -> &str {
        "stability"
    }

    fn observe(&mut self, x: &State, _u: &[f64], _t: f64) {
        self.samples += 1;
        if x.iter().any(|v| v.abs() > self.threshold) {
            self.violations += 1;
        }
    }

    fn value(&self) -> f64 {
        if self.samples == 0 {
            return 1.0;
        }
        1.0 - self.violations as f64 / self.samples as f64
    }

    fn reset(&mut self) {
        self.violations = 0;
        self.samples = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_violating_samples() {
        let mut m = Stability::new(1.0);
        m.observe(&State::from_vec(vec![0.5, 0.5]), &[], 0.0);
        m.observe(&State::from_vec(vec![2.0, 0.0]), &[], 0.1);
        assert!((m.value() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_run_is_stable() {
        let m = Stability::new(1.0);
        assert_eq!(m.value(), 1.0);
    }
}
