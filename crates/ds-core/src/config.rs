//! Per-run configuration.

use crate::error::{CoreResult, DynError};
use serde::{Deserialize, Serialize};

/// Immutable run options, passed to `Simulator::run` by value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Fixed (or initial, when adaptive) time step in seconds.
    pub dt: f64,
    /// Total simulated time in seconds.
    pub duration: f64,
    /// Seed for stochastic initial-condition generators.
    pub seed: u64,
    /// Local error tolerance for adaptive stepping.
    pub tolerance: f64,
    /// Upper clamp on the adaptive step.
    pub max_dt: f64,
    /// Lower clamp on the adaptive step.
    pub min_dt: f64,
    /// Enable error-controlled step sizing.
    pub adaptive: bool,
    /// Check every new state for NaN/Inf and stop cleanly on failure.
    pub validate_state: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.01,
            duration: 10.0,
            seed: 0,
            tolerance: 1e-6,
            max_dt: 0.1,
            min_dt: 1e-8,
            adaptive: false,
            validate_state: true,
        }
    }
}

impl SimConfig {
    /// Checked before a run allocates anything.
    pub fn validate(&self) -> CoreResult<()> {
        if self.dt <= 0.0 {
            return Err(DynError::InvalidConfig {
                what: "dt must be positive",
            });
        }
        if self.duration <= 0.0 {
            return Err(DynError::InvalidConfig {
                what: "duration must be positive",
            });
        }
        if self.adaptive && self.tolerance <= 0.0 {
            return Err(DynError::InvalidConfig {
                what: "tolerance must be positive for adaptive stepping",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_timing() {
        let mut cfg = SimConfig::default();
        cfg.dt = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = SimConfig::default();
        cfg.duration = -1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn adaptive_requires_tolerance() {
        let mut cfg = SimConfig::default();
        cfg.adaptive = true;
        cfg.tolerance = 0.0;
        assert!(cfg.validate().is_err());
        cfg.tolerance = 1e-8;
        assert!(cfg.validate().is_ok());
    }
}
