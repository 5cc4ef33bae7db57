//! ds-metrics: streaming observers reduced to a single scalar per run.

mod control_effort;
mod energy;
mod stability;

pub use control_effort::ControlEffort;
pub use energy::{Energy, EnergyDrift};
pub use stability::Stability;
