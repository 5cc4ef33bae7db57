//! ds-sim: the run orchestrator.
//!
//! A [`Simulator`] owns one system, one integrator, one controller, and any
//! registered metrics and observers, and drives them through the main loop.
//! One simulator per thread is the rule; [`Ensemble`] fans out independent
//! simulators over seeds.

mod cancel;
mod ensemble;
mod simulator;

pub use cancel::CancelToken;
pub use ensemble::{
    ControllerFactory, Ensemble, IntegratorFactory, MetricFactory, SystemFactory,
};
pub use simulator::Simulator;
