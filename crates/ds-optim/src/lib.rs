//! ds-optim: exhaustive parameter search over simulation runs.

mod grid;

pub use grid::{GridSearch, GridSearchOutcome};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimError {
    #[error("grid has no axes")]
    EmptyGrid,

    #[error("axis {name} has no values")]
    EmptyAxis { name: String },

    #[error("metric {name} missing from run results")]
    MetricMissing { name: String },

    #[error("no grid point produced a successful run")]
    NoSuccessfulRun,
}

pub type OptimResult<T> = Result<T, OptimError>;
