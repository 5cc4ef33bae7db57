//! ds-results: persisted run storage.
//!
//! One directory per run, named `<model>_<unix_seconds>`, holding
//! `metadata.json` and a `states.csv` with one row per recorded step.

mod store;
mod types;

pub use store::{RunInfo, RunStore};
pub use types::RunMetadata;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("malformed states file: {what}")]
    MalformedStates { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
