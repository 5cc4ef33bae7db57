//! ds-project: declarative scenario assembly.
//!
//! A [`Scenario`] names a model, an integrator, and a controller, plus the
//! timing options and initial conditions; the [`Registry`] turns those
//! names into live engine objects.

pub mod presets;
pub mod registry;
pub mod schema;

pub use registry::Registry;
pub use schema::{ControllerParams, InitState, Scenario};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("unknown integrator: {0}")]
    UnknownIntegrator(String),

    #[error("unknown controller: {0}")]
    UnknownController(String),

    #[error("invalid scenario: {what}")]
    Invalid { what: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Load and validate a scenario file.
pub fn load_yaml(path: &std::path::Path) -> ProjectResult<Scenario> {
    let content = std::fs::read_to_string(path)?;
    let scenario: Scenario = serde_yaml::from_str(&content)?;
    scenario.validate()?;
    Ok(scenario)
}

pub fn save_yaml(path: &std::path::Path, scenario: &Scenario) -> ProjectResult<()> {
    scenario.validate()?;
    let content = serde_yaml::to_string(scenario)?;
    std::fs::write(path, content)?;
    Ok(())
}
