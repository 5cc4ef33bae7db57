//! Scenario file schema.

use crate::{ProjectError, ProjectResult};
use ds_core::SimConfig;
use serde::{Deserialize, Serialize};

/// One runnable scenario: component names plus run options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub model: String,
    #[serde(default = "default_integrator")]
    pub integrator: String,
    #[serde(default = "default_controller")]
    pub controller: String,
    #[serde(default = "default_dt")]
    pub dt: f64,
    #[serde(default = "default_duration")]
    pub duration: f64,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub adaptive: bool,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default)]
    pub init_state: InitState,
    #[serde(default)]
    pub controller_params: ControllerParams,
}

fn default_integrator() -> String {
    "rk4".to_string()
}

fn default_controller() -> String {
    "none".to_string()
}

fn default_dt() -> f64 {
    0.01
}

fn default_duration() -> f64 {
    10.0
}

fn default_tolerance() -> f64 {
    1e-6
}

/// Named initial-condition fields; which ones apply depends on the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InitState {
    #[serde(default = "default_theta")]
    pub theta: f64,
    #[serde(default)]
    pub omega: f64,
    #[serde(default)]
    pub theta2: f64,
    #[serde(default)]
    pub omega2: f64,
    #[serde(default)]
    pub pos: f64,
    #[serde(default)]
    pub vel: f64,
    #[serde(default = "default_num_bodies")]
    pub num_bodies: usize,
    #[serde(default)]
    pub x: f64,
    #[serde(default = "default_y")]
    pub y: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
}

fn default_theta() -> f64 {
    0.5
}

fn default_num_bodies() -> usize {
    3
}

fn default_y() -> f64 {
    5.0
}

impl Default for InitState {
    fn default() -> Self {
        Self {
            theta: default_theta(),
            omega: 0.0,
            theta2: 0.0,
            omega2: 0.0,
            pos: 0.0,
            vel: 0.0,
            num_bodies: default_num_bodies(),
            x: 0.0,
            y: default_y(),
            vx: 0.0,
            vy: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControllerParams {
    #[serde(default = "default_kp")]
    pub kp: f64,
    #[serde(default = "default_ki")]
    pub ki: f64,
    #[serde(default = "default_kd")]
    pub kd: f64,
    #[serde(default)]
    pub target: f64,
}

fn default_kp() -> f64 {
    10.0
}

fn default_ki() -> f64 {
    0.1
}

fn default_kd() -> f64 {
    5.0
}

impl Default for ControllerParams {
    fn default() -> Self {
        Self {
            kp: default_kp(),
            ki: default_ki(),
            kd: default_kd(),
            target: 0.0,
        }
    }
}

impl Scenario {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            integrator: default_integrator(),
            controller: default_controller(),
            dt: default_dt(),
            duration: default_duration(),
            seed: 0,
            adaptive: false,
            tolerance: default_tolerance(),
            init_state: InitState::default(),
            controller_params: ControllerParams::default(),
        }
    }

    pub fn validate(&self) -> ProjectResult<()> {
        if self.model.is_empty() {
            return Err(ProjectError::Invalid {
                what: "model name is empty",
            });
        }
        if self.dt <= 0.0 {
            return Err(ProjectError::Invalid {
                what: "dt must be positive",
            });
        }
        if self.duration <= 0.0 {
            return Err(ProjectError::Invalid {
                what: "duration must be positive",
            });
        }
        Ok(())
    }

    /// Engine run options for this scenario.
    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            dt: self.dt,
            duration: self.duration,
            seed: self.seed,
            adaptive: self.adaptive,
            tolerance: self.tolerance,
            ..SimConfig::default()
        }
    }

    /// Explicit initial state for models with fixed named layouts; `None`
    /// where the system's own default applies (generated states, attractor
    /// families).
    pub fn init_state_vec(&self) -> Option<Vec<f64>> {
        let s = &self.init_state;
        match self.model.as_str() {
            "pendulum" | "double_well" => Some(vec![s.theta, s.omega]),
            "cartpole" => Some(vec![s.pos, s.vel, s.theta, s.omega]),
            "double_pendulum" => Some(vec![s.theta, s.theta2, s.omega, s.omega2]),
            "spring_mass" => Some(vec![s.pos, s.vel]),
            "spring_chain" => Some(vec![s.pos, 0.0, 0.0, s.vel, 0.0, 0.0]),
            "drone" => Some(vec![s.x, s.y, s.theta, s.vx, s.vy, s.omega]),
            _ => None,
        }
    }

    /// Controller parameters in the registry's map form.
    pub fn controller_param_map(&self, control_dim: usize) -> std::collections::BTreeMap<String, f64> {
        std::collections::BTreeMap::from([
            ("dim".to_string(), control_dim as f64),
            ("kp".to_string(), self.controller_params.kp),
            ("ki".to_string(), self.controller_params.ki),
            ("kd".to_string(), self.controller_params.kd),
            ("target".to_string(), self.controller_params.target),
        ])
    }
}
