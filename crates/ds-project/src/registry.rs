//! Name-to-factory mapping for models, integrators, and controllers.

use crate::{ProjectError, ProjectResult};
use ds_control::{Lqr, Manual, NoControl, Pid};
use ds_core::{Controller, Integrator, Metric, System};
use ds_integrators::{Euler, Leapfrog, Rk4, Rk45, VelocityVerlet};
use ds_metrics::{ControlEffort, Energy, Stability};
use ds_systems::{
    CartPole, CoupledPendulums, DoublePendulum, DoubleWell, Drone, Duffing, Gyroscope, Hybrid,
    Lorenz, MagneticPendulum, MassChain, NBody, Pendulum, Rossler, Sph, SpringMass, ThreeBody,
    VanDerPol, Wave,
};
use std::collections::BTreeMap;

pub type ModelFactory = Box<dyn Fn() -> Box<dyn System> + Send + Sync>;
pub type IntegratorFactory = Box<dyn Fn() -> Box<dyn Integrator> + Send + Sync>;
pub type ControllerFactory =
    Box<dyn Fn(&BTreeMap<String, f64>) -> Box<dyn Controller> + Send + Sync>;

/// The contract surface the CLI and scenario files build against. Names
/// are stable identifiers; factories return fresh instances every call.
pub struct Registry {
    models: BTreeMap<&'static str, ModelFactory>,
    integrators: BTreeMap<&'static str, IntegratorFactory>,
    controllers: BTreeMap<&'static str, ControllerFactory>,
}

impl Registry {
    pub fn new() -> Self {
        let mut r = Self {
            models: BTreeMap::new(),
            integrators: BTreeMap::new(),
            controllers: BTreeMap::new(),
        };
        r.register_models();
        r.register_integrators();
        r.register_controllers();
        r
    }

    fn register_models(&mut self) {
        self.models
            .insert("pendulum", Box::new(|| Box::new(Pendulum::new())));
        self.models
            .insert("cartpole", Box::new(|| Box::new(CartPole::new())));
        self.models
            .insert("double_pendulum", Box::new(|| Box::new(DoublePendulum::new())));
        self.models
            .insert("spring_mass", Box::new(|| Box::new(SpringMass::new())));
        self.models
            .insert("spring_chain", Box::new(|| Box::new(SpringMass::chain(3))));
        self.models
            .insert("drone", Box::new(|| Box::new(Drone::new())));
        self.models
            .insert("nbody", Box::new(|| Box::new(NBody::new(3))));
        self.models
            .insert("galaxy", Box::new(|| Box::new(NBody::new(500))));
        self.models
            .insert("sph", Box::new(|| Box::new(Sph::new(400))));
        self.models
            .insert("hybrid", Box::new(|| Box::new(Hybrid::new(200, 200))));
        self.models
            .insert("lorenz", Box::new(|| Box::new(Lorenz::new())));
        self.models
            .insert("rossler", Box::new(|| Box::new(Rossler::new())));
        self.models
            .insert("vanderpol", Box::new(|| Box::new(VanDerPol::new())));
        self.models
            .insert("duffing", Box::new(|| Box::new(Duffing::new())));
        self.models
            .insert("three_body", Box::new(|| Box::new(ThreeBody::new())));
        self.models.insert(
            "coupled_pendulums",
            Box::new(|| Box::new(CoupledPendulums::new())),
        );
        self.models
            .insert("mass_chain", Box::new(|| Box::new(MassChain::new(16))));
        self.models
            .insert("wave", Box::new(|| Box::new(Wave::new(64))));
        self.models
            .insert("gyroscope", Box::new(|| Box::new(Gyroscope::new())));
        self.models.insert(
            "magnetic_pendulum",
            Box::new(|| Box::new(MagneticPendulum::new())),
        );
        self.models
            .insert("double_well", Box::new(|| Box::new(DoubleWell::new())));
    }

    fn register_integrators(&mut self) {
        self.integrators
            .insert("euler", Box::new(|| Box::new(Euler::new())));
        self.integrators
            .insert("rk4", Box::new(|| Box::new(Rk4::new())));
        self.integrators
            .insert("rk45", Box::new(|| Box::new(Rk45::new())));
        self.integrators
            .insert("verlet", Box::new(|| Box::new(VelocityVerlet::new())));
        self.integrators
            .insert("leapfrog", Box::new(|| Box::new(Leapfrog::new())));
    }

    fn register_controllers(&mut self) {
        self.controllers.insert(
            "none",
            Box::new(|p| {
                let dim = p.get("dim").copied().unwrap_or(0.0) as usize;
                Box::new(NoControl::new(dim.max(1)))
            }),
        );

        self.controllers.insert(
            "pid",
            Box::new(|p| {
                Box::new(Pid::new(
                    p.get("kp").copied().unwrap_or(0.0),
                    p.get("ki").copied().unwrap_or(0.0),
                    p.get("kd").copied().unwrap_or(0.0),
                    p.get("target").copied().unwrap_or(0.0),
                ))
            }),
        );

        self.controllers.insert(
            "lqr",
            Box::new(|p| {
                // Pick the gain set by the state dimension the caller
                // reported; the pendulum gains are the fallback.
                let dim = p.get("dim").copied().unwrap_or(0.0) as usize;
                match dim {
                    4 => Box::new(Lqr::cartpole()),
                    6 => {
                        let mut target_y = p.get("target").copied().unwrap_or(0.0);
                        if target_y == 0.0 {
                            target_y = 5.0;
                        }
                        Box::new(Lqr::drone(target_y))
                    }
                    _ => Box::new(Lqr::pendulum()),
                }
            }),
        );

        self.controllers
            .insert("manual", Box::new(|_| Box::new(Manual::new())));
    }

    pub fn model(&self, name: &str) -> ProjectResult<Box<dyn System>> {
        self.models
            .get(name)
            .map(|f| f())
            .ok_or_else(|| ProjectError::UnknownModel(name.to_string()))
    }

    pub fn integrator(&self, name: &str) -> ProjectResult<Box<dyn Integrator>> {
        self.integrators
            .get(name)
            .map(|f| f())
            .ok_or_else(|| ProjectError::UnknownIntegrator(name.to_string()))
    }

    pub fn controller(
        &self,
        name: &str,
        params: &BTreeMap<String, f64>,
    ) -> ProjectResult<Box<dyn Controller>> {
        self.controllers
            .get(name)
            .map(|f| f(params))
            .ok_or_else(|| ProjectError::UnknownController(name.to_string()))
    }

    pub fn list_models(&self) -> Vec<&'static str> {
        self.models.keys().copied().collect()
    }

    pub fn list_integrators(&self) -> Vec<&'static str> {
        self.integrators.keys().copied().collect()
    }

    pub fn list_controllers(&self) -> Vec<&'static str> {
        self.controllers.keys().copied().collect()
    }

    /// The metric set attached to every batch run.
    pub fn default_metrics(&self) -> Vec<Box<dyn Metric>> {
        vec![
            Box::new(Energy::new(1.0, 1.0, 9.81)),
            Box::new(Stability::new(10.0)),
            Box::new(ControlEffort::new()),
        ]
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
