//! The main simulation loop.

use crate::cancel::CancelToken;
use ds_core::{
    Control, Controller, CoreResult, DynError, Integrator, Metric, Observer, RunResult, SimConfig,
    State, System,
};

/// Orchestrates a single run: controller, metric observation, integration,
/// state validation, adaptive step control, result assembly.
///
/// Not safe for concurrent use; construct one simulator per task.
pub struct Simulator {
    system: Box<dyn System>,
    integrator: Box<dyn Integrator>,
    controller: Box<dyn Controller>,
    metrics: Vec<Box<dyn Metric>>,
    observers: Vec<Box<dyn Observer>>,
}

impl Simulator {
    pub fn new(
        system: Box<dyn System>,
        integrator: Box<dyn Integrator>,
        controller: Box<dyn Controller>,
    ) -> Self {
        Self {
            system,
            integrator,
            controller,
            metrics: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn add_metric(&mut self, metric: Box<dyn Metric>) {
        self.metrics.push(metric);
    }

    pub fn add_observer(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    pub fn system_mut(&mut self) -> &mut dyn System {
        self.system.as_mut()
    }

    /// Run from `x0` under `cfg` until the duration is covered, the token
    /// fires, or the state goes bad. Cancellation and state validation
    /// failures return the assembled prefix with the reason in
    /// `RunResult::errors`; config and dimension errors abort instead.
    pub fn run(&mut self, token: &CancelToken, x0: &State, cfg: SimConfig) -> CoreResult<RunResult> {
        cfg.validate()?;

        // Absorb quotient rounding so e.g. 1.0 / 0.001 plans 1000 steps.
        let planned = (cfg.duration / cfg.dt + 1e-9).floor() as usize;
        let mut result = RunResult {
            states: Vec::with_capacity(planned + 1),
            controls: Vec::with_capacity(planned),
            times: Vec::with_capacity(planned + 1),
            ..RunResult::default()
        };

        for m in &mut self.metrics {
            m.reset();
        }
        self.controller.reset();

        let mut x = x0.clone();
        let mut t = 0.0;
        let mut dt = cfg.dt;

        result.states.push(x.clone());
        result.times.push(t);

        let initial_energy = self.system.as_hamiltonian().map(|h| h.energy(&x));

        tracing::debug!(duration = cfg.duration, dt = cfg.dt, adaptive = cfg.adaptive, "run start");

        let mut step = 0usize;
        loop {
            let done = if cfg.adaptive {
                t >= cfg.duration
            } else {
                step >= planned
            };
            if done {
                break;
            }

            if token.is_canceled() {
                result.errors.push(DynError::Canceled { step, time: t });
                break;
            }

            let u = self.controller.compute(&x, t);

            for m in &mut self.metrics {
                m.observe(&x, &u, t);
            }
            for o in &mut self.observers {
                o.on_step(&x, &u, t);
            }

            // dt_used covers the span just integrated; dt_next is the
            // proposal for the following step.
            let (new_x, dt_used, dt_next) = if cfg.adaptive {
                let (nx, used, next) = self.adaptive_step(&x, &u, t, dt, &cfg)?;
                (nx, used, Some(next))
            } else {
                let nx = self
                    .integrator
                    .step(self.system.as_mut(), &x, &u, t, dt)?;
                (nx, dt, None)
            };

            if cfg.validate_state && !new_x.is_finite() {
                result.errors.push(DynError::InvalidState { step, time: t });
                break;
            }

            x = new_x;
            t += dt_used;
            if let Some(next) = dt_next {
                dt = next.clamp(cfg.min_dt, cfg.max_dt);
            }
            step += 1;
            result.steps_taken += 1;

            result.states.push(x.clone());
            result.controls.push(u);
            result.times.push(t);
        }

        if let Some(e0) = initial_energy {
            if e0 != 0.0 {
                let e1 = self
                    .system
                    .as_hamiltonian()
                    .map(|h| h.energy(&x))
                    .unwrap_or(e0);
                result.energy_drift = (e1 - e0).abs() / e0.abs();
            }
        }

        for m in &self.metrics {
            result.metrics.insert(m.name().to_string(), m.value());
        }

        tracing::debug!(steps = result.steps_taken, errors = result.errors.len(), "run end");

        Ok(result)
    }

    /// One error-controlled step: the integrator's own embedded estimate
    /// when it has one, step-doubling otherwise. Returns
    /// `(state, dt_used, dt_next)`.
    fn adaptive_step(
        &mut self,
        x: &State,
        u: &[f64],
        t: f64,
        dt: f64,
        cfg: &SimConfig,
    ) -> CoreResult<(State, f64, f64)> {
        if let Some(adaptive) = self.integrator.as_adaptive() {
            let s = adaptive.step_adaptive(self.system.as_mut(), x, u, t, dt, cfg.tolerance)?;
            return Ok((s.state, dt, s.dt_next));
        }
        step_doubling(
            self.integrator.as_mut(),
            self.system.as_mut(),
            x,
            u,
            t,
            dt,
            cfg,
        )
    }

    /// Streaming variant: no result assembly. `callback` is invoked after
    /// each controller computation; returning `false` ends the run cleanly.
    pub fn run_with_callback<F>(
        &mut self,
        token: &CancelToken,
        x0: &State,
        cfg: SimConfig,
        mut callback: F,
    ) -> CoreResult<()>
    where
        F: FnMut(&State, &Control, f64) -> bool,
    {
        cfg.validate()?;

        for m in &mut self.metrics {
            m.reset();
        }
        self.controller.reset();

        let mut x = x0.clone();
        let mut t = 0.0;
        let dt = cfg.dt;
        let mut step = 0usize;

        while t < cfg.duration {
            if token.is_canceled() {
                return Err(DynError::Canceled { step, time: t });
            }

            let u = self.controller.compute(&x, t);

            if !callback(&x, &u, t) {
                return Ok(());
            }

            x = self.integrator.step(self.system.as_mut(), &x, &u, t, dt)?;
            t += dt;
            step += 1;

            if cfg.validate_state && !x.is_finite() {
                return Err(DynError::InvalidState { step, time: t });
            }
        }

        Ok(())
    }
}

/// Adaptive stepping for integrators without an embedded error estimate:
/// one full step against two half steps, with the difference as the local
/// truncation error. Retries at half the step while the error exceeds the
/// tolerance; proposes doubling when the error is far below it.
fn step_doubling(
    integrator: &mut dyn Integrator,
    system: &mut dyn System,
    x: &State,
    u: &[f64],
    t: f64,
    dt: f64,
    cfg: &SimConfig,
) -> CoreResult<(State, f64, f64)> {
    let x1 = integrator.step(system, x, u, t, dt)?;
    let x_half = integrator.step(system, x, u, t, dt / 2.0)?;
    let x2 = integrator.step(system, &x_half, u, t + dt / 2.0, dt / 2.0)?;

    let err = x1.sub(&x2).norm();

    if err > cfg.tolerance {
        if dt <= cfg.min_dt {
            return Err(DynError::StepTooSmall {
                dt,
                min_dt: cfg.min_dt,
                time: t,
            });
        }
        return step_doubling(integrator, system, x, u, t, dt / 2.0, cfg);
    }

    let mut dt_next = dt;
    if err < cfg.tolerance / 10.0 && dt < cfg.max_dt {
        dt_next = (dt * 2.0).min(cfg.max_dt);
    }

    Ok((x2, dt, dt_next))
}
