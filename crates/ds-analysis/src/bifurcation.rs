//! Parameter sweeps recording settled attractor values.

use crate::{AnalysisError, AnalysisResult};
use ds_core::{Integrator, State, System};
use std::collections::HashSet;

/// Distinct settled values of one state variable at one parameter value.
#[derive(Debug, Clone)]
pub struct BifurcationPoint {
    pub param: f64,
    pub values: Vec<f64>,
}

/// Sweep a named parameter linearly over `[param_min, param_max]`. For
/// each value the state is reset to `x0`, integrated for `transient`
/// seconds (discarded), then for `record` seconds collecting values of
/// `x[state_index]` quantised to 1e-3 for uniqueness. The original
/// parameter value is restored afterwards.
#[allow(clippy::too_many_arguments)]
pub fn bifurcation_diagram(
    system: &mut dyn System,
    integrator: &mut dyn Integrator,
    param_name: &str,
    param_min: f64,
    param_max: f64,
    param_steps: usize,
    state_index: usize,
    x0: &State,
    dt: f64,
    transient: f64,
    record: f64,
) -> AnalysisResult<Vec<BifurcationPoint>> {
    if state_index >= x0.len() {
        return Err(AnalysisError::IndexOutOfRange {
            index: state_index,
            dim: x0.len(),
        });
    }

    let original = {
        let tunable = system
            .as_configurable()
            .ok_or(AnalysisError::NotConfigurable)?;
        *tunable
            .params()
            .get(param_name)
            .ok_or_else(|| ds_core::DynError::UnknownParam {
                name: param_name.to_string(),
            })?
    };

    let param_steps = param_steps.max(2);
    let param_step = (param_max - param_min) / (param_steps - 1) as f64;
    let u = vec![0.0; system.control_dim()];

    let mut results = Vec::with_capacity(param_steps);

    for i in 0..param_steps {
        let param = param_min + i as f64 * param_step;
        system
            .as_configurable()
            .ok_or(AnalysisError::NotConfigurable)?
            .set_param(param_name, param)?;

        let mut x = x0.clone();
        let mut t = 0.0;

        // Let transients die out.
        while t < transient {
            x = integrator.step(system, &x, &u, t, dt)?;
            t += dt;
        }

        let mut values = Vec::new();
        let mut seen = HashSet::new();

        while t < transient + record {
            x = integrator.step(system, &x, &u, t, dt)?;
            t += dt;

            let val = x[state_index];
            let key = (val * 1000.0) as i64;
            if seen.insert(key) {
                values.push(val);
            }
        }

        results.push(BifurcationPoint { param, values });
    }

    system
        .as_configurable()
        .ok_or(AnalysisError::NotConfigurable)?
        .set_param(param_name, original)?;

    Ok(results)
}
