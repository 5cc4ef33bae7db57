//! Phase portraits and Poincaré sections.

use crate::{AnalysisError, AnalysisResult};
use ds_core::{Integrator, State, System};

/// Projection of a trajectory onto two state axes.
#[derive(Debug, Clone)]
pub struct PhasePortrait {
    pub x_index: usize,
    pub y_index: usize,
    pub points: Vec<(f64, f64)>,
}

/// Record `(x[x_index], x[y_index])` after every step for `duration`
/// seconds.
pub fn phase_portrait(
    system: &mut dyn System,
    integrator: &mut dyn Integrator,
    x0: &State,
    x_index: usize,
    y_index: usize,
    dt: f64,
    duration: f64,
) -> AnalysisResult<PhasePortrait> {
    let dim = x0.len();
    for index in [x_index, y_index] {
        if index >= dim {
            return Err(AnalysisError::IndexOutOfRange { index, dim });
        }
    }

    let mut portrait = PhasePortrait {
        x_index,
        y_index,
        points: Vec::with_capacity((duration / dt) as usize),
    };

    let mut x = x0.clone();
    let u = vec![0.0; system.control_dim()];
    let mut t = 0.0;

    while t < duration {
        x = integrator.step(system, &x, &u, t, dt)?;
        t += dt;
        portrait.points.push((x[x_index], x[y_index]));
    }

    Ok(portrait)
}

/// Points collected at successive crossings of a threshold plane.
#[derive(Debug, Clone, Default)]
pub struct PoincareSection {
    pub points: Vec<(f64, f64)>,
}

/// Record `(x[record_x], x[record_y])` whenever `x[cross_index]` crosses
/// `threshold` from below.
#[allow(clippy::too_many_arguments)]
pub fn poincare_section(
    system: &mut dyn System,
    integrator: &mut dyn Integrator,
    x0: &State,
    cross_index: usize,
    threshold: f64,
    record_x: usize,
    record_y: usize,
    dt: f64,
    duration: f64,
) -> AnalysisResult<PoincareSection> {
    let dim = x0.len();
    for index in [cross_index, record_x, record_y] {
        if index >= dim {
            return Err(AnalysisError::IndexOutOfRange { index, dim });
        }
    }

    let mut section = PoincareSection::default();
    let mut x = x0.clone();
    let u = vec![0.0; system.control_dim()];
    let mut t = 0.0;
    let mut prev = x[cross_index];

    while t < duration {
        x = integrator.step(system, &x, &u, t, dt)?;
        t += dt;
        let curr = x[cross_index];

        if prev < threshold && curr >= threshold {
            section.points.push((x[record_x], x[record_y]));
        }
        prev = curr;
    }

    Ok(section)
}
