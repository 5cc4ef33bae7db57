//! Exhaustive grid search minimising one harvested metric.

use crate::{OptimError, OptimResult};
use ds_core::{CoreResult, SimConfig, State};
use ds_sim::{CancelToken, Simulator};
use std::collections::BTreeMap;

/// Best parameter combination found, the metric value it scored, and how
/// much of the grid produced usable runs.
#[derive(Debug, Clone)]
pub struct GridSearchOutcome {
    pub params: BTreeMap<String, f64>,
    pub score: f64,
    pub evaluated: usize,
    pub failed: usize,
}

/// Cartesian sweep over named value axes. Every combination builds a fresh
/// simulator through the caller's closure and runs once; the combination
/// with the smallest value of the chosen metric wins. Runs are sequential:
/// the engine reserves parallelism for the force kernels and the ensemble.
#[derive(Debug, Default)]
pub struct GridSearch {
    axes: Vec<(String, Vec<f64>)>,
}

impl GridSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named axis. Axes combine as a Cartesian product in insertion
    /// order.
    pub fn axis(mut self, name: &str, values: Vec<f64>) -> Self {
        self.axes.push((name.to_string(), values));
        self
    }

    pub fn grid_size(&self) -> usize {
        self.axes.iter().map(|(_, v)| v.len()).product()
    }

    /// Sweep the grid. `build` turns a parameter combination into a ready
    /// simulator plus its initial state and run options; combinations whose
    /// build or run fails are skipped and counted.
    pub fn search<B>(
        &self,
        token: &CancelToken,
        build: B,
        metric: &str,
    ) -> OptimResult<GridSearchOutcome>
    where
        B: Fn(&BTreeMap<String, f64>) -> CoreResult<(Simulator, State, SimConfig)>,
    {
        if self.axes.is_empty() {
            return Err(OptimError::EmptyGrid);
        }
        for (name, values) in &self.axes {
            if values.is_empty() {
                return Err(OptimError::EmptyAxis { name: name.clone() });
            }
        }

        let total = self.grid_size();
        tracing::info!(total, metric, "grid search start");

        let mut best: Option<GridSearchOutcome> = None;
        let mut evaluated = 0usize;
        let mut failed = 0usize;

        // Odometer over the axes.
        let mut indices = vec![0usize; self.axes.len()];
        'sweep: loop {
            let params: BTreeMap<String, f64> = self
                .axes
                .iter()
                .zip(&indices)
                .map(|((name, values), &i)| (name.clone(), values[i]))
                .collect();

            match self.evaluate(token, &build, &params, metric)? {
                Some(score) => {
                    evaluated += 1;
                    let better = best.as_ref().map(|b| score < b.score).unwrap_or(true);
                    if better {
                        best = Some(GridSearchOutcome {
                            params,
                            score,
                            evaluated: 0,
                            failed: 0,
                        });
                    }
                }
                None => failed += 1,
            }

            // Advance the odometer.
            for axis in (0..indices.len()).rev() {
                indices[axis] += 1;
                if indices[axis] < self.axes[axis].1.len() {
                    continue 'sweep;
                }
                indices[axis] = 0;
            }
            break;
        }

        let mut outcome = best.ok_or(OptimError::NoSuccessfulRun)?;
        outcome.evaluated = evaluated;
        outcome.failed = failed;
        tracing::info!(score = outcome.score, evaluated, failed, "grid search done");
        Ok(outcome)
    }

    fn evaluate<B>(
        &self,
        token: &CancelToken,
        build: &B,
        params: &BTreeMap<String, f64>,
        metric: &str,
    ) -> OptimResult<Option<f64>>
    where
        B: Fn(&BTreeMap<String, f64>) -> CoreResult<(Simulator, State, SimConfig)>,
    {
        let Ok((mut sim, x0, cfg)) = build(params) else {
            return Ok(None);
        };
        let Ok(result) = sim.run(token, &x0, cfg) else {
            return Ok(None);
        };
        if !result.errors.is_empty() {
            return Ok(None);
        }
        match result.metrics.get(metric) {
            Some(&value) => Ok(Some(value)),
            None => Err(OptimError::MetricMissing {
                name: metric.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ds_control::Pid;
    use ds_core::{Metric, State};
    use ds_integrators::Rk4;
    use ds_systems::Pendulum;

    /// Mean absolute distance of `x[0]` from a target value.
    struct TrackingError {
        target: f64,
        sum: f64,
        samples: usize,
    }

    impl TrackingError {
        fn new(target: f64) -> Self {
            Self {
                target,
                sum: 0.0,
                samples: 0,
            }
        }
    }

    impl Metric for TrackingError {
        fn name(&self) -> &str {
            "tracking_error"
        }
        fn observe(&mut self, x: &State, _u: &[f64], _t: f64) {
            self.sum += (x[0] - self.target).abs();
            self.samples += 1;
        }
        fn value(&self) -> f64 {
            if self.samples == 0 {
                return 0.0;
            }
            self.sum / self.samples as f64
        }
        fn reset(&mut self) {
            self.sum = 0.0;
            self.samples = 0;
        }
    }

    fn pendulum_build(
        params: &BTreeMap<String, f64>,
    ) -> ds_core::CoreResult<(Simulator, State, SimConfig)> {
        let kp = params.get("kp").copied().unwrap_or(0.0);
        let kd = params.get("kd").copied().unwrap_or(5.0);
        let target = 0.5;

        let mut sim = Simulator::new(
            Box::new(Pendulum::new()),
            Box::new(Rk4::new()),
            Box::new(Pid::new(kp, 0.0, kd, target)),
        );
        sim.add_metric(Box::new(TrackingError::new(target)));

        let cfg = SimConfig {
            dt: 0.01,
            duration: 5.0,
            ..SimConfig::default()
        };
        Ok((sim, State::from_vec(vec![0.0, 0.0]), cfg))
    }

    #[test]
    fn stiffer_gains_track_better() {
        let search = GridSearch::new().axis("kp", vec![0.5, 5.0, 50.0]);
        let outcome = search
            .search(&CancelToken::new(), pendulum_build, "tracking_error")
            .unwrap();

        assert_eq!(outcome.evaluated, 3);
        assert_eq!(outcome.failed, 0);
        assert_eq!(outcome.params["kp"], 50.0);
    }

    #[test]
    fn product_grid_visits_every_combination() {
        let search = GridSearch::new()
            .axis("kp", vec![1.0, 10.0])
            .axis("kd", vec![0.0, 2.0, 5.0]);
        assert_eq!(search.grid_size(), 6);

        let outcome = search
            .search(&CancelToken::new(), pendulum_build, "tracking_error")
            .unwrap();
        assert_eq!(outcome.evaluated, 6);
        assert!(outcome.params.contains_key("kd"));
    }

    #[test]
    fn empty_grid_is_rejected() {
        let err = GridSearch::new()
            .search(&CancelToken::new(), pendulum_build, "tracking_error")
            .unwrap_err();
        assert!(matches!(err, OptimError::EmptyGrid));
    }

    #[test]
    fn unknown_metric_is_an_error() {
        let search = GridSearch::new().axis("kp", vec![1.0]);
        let err = search
            .search(&CancelToken::new(), pendulum_build, "does_not_exist")
            .unwrap_err();
        assert!(matches!(err, OptimError::MetricMissing { .. }));
    }
}
