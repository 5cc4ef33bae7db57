//! Run directory management.

use crate::types::RunMetadata;
use crate::{ResultsError, ResultsResult};
use chrono::Utc;
use ds_core::RunResult;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Flat directory of saved runs.
#[derive(Debug, Clone)]
pub struct RunStore {
    base_dir: PathBuf,
}

/// Descriptor for a save operation; everything that goes into
/// `metadata.json` besides the harvested metrics.
#[derive(Debug, Clone)]
pub struct RunInfo<'a> {
    pub model: &'a str,
    pub integrator: &'a str,
    pub controller: &'a str,
    pub dt: f64,
    pub duration: f64,
    pub seed: u64,
}

impl RunStore {
    pub fn new(base_dir: PathBuf) -> ResultsResult<Self> {
        if !base_dir.exists() {
            fs::create_dir_all(&base_dir)?;
        }
        Ok(Self { base_dir })
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.base_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join("metadata.json").exists()
    }

    /// Persist a run; returns the generated run id
    /// (`<model>_<unix_seconds>`).
    pub fn save(&self, info: &RunInfo<'_>, result: &RunResult) -> ResultsResult<String> {
        let now = Utc::now();
        let run_id = format!("{}_{}", info.model, now.timestamp());
        let run_dir = self.run_dir(&run_id);
        fs::create_dir_all(&run_dir)?;

        let metadata = RunMetadata {
            id: run_id.clone(),
            model: info.model.to_string(),
            timestamp: now,
            seed: info.seed,
            dt: info.dt,
            duration: info.duration,
            integrator: info.integrator.to_string(),
            controller: info.controller.to_string(),
            metrics: result.metrics.clone(),
        };
        let metadata_json = serde_json::to_string_pretty(&metadata)?;
        fs::write(run_dir.join("metadata.json"), metadata_json)?;

        fs::write(run_dir.join("states.csv"), render_states_csv(result))?;

        tracing::info!(%run_id, steps = result.steps_taken, "run saved");
        Ok(run_id)
    }

    pub fn load_metadata(&self, run_id: &str) -> ResultsResult<RunMetadata> {
        let path = self.run_dir(run_id).join("metadata.json");
        if !path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    /// Recorded `(time, state-and-control row)` pairs from `states.csv`.
    pub fn load_states(&self, run_id: &str) -> ResultsResult<Vec<(f64, Vec<f64>)>> {
        let path = self.run_dir(run_id).join("states.csv");
        if !path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(path)?;
        let mut rows = Vec::new();
        for (line_no, line) in content.lines().enumerate().skip(1) {
            let mut fields = line.split(',').map(str::trim);
            let time = parse_field(fields.next(), line_no)?;
            let values = fields
                .map(|f| parse_field(Some(f), line_no))
                .collect::<ResultsResult<Vec<f64>>>()?;
            rows.push((time, values));
        }
        Ok(rows)
    }

    /// Run ids present in the store, newest first.
    pub fn list_runs(&self) -> ResultsResult<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            if entry.path().join("metadata.json").exists() {
                ids.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        ids.sort_unstable_by(|a, b| b.cmp(a));
        Ok(ids)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

fn parse_field(field: Option<&str>, line_no: usize) -> ResultsResult<f64> {
    let field = field.ok_or_else(|| ResultsError::MalformedStates {
        what: format!("line {line_no}: missing field"),
    })?;
    field.parse().map_err(|_| ResultsError::MalformedStates {
        what: format!("line {line_no}: bad float {field:?}"),
    })
}

fn render_states_csv(result: &RunResult) -> String {
    let mut out = String::new();
    let Some(first) = result.states.first() else {
        return out;
    };

    out.push_str("time");
    for i in 0..first.len() {
        let _ = write!(out, ",x{i}");
    }
    let control_dim = result.controls.first().map(Vec::len).unwrap_or(0);
    for i in 0..control_dim {
        let _ = write!(out, ",u{i}");
    }
    out.push('\n');

    for (step, (state, time)) in result.states.iter().zip(&result.times).enumerate() {
        let _ = write!(out, "{time:.6}");
        for v in state.iter() {
            let _ = write!(out, ",{v:.6}");
        }
        // Controls lag states by one entry; the final row repeats zeros.
        for i in 0..control_dim {
            let v = result
                .controls
                .get(step)
                .and_then(|u| u.get(i))
                .copied()
                .unwrap_or(0.0);
            let _ = write!(out, ",{v:.6}");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ds_core::State;
    use std::collections::BTreeMap;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("{prefix}_{nanos}"))
    }

    fn sample_result() -> RunResult {
        RunResult {
            states: vec![
                State::from_vec(vec![0.1, 0.0]),
                State::from_vec(vec![0.09, -0.05]),
            ],
            controls: vec![vec![0.5]],
            times: vec![0.0, 0.01],
            metrics: BTreeMap::from([("stability".to_string(), 1.0)]),
            energy_drift: 0.0,
            steps_taken: 1,
            errors: Vec::new(),
        }
    }

    #[test]
    fn save_and_reload_round_trip() {
        let store = RunStore::new(unique_temp_dir("ds_results")).unwrap();
        let info = RunInfo {
            model: "pendulum",
            integrator: "rk4",
            controller: "none",
            dt: 0.01,
            duration: 0.01,
            seed: 7,
        };

        let run_id = store.save(&info, &sample_result()).unwrap();
        assert!(run_id.starts_with("pendulum_"));
        assert!(store.has_run(&run_id));

        let metadata = store.load_metadata(&run_id).unwrap();
        assert_eq!(metadata.model, "pendulum");
        assert_eq!(metadata.seed, 7);
        assert_eq!(metadata.metrics["stability"], 1.0);

        let rows = store.load_states(&run_id).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, 0.0);
        // time, x0, x1, u0
        assert_eq!(rows[0].1.len(), 3);
        assert!((rows[1].1[0] - 0.09).abs() < 1e-9);
    }

    #[test]
    fn csv_header_names_states_and_controls() {
        let store = RunStore::new(unique_temp_dir("ds_results_hdr")).unwrap();
        let info = RunInfo {
            model: "pendulum",
            integrator: "euler",
            controller: "pid",
            dt: 0.01,
            duration: 0.01,
            seed: 0,
        };
        let run_id = store.save(&info, &sample_result()).unwrap();

        let csv =
            fs::read_to_string(store.base_dir().join(&run_id).join("states.csv")).unwrap();
        let header = csv.lines().next().unwrap();
        assert_eq!(header, "time,x0,x1,u0");
    }

    #[test]
    fn missing_run_errors() {
        let store = RunStore::new(unique_temp_dir("ds_results_missing")).unwrap();
        assert!(matches!(
            store.load_metadata("nope_123"),
            Err(ResultsError::RunNotFound { .. })
        ));
    }

    #[test]
    fn listing_sees_saved_runs() {
        let store = RunStore::new(unique_temp_dir("ds_results_list")).unwrap();
        let info = RunInfo {
            model: "lorenz",
            integrator: "rk4",
            controller: "none",
            dt: 0.01,
            duration: 0.01,
            seed: 0,
        };
        let run_id = store.save(&info, &sample_result()).unwrap();
        let runs = store.list_runs().unwrap();
        assert!(runs.contains(&run_id));
    }
}
