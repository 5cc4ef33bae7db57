use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ds_analysis::{bifurcation_diagram, lyapunov_exponent, power_spectrum};
use ds_core::State;
use ds_project::{presets, Registry, Scenario};
use ds_results::RunStore;
use ds_sim::{CancelToken, Ensemble, Simulator};
use ds_systems::{NBody, Sph};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dynsim")]
#[command(about = "dynsim - physics and control simulation laboratory", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scenario and print a summary
    Run {
        /// Model name (see `dynsim models`)
        #[arg(long, default_value = "pendulum")]
        model: String,
        /// Scenario YAML file; overrides the model flags
        #[arg(long)]
        scenario: Option<PathBuf>,
        /// Named preset for the model
        #[arg(long)]
        preset: Option<String>,
        #[arg(long, default_value = "rk4")]
        integrator: String,
        #[arg(long, default_value = "none")]
        controller: String,
        #[arg(long, default_value_t = 0.01)]
        dt: f64,
        #[arg(long, default_value_t = 10.0)]
        duration: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Error-controlled step sizing
        #[arg(long)]
        adaptive: bool,
        /// Save the run into this store directory
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Run N seeded trials in parallel
    Ensemble {
        #[arg(long, default_value = "lorenz")]
        model: String,
        #[arg(long, default_value = "rk4")]
        integrator: String,
        #[arg(long, default_value_t = 8)]
        runs: usize,
        #[arg(long, default_value_t = 0)]
        seed_start: u64,
        #[arg(long, default_value_t = 0.01)]
        dt: f64,
        #[arg(long, default_value_t = 10.0)]
        duration: f64,
    },
    /// Chaos and spectral analysis
    #[command(subcommand)]
    Analyze(AnalyzeCommands),
    /// Grid-search a controller parameter against a metric
    Tune {
        #[arg(long, default_value = "pendulum")]
        model: String,
        #[arg(long, default_value = "pid")]
        controller: String,
        /// Controller parameter to sweep (kp, ki, kd, target)
        #[arg(long, default_value = "kp")]
        param: String,
        #[arg(long, default_value_t = 0.0)]
        min: f64,
        #[arg(long, default_value_t = 50.0)]
        max: f64,
        #[arg(long, default_value_t = 11)]
        steps: usize,
        /// Metric to minimise (see the default metric set)
        #[arg(long, default_value = "control_effort")]
        metric: String,
        #[arg(long, default_value_t = 0.01)]
        dt: f64,
        #[arg(long, default_value_t = 5.0)]
        duration: f64,
    },
    /// List registered models, integrators, and controllers
    Models,
    /// List scenario presets
    Presets,
    /// List saved runs in a store directory
    Runs {
        #[arg(long, default_value = "runs")]
        store: PathBuf,
    },
}

#[derive(Subcommand)]
enum AnalyzeCommands {
    /// Largest Lyapunov exponent by trajectory separation
    Lyapunov {
        #[arg(long, default_value = "lorenz")]
        model: String,
        #[arg(long, default_value_t = 0.01)]
        dt: f64,
        #[arg(long, default_value_t = 50.0)]
        duration: f64,
        /// Initial separation
        #[arg(long, default_value_t = 1e-8)]
        delta: f64,
    },
    /// Parameter sweep recording settled values
    Bifurcation {
        #[arg(long, default_value = "duffing")]
        model: String,
        /// Parameter to sweep
        #[arg(long)]
        param: String,
        #[arg(long)]
        min: f64,
        #[arg(long)]
        max: f64,
        #[arg(long, default_value_t = 50)]
        steps: usize,
        /// State index to record
        #[arg(long, default_value_t = 0)]
        index: usize,
        #[arg(long, default_value_t = 0.01)]
        dt: f64,
        #[arg(long, default_value_t = 50.0)]
        transient: f64,
        #[arg(long, default_value_t = 50.0)]
        record: f64,
    },
    /// FFT power spectrum of one recorded state column
    Spectrum {
        #[arg(long, default_value = "runs")]
        store: PathBuf,
        #[arg(long)]
        run_id: String,
        /// Column of states.csv after the time field
        #[arg(long, default_value_t = 0)]
        column: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            model,
            scenario,
            preset,
            integrator,
            controller,
            dt,
            duration,
            seed,
            adaptive,
            save,
        } => {
            let scenario = resolve_scenario(
                &model, scenario, preset, &integrator, &controller, dt, duration, seed, adaptive,
            )?;
            cmd_run(&scenario, save)
        }
        Commands::Ensemble {
            model,
            integrator,
            runs,
            seed_start,
            dt,
            duration,
        } => cmd_ensemble(&model, &integrator, runs, seed_start, dt, duration),
        Commands::Tune {
            model,
            controller,
            param,
            min,
            max,
            steps,
            metric,
            dt,
            duration,
        } => cmd_tune(
            &model, &controller, &param, min, max, steps, &metric, dt, duration,
        ),
        Commands::Analyze(cmd) => match cmd {
            AnalyzeCommands::Lyapunov {
                model,
                dt,
                duration,
                delta,
            } => cmd_lyapunov(&model, dt, duration, delta),
            AnalyzeCommands::Bifurcation {
                model,
                param,
                min,
                max,
                steps,
                index,
                dt,
                transient,
                record,
            } => cmd_bifurcation(&model, &param, min, max, steps, index, dt, transient, record),
            AnalyzeCommands::Spectrum {
                store,
                run_id,
                column,
            } => cmd_spectrum(&store, &run_id, column),
        },
        Commands::Models => cmd_models(),
        Commands::Presets => cmd_presets(),
        Commands::Runs { store } => cmd_runs(&store),
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_scenario(
    model: &str,
    scenario_path: Option<PathBuf>,
    preset: Option<String>,
    integrator: &str,
    controller: &str,
    dt: f64,
    duration: f64,
    seed: u64,
    adaptive: bool,
) -> Result<Scenario> {
    if let Some(path) = scenario_path {
        return ds_project::load_yaml(&path)
            .with_context(|| format!("loading scenario {}", path.display()));
    }
    if let Some(name) = preset {
        return presets::find(model, &name)
            .with_context(|| format!("no preset {name:?} for model {model:?}"));
    }

    let mut s = Scenario::new(model);
    s.integrator = integrator.to_string();
    s.controller = controller.to_string();
    s.dt = dt;
    s.duration = duration;
    s.seed = seed;
    s.adaptive = adaptive;
    Ok(s)
}

fn build_initial_state(
    scenario: &Scenario,
    system: &mut dyn ds_core::System,
) -> Result<State> {
    if let Some(values) = scenario.init_state_vec() {
        return Ok(State::from_vec(values));
    }
    if let Some(state) = system.default_state() {
        return Ok(state);
    }
    Ok(State::zeros(system.state_dim()))
}

fn cmd_run(scenario: &Scenario, save: Option<PathBuf>) -> Result<()> {
    let registry = Registry::new();
    let mut system = registry.model(&scenario.model)?;
    let integrator = registry.integrator(&scenario.integrator)?;
    let controller = registry.controller(
        &scenario.controller,
        &scenario.controller_param_map(system.control_dim()),
    )?;

    let x0 = build_initial_state(scenario, system.as_mut())?;

    let mut sim = Simulator::new(system, integrator, controller);
    for metric in registry.default_metrics() {
        sim.add_metric(metric);
    }

    let cfg = scenario.sim_config();
    let result = sim.run(&CancelToken::new(), &x0, cfg)?;

    println!("model:      {}", scenario.model);
    println!("integrator: {}", scenario.integrator);
    println!("controller: {}", scenario.controller);
    println!("steps:      {}", result.steps_taken);
    println!("final time: {:.4}", result.final_time());
    if let Some(last) = result.final_state() {
        let shown: Vec<String> = last.iter().take(6).map(|v| format!("{v:.4}")).collect();
        let ellipsis = if last.len() > 6 { ", ..." } else { "" };
        println!("final x:    [{}{}]", shown.join(", "), ellipsis);
    }
    for (name, value) in &result.metrics {
        println!("metric {name}: {value:.6}");
    }
    if result.energy_drift > 0.0 {
        println!("energy drift: {:.3e}", result.energy_drift);
    }
    for err in &result.errors {
        println!("warning: {err}");
    }

    if let Some(dir) = save {
        let store = RunStore::new(dir)?;
        let info = ds_results::RunInfo {
            model: &scenario.model,
            integrator: &scenario.integrator,
            controller: &scenario.controller,
            dt: scenario.dt,
            duration: scenario.duration,
            seed: scenario.seed,
        };
        let run_id = store.save(&info, &result)?;
        println!("saved as {run_id}");
    }

    Ok(())
}

fn cmd_ensemble(
    model: &str,
    integrator: &str,
    runs: usize,
    seed_start: u64,
    dt: f64,
    duration: f64,
) -> Result<()> {
    let registry = Registry::new();
    // Validate both names up front; the factories below may not fail.
    registry.model(model)?;
    registry.integrator(integrator)?;

    let model_name = model.to_string();
    let integrator_name = integrator.to_string();

    let mut scenario = Scenario::new(model);
    scenario.dt = dt;
    scenario.duration = duration;

    let system_factory: ds_sim::SystemFactory = Box::new(move |seed| match model_name.as_str() {
        "nbody" => Box::new(NBody::with_seed(3, seed)),
        "galaxy" => Box::new(NBody::with_seed(500, seed)),
        "sph" => Box::new(Sph::with_seed(400, seed)),
        other => Registry::new()
            .model(other)
            .expect("model name validated at startup"),
    });
    let integrator_factory: ds_sim::IntegratorFactory = Box::new(move || {
        Registry::new()
            .integrator(&integrator_name)
            .expect("integrator name validated at startup")
    });
    let controller_factory: ds_sim::ControllerFactory =
        Box::new(|| Box::new(ds_control::NoControl::new(1)));

    let ensemble = Ensemble::new(
        system_factory,
        integrator_factory,
        controller_factory,
        runs,
        seed_start,
    );

    // Models with named layouts start from the scenario fields; generated
    // and attractor models use their per-seed defaults so trials differ.
    let explicit = scenario.init_state_vec().map(State::from_vec);
    let results = ensemble.run(&CancelToken::new(), explicit.as_ref(), scenario.sim_config())?;

    println!("trials: {}", results.len());
    for (i, r) in results.iter().enumerate() {
        let last = r
            .final_state()
            .map(|s| s.iter().take(3).map(|v| format!("{v:.4}")).collect::<Vec<_>>())
            .unwrap_or_default();
        println!(
            "  seed {}: steps {}, final [{}]",
            seed_start + i as u64,
            r.steps_taken,
            last.join(", ")
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_tune(
    model: &str,
    controller: &str,
    param: &str,
    min: f64,
    max: f64,
    steps: usize,
    metric: &str,
    dt: f64,
    duration: f64,
) -> Result<()> {
    if steps < 2 {
        bail!("need at least two grid points");
    }
    let registry = Registry::new();
    registry.model(model)?;
    registry.controller(controller, &Default::default())?;

    let values: Vec<f64> = (0..steps)
        .map(|i| min + (max - min) * i as f64 / (steps - 1) as f64)
        .collect();

    let mut scenario = Scenario::new(model);
    scenario.controller = controller.to_string();
    scenario.dt = dt;
    scenario.duration = duration;

    let param_name = param.to_string();
    let search = ds_optim::GridSearch::new().axis(param, values);
    let outcome = search.search(
        &CancelToken::new(),
        |grid_params| {
            let registry = Registry::new();
            let mut s = scenario.clone();
            let value = grid_params[&param_name];
            match param_name.as_str() {
                "kp" => s.controller_params.kp = value,
                "ki" => s.controller_params.ki = value,
                "kd" => s.controller_params.kd = value,
                "target" => s.controller_params.target = value,
                _ => {
                    return Err(ds_core::DynError::UnknownParam {
                        name: param_name.clone(),
                    })
                }
            }

            let mut system = registry
                .model(&s.model)
                .map_err(|_| ds_core::DynError::InvalidConfig { what: "bad model" })?;
            let ctrl = registry
                .controller(&s.controller, &s.controller_param_map(system.control_dim()))
                .map_err(|_| ds_core::DynError::InvalidConfig { what: "bad controller" })?;
            let integ = registry
                .integrator(&s.integrator)
                .map_err(|_| ds_core::DynError::InvalidConfig { what: "bad integrator" })?;

            let x0 = s
                .init_state_vec()
                .map(State::from_vec)
                .or_else(|| system.default_state())
                .unwrap_or_else(|| State::zeros(system.state_dim()));

            let mut sim = Simulator::new(system, integ, ctrl);
            for m in registry.default_metrics() {
                sim.add_metric(m);
            }
            Ok((sim, x0, s.sim_config()))
        },
        metric,
    )?;

    println!("best {param}: {}", outcome.params[param]);
    println!("{metric}:  {:.6}", outcome.score);
    println!(
        "evaluated {} grid points ({} failed)",
        outcome.evaluated, outcome.failed
    );
    Ok(())
}

fn cmd_lyapunov(model: &str, dt: f64, duration: f64, delta: f64) -> Result<()> {
    let registry = Registry::new();
    let mut system = registry.model(model)?;
    let mut integrator = registry.integrator("rk4")?;

    let x0 = system
        .default_state()
        .unwrap_or_else(|| State::zeros(system.state_dim()));

    let lambda = lyapunov_exponent(
        system.as_mut(),
        integrator.as_mut(),
        &x0,
        dt,
        duration,
        delta,
    )?;

    println!("model:    {model}");
    println!("lambda:   {lambda:.6}");
    println!(
        "verdict:  {}",
        if lambda > 0.01 {
            "chaotic (positive exponent)"
        } else if lambda < -0.01 {
            "contracting (negative exponent)"
        } else {
            "marginal"
        }
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_bifurcation(
    model: &str,
    param: &str,
    min: f64,
    max: f64,
    steps: usize,
    index: usize,
    dt: f64,
    transient: f64,
    record: f64,
) -> Result<()> {
    let registry = Registry::new();
    let mut system = registry.model(model)?;
    let mut integrator = registry.integrator("rk4")?;

    let x0 = system
        .default_state()
        .unwrap_or_else(|| State::zeros(system.state_dim()));

    let points = bifurcation_diagram(
        system.as_mut(),
        integrator.as_mut(),
        param,
        min,
        max,
        steps,
        index,
        &x0,
        dt,
        transient,
        record,
    )?;

    for p in &points {
        println!("{:.6}: {} distinct values", p.param, p.values.len());
    }
    Ok(())
}

fn cmd_spectrum(store: &PathBuf, run_id: &str, column: usize) -> Result<()> {
    let store = RunStore::new(store.clone())?;
    let rows = store.load_states(run_id)?;

    let mut signal: Vec<f64> = rows
        .iter()
        .map(|(_, values)| values.get(column).copied().unwrap_or(0.0))
        .collect();
    if signal.is_empty() {
        bail!("run {run_id} has no recorded states");
    }

    // The spectrum requires a radix-2 length; zero-pad up to it.
    let padded = signal.len().next_power_of_two();
    signal.resize(padded, 0.0);

    let spectrum = power_spectrum(&signal)?;
    let peak = spectrum
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
        .unwrap_or(0);

    println!("samples:   {padded}");
    println!("peak bin:  {peak}");
    println!("peak mag:  {:.6}", spectrum[peak]);
    Ok(())
}

fn cmd_models() -> Result<()> {
    let registry = Registry::new();
    println!("models:");
    for name in registry.list_models() {
        println!("  {name}");
    }
    println!("integrators:");
    for name in registry.list_integrators() {
        println!("  {name}");
    }
    println!("controllers:");
    for name in registry.list_controllers() {
        println!("  {name}");
    }
    println!("compute backend: {}", ds_compute::backend().name());
    Ok(())
}

fn cmd_presets() -> Result<()> {
    for (model, name, scenario) in presets::all() {
        println!(
            "{model}/{name}: {} + {}, dt={}, duration={}",
            scenario.integrator, scenario.controller, scenario.dt, scenario.duration
        );
    }
    Ok(())
}

fn cmd_runs(store: &PathBuf) -> Result<()> {
    let store = RunStore::new(store.clone())?;
    let runs = store.list_runs()?;
    if runs.is_empty() {
        println!("no saved runs in {}", store.base_dir().display());
        return Ok(());
    }
    for run_id in runs {
        let metadata = store.load_metadata(&run_id)?;
        println!(
            "{run_id}: {} + {} for {}s (dt {})",
            metadata.integrator, metadata.controller, metadata.duration, metadata.dt
        );
    }
    Ok(())
}
