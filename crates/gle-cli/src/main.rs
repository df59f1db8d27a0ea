use std::path::{Path, PathBuf};
use std::process::ExitCode;

use gle_io::{
    FrfReport, IdentificationReport, IoError, ModesReport, load_identification_config,
    load_simulation_spec, read_time_series, write_report, write_time_series,
};
use gle_solver::identification::{force_channel, identify_time_series};
use gle_solver::{
    ChannelFrf, DynamicSolver, IdentificationConfig, ModalModel, SolverError, TimeSeries,
    experimental_frf,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn usage() {
    eprintln!("usage: gle-cli <command> [args] [--out <report.json>]");
    eprintln!();
    eprintln!("commands:");
    eprintln!("  modes <spec.json>                  natural frequencies and mode shapes");
    eprintln!("  simulate <spec.json> <out.csv>     transient response sampled to CSV");
    eprintln!("  frf <data.csv> <config.json>       Bode data of every active channel");
    eprintln!("  identify <data.csv> <config.json>  modal parameters from measured data");
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Write the report to `out`, or print it to stdout
fn emit<T: Serialize>(report: &T, out: Option<&Path>) -> Result<(), IoError> {
    match out {
        Some(path) => write_report(path, report),
        None => {
            println!("{}", serde_json::to_string_pretty(report)?);
            Ok(())
        }
    }
}

fn run_modes(spec_path: &str, out: Option<&Path>) -> Result<(), IoError> {
    let spec = load_simulation_spec(spec_path)?;
    let model = ModalModel::build(&spec.beam, &spec.boundary_conditions(), &spec.modal_options())?;
    for (i, f) in model.modes().frequencies_hz.iter().enumerate() {
        info!(mode = i + 1, frequency_hz = *f, "natural frequency");
    }
    emit(&ModesReport::new(timestamp(), &spec.beam, &model), out)
}

fn run_simulate(spec_path: &str, csv_path: &str) -> Result<(), IoError> {
    let spec = load_simulation_spec(spec_path)?;
    let model = ModalModel::build(&spec.beam, &spec.boundary_conditions(), &spec.modal_options())?;
    let initial_state = spec.initial_state_vector();
    let response = DynamicSolver::new(&model, spec.integrator).solve(
        &spec.forcing(),
        spec.duration,
        initial_state.as_ref(),
    )?;
    info!(
        accepted = response.stats.accepted_steps,
        rejected = response.stats.rejected_steps,
        lu = response.stats.lu_factorizations,
        "integration finished"
    );
    let series = response.to_time_series(spec.sampling_freq)?;
    write_time_series(csv_path, &series)?;
    info!(path = csv_path, samples = series.len(), "time series written");
    Ok(())
}

fn load_measurement(
    csv_path: &str,
    config_path: &str,
) -> Result<(TimeSeries, IdentificationConfig), IoError> {
    Ok((read_time_series(csv_path)?, load_identification_config(config_path)?))
}

fn run_frf(csv_path: &str, config_path: &str, out: Option<&Path>) -> Result<(), IoError> {
    let (series, config) = load_measurement(csv_path, config_path)?;
    let force = force_channel(&series, &config)?;
    let (frfs, guards) = experimental_frf(
        &series,
        force,
        &config.active_channels()?,
        &config.spectral_options(),
    )?;
    let first = frfs
        .first()
        .ok_or_else(|| SolverError::InsufficientData("No response channels".to_string()))?;
    let band = config.band()?.clip_to(&first.frf)?;
    let restricted: Vec<ChannelFrf> = frfs
        .iter()
        .map(|c| ChannelFrf {
            channel: c.channel,
            frf: c.frf.restrict(&band),
        })
        .collect();
    emit(
        &FrfReport::new(timestamp(), force, &restricted, config.representation, guards),
        out,
    )
}

fn run_identify(csv_path: &str, config_path: &str, out: Option<&Path>) -> Result<(), IoError> {
    let (series, config) = load_measurement(csv_path, config_path)?;
    let result = identify_time_series(&series, &config)?;
    for mode in &result.modes {
        info!(
            frequency_hz = mode.natural_frequency_hz,
            damping_ratio = mode.damping_ratio(),
            "mode"
        );
    }
    emit(&IdentificationReport::new(timestamp(), &result), out)
}

/// Split `--out <path>` from the positional arguments
fn parse_args(args: &[String]) -> Option<(Vec<&str>, Option<PathBuf>)> {
    let mut positional = Vec::new();
    let mut out = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--out" {
            out = Some(PathBuf::from(iter.next()?));
        } else {
            positional.push(arg.as_str());
        }
    }
    Some((positional, out))
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((positional, out)) = parse_args(&args) else {
        usage();
        return ExitCode::from(2);
    };
    init_logging();

    let out = out.as_deref();
    let result = match positional.as_slice() {
        ["modes", spec] => run_modes(spec, out),
        ["simulate", spec, csv] => run_simulate(spec, csv),
        ["frf", csv, config] => run_frf(csv, config, out),
        ["identify", csv, config] => run_identify(csv, config, out),
        _ => {
            usage();
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}
