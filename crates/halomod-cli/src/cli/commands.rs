use super::CliError;
use halomod_core::cosmology::{load_fixture_params, FixtureCosmology, FixtureCosmologyParams};
use halomod_core::{
    halo_concentration, one_halo_matter_power, two_halo_matter_power, ConcentrationRelation,
    CosmologyContext, HaloModelError,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(clap::Args)]
pub(super) struct PowerArgs {
    /// Fixture cosmology parameter file (JSON); built-in parameters when omitted
    #[arg(long)]
    params: Option<PathBuf>,

    /// Scale factor of the evaluation
    #[arg(long, default_value_t = 1.0)]
    scale_factor: f64,

    /// Lowest wavenumber of the grid, in 1/Mpc
    #[arg(long, default_value_t = 1.0e-3)]
    k_min: f64,

    /// Highest wavenumber of the grid, in 1/Mpc
    #[arg(long, default_value_t = 10.0)]
    k_max: f64,

    /// Number of log-spaced wavenumber samples
    #[arg(long, default_value_t = 16)]
    samples: usize,

    /// JSON report output path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Serialize)]
struct PowerSample {
    wavenumber: f64,
    one_halo: f64,
    two_halo: f64,
    total: f64,
}

#[derive(Serialize)]
struct PowerReport {
    scale_factor: f64,
    samples: Vec<PowerSample>,
}

pub(super) fn run_power(args: PowerArgs) -> Result<i32, CliError> {
    let cosmology = load_cosmology(args.params.as_deref())?;
    let grid = log_spaced_grid("wavenumber", args.k_min, args.k_max, args.samples)?;

    tracing::info!(
        samples = args.samples,
        scale_factor = args.scale_factor,
        "evaluating halo-model power spectrum"
    );

    let mut samples = Vec::with_capacity(grid.len());
    for wavenumber in grid {
        let one_halo = one_halo_matter_power(&cosmology, wavenumber, args.scale_factor)?;
        let two_halo = two_halo_matter_power(&cosmology, wavenumber, args.scale_factor)?;
        samples.push(PowerSample {
            wavenumber,
            one_halo,
            two_halo,
            total: one_halo + two_halo,
        });
    }

    println!(
        "{:>14} {:>14} {:>14} {:>14}",
        "k [1/Mpc]", "P_1h [Mpc^3]", "P_2h [Mpc^3]", "P_hm [Mpc^3]"
    );
    for sample in &samples {
        println!(
            "{:>14.6e} {:>14.6e} {:>14.6e} {:>14.6e}",
            sample.wavenumber, sample.one_halo, sample.two_halo, sample.total
        );
    }

    if let Some(report_path) = &args.report {
        let report = PowerReport {
            scale_factor: args.scale_factor,
            samples,
        };
        write_report(report_path, &report)?;
        println!("JSON report: {}", report_path.display());
    }

    Ok(0)
}

#[derive(clap::Args)]
pub(super) struct ConcentrationArgs {
    /// Fixture cosmology parameter file (JSON); built-in parameters when omitted
    #[arg(long)]
    params: Option<PathBuf>,

    /// Concentration relation label
    #[arg(long, default_value = "duffy2008-virial")]
    relation: String,

    /// Scale factor of the evaluation
    #[arg(long, default_value_t = 1.0)]
    scale_factor: f64,

    /// Halo overdensity; virial threshold of the cosmology when omitted
    #[arg(long)]
    overdensity: Option<f64>,

    /// Lowest halo mass of the grid, in Msun
    #[arg(long, default_value_t = 1.0e10)]
    mass_min: f64,

    /// Highest halo mass of the grid, in Msun
    #[arg(long, default_value_t = 1.0e15)]
    mass_max: f64,

    /// Number of log-spaced mass samples
    #[arg(long, default_value_t = 11)]
    samples: usize,

    /// JSON report output path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Serialize)]
struct ConcentrationSample {
    halo_mass: f64,
    concentration: f64,
}

#[derive(Serialize)]
struct ConcentrationReport {
    relation: &'static str,
    scale_factor: f64,
    overdensity: f64,
    samples: Vec<ConcentrationSample>,
}

pub(super) fn run_concentration(args: ConcentrationArgs) -> Result<i32, CliError> {
    let relation = ConcentrationRelation::from_label(&args.relation)
        .map_err(|error| CliError::Usage(error.to_string()))?;
    let cosmology = load_cosmology(args.params.as_deref())?;
    let grid = log_spaced_grid("mass", args.mass_min, args.mass_max, args.samples)?;

    let overdensity = match args.overdensity {
        Some(value) => value,
        None => cosmology
            .virial_overdensity(args.scale_factor)
            .map_err(HaloModelError::from)?,
    };

    tracing::info!(
        relation = relation.label(),
        overdensity = overdensity,
        "evaluating concentration-mass relation"
    );

    let mut samples = Vec::with_capacity(grid.len());
    for halo_mass in grid {
        let concentration =
            halo_concentration(&cosmology, halo_mass, args.scale_factor, overdensity, relation)?;
        samples.push(ConcentrationSample {
            halo_mass,
            concentration,
        });
    }

    println!("{:>14} {:>14}", "M [Msun]", "c(M)");
    for sample in &samples {
        println!(
            "{:>14.6e} {:>14.6}",
            sample.halo_mass, sample.concentration
        );
    }

    if let Some(report_path) = &args.report {
        let report = ConcentrationReport {
            relation: relation.label(),
            scale_factor: args.scale_factor,
            overdensity,
            samples,
        };
        write_report(report_path, &report)?;
        println!("JSON report: {}", report_path.display());
    }

    Ok(0)
}

fn load_cosmology(params_path: Option<&Path>) -> Result<FixtureCosmology, CliError> {
    let params = match params_path {
        Some(path) => load_fixture_params(path)?,
        None => FixtureCosmologyParams::default(),
    };
    Ok(FixtureCosmology::new(params)?)
}

fn log_spaced_grid(
    label: &str,
    lower: f64,
    upper: f64,
    samples: usize,
) -> Result<Vec<f64>, CliError> {
    if !(lower.is_finite() && lower > 0.0 && upper.is_finite() && upper > lower) {
        return Err(CliError::Usage(format!(
            "{label} grid requires 0 < min < max, got [{lower}, {upper}]"
        )));
    }
    if samples < 2 {
        return Err(CliError::Usage(format!(
            "{label} grid requires at least 2 samples, got {samples}"
        )));
    }

    let log_lower = lower.ln();
    let log_step = (upper.ln() - log_lower) / ((samples - 1) as f64);
    let mut grid: Vec<f64> = (0..samples)
        .map(|index| (log_lower + log_step * index as f64).exp())
        .collect();
    if let Some(last) = grid.last_mut() {
        *last = upper;
    }
    Ok(grid)
}

fn write_report<R: Serialize>(report_path: &Path, report: &R) -> Result<(), CliError> {
    if let Some(parent) = report_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| CliError::ReportWrite {
                path: report_path.to_path_buf(),
                source,
            })?;
        }
    }
    let rendered = serde_json::to_string_pretty(report).map_err(|source| CliError::ReportWrite {
        path: report_path.to_path_buf(),
        source: std::io::Error::other(source),
    })?;
    fs::write(report_path, rendered).map_err(|source| CliError::ReportWrite {
        path: report_path.to_path_buf(),
        source,
    })
}
