//! End-to-end model run: profiles in, solved dispatch and summary out.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::config::ModelConfig;
use crate::dispatch::kpi::DispatchSummary;
use crate::dispatch::power_balance::ResultTable;
use crate::dispatch::types::{DispatchSolution, SolveStatus};
use crate::dispatch::optimize;
use crate::error::Error;
use crate::io::export::{export_csv, write_summary_json};
use crate::io::plot::write_plot;
use crate::network::Network;
use crate::profiles::{ProfileSet, reader, synthetic};

/// Everything produced by a successful run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub network: Network,
    pub solution: DispatchSolution,
    /// Results in MW.
    pub table: ResultTable,
    pub summary: DispatchSummary,
}

/// Optional output files of a run.
#[derive(Debug, Clone, Default)]
pub struct OutputPaths {
    pub results: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    pub plot: Option<PathBuf>,
}

/// Reads profiles from `path`, or generates synthetic ones from `cfg.synthetic`.
///
/// # Errors
///
/// Returns `Error::Profiles` if the file cannot be read or is invalid.
pub fn load_profiles(cfg: &ModelConfig, path: Option<&Path>) -> Result<ProfileSet, Error> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Reading profiles");
            Ok(reader::read_csv(path)?)
        }
        None => {
            info!(
                days = cfg.synthetic.days,
                seed = cfg.synthetic.seed,
                "Generating synthetic profiles"
            );
            Ok(synthetic::generate(&cfg.synthetic))
        }
    }
}

/// Builds the network, optimizes dispatch, and summarizes the result.
///
/// # Errors
///
/// Returns `Error::Config` for an invalid configuration, `Error::Profiles`
/// for invalid profiles, and `Error::Dispatch` if the optimization does not
/// finish with an optimal solution.
pub fn run(cfg: &ModelConfig, profiles: &ProfileSet) -> Result<RunOutput, Error> {
    let errors = cfg.validate();
    if !errors.is_empty() {
        return Err(Error::Config(errors));
    }
    let backend = cfg.solver_backend()?;

    info!("Initialize model");
    let network = Network::build(cfg, profiles)?;
    info!(
        snapshots = network.snapshot_count(),
        horizon_hours = profiles.horizon_hours(),
        "Network built"
    );

    let load_sum = profiles.load_sum();
    if !cfg.generation.normalize_load_profile && (load_sum - 1.0).abs() > 1e-3 {
        info!(
            load_sum,
            "load profile does not sum to 1; demand covers that share of the annual load"
        );
    }

    info!(%backend, "Run optimization");
    let result = optimize(&network, backend);
    let status = SolveStatus::of(&result);
    let solution = match result {
        Ok(solution) => {
            info!(%status, objective = solution.objective, "Optimization successful");
            solution
        }
        Err(e) => {
            error!(%status, "Optimization not successful: {e}");
            return Err(e.into());
        }
    };

    let table = ResultTable::from_solution(&network, &solution);
    let summary = DispatchSummary::from_results(&network, &table, &solution);
    for line in summary.headline() {
        info!("{line}");
    }

    Ok(RunOutput {
        network,
        solution,
        table,
        summary,
    })
}

/// Writes every requested output file.
///
/// # Errors
///
/// Returns `Error::Export` or `Error::Plot` on the first failure.
pub fn write_outputs(output: &RunOutput, paths: &OutputPaths) -> Result<(), Error> {
    if let Some(path) = &paths.results {
        export_csv(&output.table, path).map_err(|source| Error::Export {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "Results written");
    }
    if let Some(path) = &paths.summary {
        write_summary_json(&output.summary, path).map_err(|source| Error::Export {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "Summary written");
    }
    if let Some(path) = &paths.plot {
        write_plot(&output.table, path)?;
        info!(path = %path.display(), "Plot written");
    }
    Ok(())
}
