use std::env;
use std::path::PathBuf;

use crate::config::ModelConfig;

#[derive(Debug, Default)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub profiles: Option<PathBuf>,
    pub days: Option<usize>,
    pub seed: Option<u64>,
    pub solver: Option<String>,
    pub results_out: Option<PathBuf>,
    pub summary_out: Option<PathBuf>,
    pub plot_out: Option<PathBuf>,
    pub verbose: bool,
    pub help: bool,
}

impl CliOptions {
    /// Loads the selected configuration and applies command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns the configuration error of the selected source.
    pub fn load_config(&self) -> Result<ModelConfig, crate::config::ConfigError> {
        let mut cfg = match (&self.config, &self.preset) {
            (Some(path), _) => ModelConfig::from_toml_file(path)?,
            (None, Some(name)) => ModelConfig::from_preset(name)?,
            (None, None) => ModelConfig::germany(),
        };
        if let Some(days) = self.days {
            cfg.synthetic.set_days(days);
        }
        if let Some(seed) = self.seed {
            cfg.synthetic.seed = seed;
        }
        if let Some(solver) = &self.solver {
            cfg.solver.backend = solver.clone();
        }
        Ok(cfg)
    }
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut opts = CliOptions::default();

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if opts.config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--profiles" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --profiles (expected a CSV file path)")?;
                opts.profiles = Some(PathBuf::from(path));
            }
            "--days" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --days (expected a positive integer)")?;
                let days = raw
                    .parse::<usize>()
                    .ok()
                    .filter(|d| *d > 0)
                    .ok_or_else(|| format!("--days value \"{raw}\" is not a positive integer"))?;
                opts.days = Some(days);
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                opts.seed = Some(seed);
            }
            "--solver" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --solver (expected microlp or highs)")?;
                opts.solver = Some(name.to_string());
            }
            "--results-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --results-out (expected a file path)")?;
                opts.results_out = Some(PathBuf::from(path));
            }
            "--summary-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --summary-out (expected a file path)")?;
                opts.summary_out = Some(PathBuf::from(path));
            }
            "--plot-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --plot-out (expected an .svg or .html path)")?;
                opts.plot_out = Some(PathBuf::from(path));
            }
            "--verbose" | "-v" => opts.verbose = true,
            "--help" | "-h" => opts.help = true,
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.config.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    if opts.config.is_none() && opts.preset.is_none() {
        opts.preset = Some("germany".to_string());
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("dunkelflaute-sim: single-bus dispatch and backup capacity model");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  dunkelflaute-sim [--config <path> | --preset <name>] [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>        Load model configuration from a TOML file");
    eprintln!(
        "  --preset <name>        Use a built-in preset ({})",
        ModelConfig::PRESETS.join(", ")
    );
    eprintln!("  --profiles <path>      Read input profiles from CSV (default: synthetic)");
    eprintln!("  --days <n>             Override the synthetic horizon in days (the lull window is moved inside it)");
    eprintln!("  --seed <u64>           Override the synthetic profile seed");
    eprintln!("  --solver <name>        LP backend: microlp or highs");
    eprintln!("  --results-out <path>   Write the result table as CSV");
    eprintln!("  --summary-out <path>   Write the summary as JSON");
    eprintln!("  --plot-out <path>      Write the dispatch chart (.svg or .html)");
    eprintln!("  --verbose, -v          Debug logging (RUST_LOG takes precedence)");
    eprintln!("  --help, -h             Show this help message");
    eprintln!();
    eprintln!("If no --config or --preset is given, the germany preset is used.");
}
