//! Dunkelflaute model entry point: CLI wiring, run, and output files.

use std::process;

use dunkelflaute_sim::cli::{parse_args, print_usage};
use dunkelflaute_sim::logging;
use dunkelflaute_sim::runner::{self, OutputPaths};
use tracing::error;

fn main() {
    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            print_usage();
            process::exit(1);
        }
    };
    if cli.help {
        print_usage();
        return;
    }

    logging::init(cli.verbose);

    let cfg = match cli.load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("{e}");
        }
        process::exit(1);
    }

    let output = runner::load_profiles(&cfg, cli.profiles.as_deref())
        .and_then(|profiles| runner::run(&cfg, &profiles));
    let output = match output {
        Ok(output) => output,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    println!("{}", output.summary);

    let paths = OutputPaths {
        results: cli.results_out,
        summary: cli.summary_out,
        plot: cli.plot_out,
    };
    if let Err(e) = runner::write_outputs(&output, &paths) {
        error!("{e}");
        process::exit(1);
    }
}
