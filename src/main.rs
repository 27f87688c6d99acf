//! netsim-base entry point: CLI wiring and config-driven scenario runs.

use std::process;

use tracing::{error, info};

use netsim_base::cli::{self, CliOptions};
use netsim_base::config::ScenarioConfig;
use netsim_base::io::export::{export_ledger_csv, export_report_json};
use netsim_base::logging;
use netsim_base::reporting::TraceSummary;
use netsim_base::runner::{RunError, run_scenario};

fn load_scenario(cli: &CliOptions) -> Result<ScenarioConfig, String> {
    // --scenario takes priority, then --preset
    let mut scenario = match (&cli.scenario, &cli.preset) {
        (Some(path), _) => ScenarioConfig::from_toml_file(path).map_err(|e| e.to_string())?,
        (None, Some(name)) => ScenarioConfig::from_preset(name).map_err(|e| e.to_string())?,
        (None, None) => ScenarioConfig::demo(),
    };
    if let Some(seed) = cli.seed {
        scenario.simulation.seed = seed;
    }
    Ok(scenario)
}

fn main() {
    let cli = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };
    if cli.help {
        cli::print_usage();
        return;
    }

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("warning: logging disabled: {e}");
    }

    let scenario = match load_scenario(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let (runtime, report) = match run_scenario(&scenario) {
        Ok(out) => out,
        Err(RunError::Invalid(errors)) => {
            for e in &errors {
                eprintln!("{e}");
            }
            process::exit(1);
        }
        Err(e) => {
            error!(error = %e, "scenario failed");
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    println!("{}", TraceSummary::from_trace(runtime.trace()));
    println!();
    println!("{report}");

    if let Some(ref path) = cli.ledger_out {
        if let Err(e) = export_ledger_csv(&report.ledger, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        info!(path = %path.display(), "ledger written");
    }

    if let Some(ref path) = cli.ledger_json {
        if let Err(e) = export_report_json(&report, path) {
            eprintln!("error: failed to write JSON: {e}");
            process::exit(1);
        }
        info!(path = %path.display(), "report written");
    }
}
