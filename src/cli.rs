use std::env;
use std::path::PathBuf;

pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub ledger_out: Option<PathBuf>,
    pub ledger_json: Option<PathBuf>,
    pub verbose: bool,
    pub help: bool,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_options(&args)
}

pub fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut scenario = None;
    let mut preset = None;
    let mut seed = None;
    let mut ledger_out = None;
    let mut ledger_json = None;
    let mut verbose = false;

    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --scenario (expected a TOML file path)")?;
                if scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let value = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                seed = Some(value);
            }
            "--ledger-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --ledger-out (expected a file path)")?;
                if ledger_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--ledger-out provided more than once".to_string());
                }
            }
            "--ledger-json" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --ledger-json (expected a file path)")?;
                if ledger_json.replace(PathBuf::from(path)).is_some() {
                    return Err("--ledger-json provided more than once".to_string());
                }
            }
            "--verbose" | "-v" => verbose = true,
            "--help" | "-h" => {
                return Ok(CliOptions {
                    scenario: None,
                    preset: None,
                    seed: None,
                    ledger_out: None,
                    ledger_json: None,
                    verbose,
                    help: true,
                });
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if scenario.is_some() && preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    if scenario.is_none() && preset.is_none() {
        preset = Some("demo".to_string());
    }

    Ok(CliOptions {
        scenario,
        preset,
        seed,
        ledger_out,
        ledger_json,
        verbose,
        help: false,
    })
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
    eprintln!("netsim-base: module lifecycle and battery accounting runtime");
    eprintln!();
    eprintln!("Usage: netsim-base [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>      Load scenario from TOML config file");
    eprintln!("  --preset <name>        Use a built-in preset (demo, single_host)");
    eprintln!("  --seed <u64>           Override random seed");
    eprintln!("  --ledger-out <path>    Export the battery ledger to CSV");
    eprintln!("  --ledger-json <path>   Export the run report to JSON");
    eprintln!("  --verbose, -v          Log at debug level unless RUST_LOG is set");
    eprintln!("  --help, -h             Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the demo preset is used.");
}
