use std::path::PathBuf;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_netsim-base"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("netsim-base process should run")
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("netsim-base-{}-{name}", std::process::id()))
}

#[test]
fn single_host_preset_prints_report() {
    let output = run(&["--preset", "single_host"]);
    assert!(
        output.status.success(),
        "run failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    assert!(stdout.contains("--- Trace ---"));
    assert!(stdout.contains("--- Battery Ledger ---"));
    assert!(stdout.contains("state=sleep transitions=3"));
}

#[test]
fn scenario_file_exports_ledger_csv_and_json() {
    let csv_path = temp_path("ledger.csv");
    let json_path = temp_path("report.json");
    let output = run(&[
        "--scenario",
        "scenarios/radio_pair.toml",
        "--ledger-out",
        csv_path.to_str().unwrap_or_default(),
        "--ledger-json",
        json_path.to_str().unwrap_or_default(),
    ]);
    assert!(
        output.status.success(),
        "run failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let csv = std::fs::read_to_string(&csv_path).expect("ledger CSV should exist");
    let lines: Vec<&str> = csv.lines().collect();
    // header + 3 + 3 radio accounts + 2 meter accounts; the relay has no battery
    assert_eq!(lines.len(), 9);
    assert!(lines[0].starts_with("host,device,owner,account"));
    assert!(lines.iter().all(|l| !l.starts_with("relay")));

    let json = std::fs::read_to_string(&json_path).expect("report JSON should exist");
    let report: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
    assert_eq!(report["seed"], 7);
    assert_eq!(report["script_steps"], 3);

    let _ = std::fs::remove_file(csv_path);
    let _ = std::fs::remove_file(json_path);
}

#[test]
fn same_seed_gives_identical_output() {
    let a = run(&["--preset", "demo", "--seed", "11"]);
    let b = run(&["--preset", "demo", "--seed", "11"]);
    assert!(a.status.success());
    assert_eq!(a.stdout, b.stdout);
}

#[test]
fn unknown_preset_fails() {
    let output = run(&["--preset", "nonexistent"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown preset"));
}

#[test]
fn unknown_argument_fails() {
    let output = run(&["--bogus"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown argument"));
}

#[test]
fn invalid_scenario_reports_every_error() {
    let path = temp_path("invalid.toml");
    std::fs::write(
        &path,
        r#"
[[hosts]]
name = "node0"
index = 0

[[hosts.modules]]
name = "nic"
kind = "modem"

[[hosts]]
name = "node1"
index = 0
"#,
    )
    .expect("scenario file should be writable");
    let output = run(&["--scenario", path.to_str().unwrap_or_default()]);
    let _ = std::fs::remove_file(&path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("hosts[0].modules[0].kind"), "stderr={stderr}");
    assert!(stderr.contains("hosts[1].index"), "stderr={stderr}");
}
