//! CSV and JSON export of the battery ledger and run report.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::runner::{LedgerRow, RunReport};

/// Column header for the ledger CSV.
const HEADER: &str = "host,device,owner,account,current_a,peak_current_a,\
                      current_updates,energy_j,energy_updates";

/// Exports the ledger to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_ledger_csv(rows: &[LedgerRow], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_ledger_csv(rows, io::BufWriter::new(file))
}

/// Writes the ledger as CSV to any writer, one row per battery account.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_ledger_csv(rows: &[LedgerRow], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in rows {
        wtr.write_record(&[
            r.host.clone(),
            r.device.to_string(),
            r.owner.clone(),
            r.account.to_string(),
            format!("{:.6}", r.current_a),
            format!("{:.6}", r.peak_current_a),
            r.current_updates.to_string(),
            format!("{:.6}", r.energy_j),
            r.energy_updates.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the full report as pretty-printed JSON.
///
/// # Errors
///
/// Returns an `io::Error` if the file cannot be written.
pub fn export_report_json(report: &RunReport, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_report_json(report, io::BufWriter::new(file))
}

pub fn write_report_json(report: &RunReport, mut writer: impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(account: usize) -> LedgerRow {
        LedgerRow {
            host: "node0".into(),
            device: 0,
            owner: "nic".into(),
            account,
            current_a: 0.0174,
            peak_current_a: 0.0197,
            current_updates: 2,
            energy_j: 0.0,
            energy_updates: 0,
        }
    }

    #[test]
    fn header_matches_ledger_columns() {
        let mut buf = Vec::new();
        write_ledger_csv(&[row(0)], &mut buf).ok();
        let output = String::from_utf8(buf).ok();
        let first_line = output.as_deref().unwrap_or("").lines().next().unwrap_or("");
        assert_eq!(
            first_line,
            "host,device,owner,account,current_a,peak_current_a,\
             current_updates,energy_j,energy_updates"
        );
    }

    #[test]
    fn row_count_matches_accounts() {
        let rows: Vec<LedgerRow> = (0..3).map(row).collect();
        let mut buf = Vec::new();
        write_ledger_csv(&rows, &mut buf).ok();
        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let mut count = 0;
        for record in rdr.records() {
            let rec = record.ok();
            assert!(rec.is_some(), "every row should parse");
            let current: Result<f64, _> = rec.as_ref().map(|r| r[4].parse()).unwrap_or(Ok(-1.0));
            assert_eq!(current.ok(), Some(0.0174));
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn json_report_parses_back() {
        let report = RunReport {
            seed: 42,
            script_steps: 0,
            publications: 1,
            deliveries: 2,
            trace_len: 9,
            modules: Vec::new(),
            ledger: vec![row(1)],
        };
        let mut buf = Vec::new();
        write_report_json(&report, &mut buf).ok();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap_or_default();
        assert_eq!(value["seed"], 42);
        assert_eq!(value["ledger"][0]["owner"], "nic");
    }
}
