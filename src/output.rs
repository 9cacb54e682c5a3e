//! Reporting of run results.
//!
//! Logs the save summary and appends run history to a CSV file.

use anyhow::Result;
use tracing::{debug, info};

use crate::persist::SaveSummary;
use crate::stats::RunStats;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs the statistics block for a written document.
pub fn log_summary(summary: &SaveSummary) {
    info!(
        file = %summary.path.display(),
        size_mb = %format!("{:.2}", summary.file_size_mb()),
        buses = summary.entities,
        "Data saved successfully"
    );
    info!(
        total_stops = summary.total_stops,
        total_routes = summary.total_routes,
        total_flow_coordinates = summary.total_coordinates,
        "Data statistics"
    );
}

/// Logs run statistics as pretty-printed JSON.
pub fn print_json(stats: &RunStats) -> Result<()> {
    debug!("{}", serde_json::to_string_pretty(stats)?);
    Ok(())
}

/// Appends a [`RunStats`] record as a row to a CSV file.
///
/// Creates the file (and its directory) with headers if it does not already
/// exist.
pub fn append_record(path: &Path, stats: &RunStats) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(stats)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::RunOutcome;
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn test_log_summary_does_not_panic() {
        let summary = SaveSummary {
            path: PathBuf::from("data/bus_data.json"),
            file_size_bytes: 10,
            entities: 1,
            total_stops: 1,
            total_routes: 1,
            total_coordinates: 2,
        };
        log_summary(&summary);
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&RunStats::default()).unwrap();
    }

    #[test]
    fn test_append_record_creates_file_and_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history/runs.csv");

        append_record(&path, &RunStats::default()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("timestamp,outcome,listed"));
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.csv");

        append_record(&path, &RunStats::default()).unwrap();
        append_record(&path, &RunStats::nothing_to_do()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.iter().filter(|l| l.contains("timestamp")).count(), 1);
        assert!(lines[2].contains("nothing_to_do"));
    }

    #[test]
    fn test_outcome_serialized_snake_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.csv");
        let stats = RunStats {
            outcome: RunOutcome::NoData,
            ..Default::default()
        };

        append_record(&path, &stats).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.lines().nth(1).unwrap().contains(",no_data,"));
    }
}
