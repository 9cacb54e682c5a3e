use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::persist::SaveSummary;
use crate::scrape::ScrapeReport;

/// How a run ended, as recorded in the history CSV.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    #[default]
    Completed,
    Interrupted,
    NothingToDo,
    NoData,
}

/// One row of run history.
#[derive(Debug, Default, Serialize)]
pub struct RunStats {
    pub timestamp: DateTime<Utc>,
    pub outcome: RunOutcome,

    // fetch stage
    pub listed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub warnings: usize,

    // persisted document
    pub output_path: Option<String>,
    pub file_size_bytes: u64,
    pub entities: usize,
    pub total_stops: usize,
    pub total_routes: usize,
    pub total_coordinates: usize,
}

impl RunStats {
    pub fn from_report(outcome: RunOutcome, report: &ScrapeReport) -> Self {
        RunStats {
            timestamp: Utc::now(),
            outcome,
            listed: report.listed,
            succeeded: report.succeeded(),
            failed: report.failed(),
            warnings: report.warnings,
            ..Default::default()
        }
    }

    /// A run whose bus list came back empty.
    pub fn nothing_to_do() -> Self {
        RunStats {
            timestamp: Utc::now(),
            outcome: RunOutcome::NothingToDo,
            ..Default::default()
        }
    }

    /// Attach the statistics of the written document.
    pub fn with_save(mut self, summary: &SaveSummary) -> Self {
        self.output_path = Some(summary.path.display().to_string());
        self.file_size_bytes = summary.file_size_bytes;
        self.entities = summary.entities;
        self.total_stops = summary.total_stops;
        self.total_routes = summary.total_routes;
        self.total_coordinates = summary.total_coordinates;
        self
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn success_pct(&self) -> f64 {
        Self::pct(self.succeeded, self.listed)
    }
}
